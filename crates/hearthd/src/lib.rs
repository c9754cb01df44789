//! Launch substrate for the hearth container process.
//!
//! The daemon assembles the layered loading contexts described by the
//! ambient configuration, instantiates the subsystem entry point inside the
//! innermost (server) context, and drives it through a narrow late-bound
//! port — the bootstrap's own types never reference the entry point's type
//! statically, because the two live in mutually invisible scopes.
//!
//! The binary interprets the trailing command-line token as the process
//! entry command (`start`, `stop`, `startd`, `stopd`, `configtest`) and
//! exits non-zero on any fatal bootstrap or dispatch failure.

mod bootstrap;
mod cli;
pub mod commands;
mod security;
pub mod server;
pub mod telemetry;

pub use bootstrap::{BASE_ENV_VAR, Bootstrap, BootstrapError, HOME_ENV_VAR};
pub use cli::Cli;
pub use commands::EntryCommand;
pub use telemetry::{TelemetryError, TelemetryHandle};
