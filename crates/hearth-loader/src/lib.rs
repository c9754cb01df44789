//! Isolated loading contexts for the hearth bootstrap substrate.
//!
//! A [`LoaderContext`] is a type-resolution scope: a registry mapping type
//! names to factories, chained to an optional parent for fallback lookup.
//! The layered builder assembles the common/server/shared chain from
//! `<layer>.loader` configuration values, and the [`active`] module carries
//! the per-thread binding that late-bound resolution consults.
//!
//! Contexts are isolated on purpose: a type registered only in the server
//! context is invisible to code holding the common context, which keeps
//! internal platform types out of application-visible scope.

pub mod active;
mod builder;
mod context;
mod port;

pub use builder::{BOOT_LAYER_NAMES, BootLayers, ContextBuildError, build_layers};
pub use context::{Factory, LoaderContext, ResolveError};
pub use port::{InstantiationError, LateBindingError, LateBound, OpaqueObject, Value};
