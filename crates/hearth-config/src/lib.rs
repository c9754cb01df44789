//! Configuration surface shared by the hearth bootstrap substrate.
//!
//! The crate owns the ambient property table, the home/base path policy,
//! and the path-spec resolver that turns a `<layer>.loader` configuration
//! value into classified [`Repository`] descriptors. Everything here is
//! deliberately free of loader or daemon concerns so the resolver can be
//! exercised as a pure string transformation.

mod defaults;
mod logging;
mod paths;
mod properties;
mod repository;
mod resolver;

pub use defaults::{
    CONFIG_FILE_RELATIVE_PATH, DEFAULT_LOG_FILTER, MARKER_PACK, PACK_GLOB_SUFFIX, PACK_SUFFIX,
    default_log_filter,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use paths::{BASE_PROP, HOME_PROP, ensure_home_and_base};
pub use properties::{PropertiesError, PropertyTable};
pub use repository::{Repository, RepositoryKind};
pub use resolver::{Substitutions, resolve, substitute};
