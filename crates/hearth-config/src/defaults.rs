//! Workspace-wide constants shared by the binaries and the loader.

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Returns the default log filter expression.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Suffix identifying a single type pack archive.
pub const PACK_SUFFIX: &str = ".pack";

/// Suffix identifying a glob over every pack in a directory.
pub const PACK_GLOB_SUFFIX: &str = "*.pack";

/// Marker archive whose presence next to the working directory selects the
/// parent-of-cwd home fallback.
pub const MARKER_PACK: &str = "bootstrap.pack";

/// Location of the ambient property file, relative to `hearth.base`.
pub const CONFIG_FILE_RELATIVE_PATH: &str = "conf/hearth.toml";
