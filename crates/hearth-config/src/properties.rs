//! Ambient process-wide property table.
//!
//! The table backs `${name}` substitution in repository specs and supplies
//! the `<layer>.loader` values consumed by the context builder. It is seeded
//! from an optional TOML document and explicit `set` calls; a missing file
//! yields an empty table rather than an error so a bare deployment can boot
//! with nothing but compiled-in defaults.

use std::collections::BTreeMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading the property file.
#[derive(Debug, Error)]
pub enum PropertiesError {
    /// The property file exists but could not be read.
    #[error("failed to read property file '{path}': {source}")]
    Read {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The property file is not valid TOML.
    #[error("failed to parse property file '{path}': {source}")]
    Parse {
        /// Path that was parsed.
        path: Utf8PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// A leaf value in the property file was not a string.
    #[error("property '{key}' in '{path}' is not a string")]
    NonStringValue {
        /// Dotted key of the offending value.
        key: String,
        /// Path that was parsed.
        path: Utf8PathBuf,
    },
}

/// Flat string-to-string property table with dotted keys.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    entries: BTreeMap<String, String>,
}

impl PropertyTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a table from a TOML document on disk.
    ///
    /// Nested tables flatten into dotted keys, so both `"common.loader" = x`
    /// and `[common] loader = x` spellings produce the `common.loader` key.
    /// A missing file yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`PropertiesError`] when the file exists but cannot be read,
    /// parsed, or contains non-string leaf values.
    pub fn load(path: &Utf8Path) -> Result<Self, PropertiesError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                debug!(%path, "no property file present, starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(PropertiesError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        let document: toml::Value = raw.parse().map_err(|source| PropertiesError::Parse {
            path: path.to_owned(),
            source,
        })?;
        let mut table = Self::new();
        flatten(&document, "", path, &mut table)?;
        Ok(table)
    }

    /// Stores a property, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `true` when the key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Merges another table into this one; the other table's values win.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Number of stored properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no properties are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(
    value: &toml::Value,
    prefix: &str,
    path: &Utf8Path,
    out: &mut PropertyTable,
) -> Result<(), PropertiesError> {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let dotted = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(child, &dotted, path, out)?;
            }
            Ok(())
        }
        toml::Value::String(text) => {
            out.set(prefix, text.clone());
            Ok(())
        }
        _ => Err(PropertiesError::NonStringValue {
            key: prefix.to_owned(),
            path: path.to_owned(),
        }),
    }
}
