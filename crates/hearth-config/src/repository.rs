//! Classified repository descriptors consumed by the context builder.

use std::fmt;

use url::Url;

use crate::defaults::{PACK_GLOB_SUFFIX, PACK_SUFFIX};

/// How a repository location contributes types to a loading context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    /// An absolute URL naming a remote pack.
    Url,
    /// A single pack archive on the local filesystem.
    Pack,
    /// A directory whose `.pack` entries are enumerated at build time.
    PackGlob,
    /// A plain directory of loose type definitions.
    Directory,
}

/// A classified location entry contributing types to a loading context.
///
/// The kind is derived deterministically from the location syntax by
/// [`Repository::classify`]; descriptors are created by the resolver,
/// consumed once by the builder, and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    location: String,
    kind: RepositoryKind,
}

impl Repository {
    /// Creates a descriptor with an explicit kind.
    #[must_use]
    pub fn new(location: impl Into<String>, kind: RepositoryKind) -> Self {
        Self {
            location: location.into(),
            kind,
        }
    }

    /// Classifies a non-empty spec token into a descriptor.
    ///
    /// Tokens that parse as absolute URLs are [`RepositoryKind::Url`]; a
    /// trailing `*.pack` strips the glob suffix and yields
    /// [`RepositoryKind::PackGlob`]; a trailing `.pack` yields
    /// [`RepositoryKind::Pack`]; everything else is a
    /// [`RepositoryKind::Directory`].
    #[must_use]
    pub fn classify(token: &str) -> Self {
        if Url::parse(token).is_ok() {
            return Self::new(token, RepositoryKind::Url);
        }
        if let Some(stripped) = token.strip_suffix(PACK_GLOB_SUFFIX) {
            return Self::new(stripped, RepositoryKind::PackGlob);
        }
        if token.ends_with(PACK_SUFFIX) {
            return Self::new(token, RepositoryKind::Pack);
        }
        Self::new(token, RepositoryKind::Directory)
    }

    /// Location text, with the glob suffix already stripped for globs.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Classification of this repository.
    #[must_use]
    pub fn kind(&self) -> RepositoryKind {
        self.kind
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:?}({})", self.kind, self.location)
    }
}
