//! Layered loading-context construction.
//!
//! Builds one context per named layer, each populated from the repositories
//! its `<layer>.loader` configuration value resolves to. A layer with no
//! configuration inherits its parent directly; no empty context is created,
//! so two layer names may denote the literally identical context object.

use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use hearth_config::{PACK_SUFFIX, Repository, RepositoryKind, Substitutions, resolve};

use crate::context::LoaderContext;

const BUILDER_TARGET: &str = "hearth::loader::builder";

/// Canonical layer order for the bootstrap chain.
pub const BOOT_LAYER_NAMES: [&str; 3] = ["common", "server", "shared"];

/// Errors raised while building a layer's context.
///
/// Any failure here is fatal to the whole bootstrap; there is no
/// partial-success state.
#[derive(Debug, Error)]
pub enum ContextBuildError {
    /// Enumerating a pack-glob directory failed.
    #[error("failed to enumerate pack glob directory '{path}': {source}")]
    GlobEnumeration {
        /// Directory that was being enumerated.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// The three named contexts produced by a standard bootstrap.
#[derive(Debug, Clone)]
pub struct BootLayers {
    /// Root of the chain.
    pub common: Arc<LoaderContext>,
    /// Child of common holding internal platform types.
    pub server: Arc<LoaderContext>,
    /// Child of common holding types visible to applications.
    pub shared: Arc<LoaderContext>,
}

impl BootLayers {
    /// Builds the canonical common/server/shared chain.
    ///
    /// # Errors
    ///
    /// Returns [`ContextBuildError`] when any layer fails to build.
    pub fn build<F>(
        lookup: F,
        substitutions: &Substitutions<'_>,
        ambient: &Arc<LoaderContext>,
    ) -> Result<Self, ContextBuildError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layers = build_layers(&BOOT_LAYER_NAMES, lookup, substitutions, ambient)?;
        let mut take = |name: &str| {
            layers
                .iter()
                .position(|(layer, _)| layer == name)
                .map(|index| layers.remove(index).1)
        };
        // build_layers produces every requested layer, so the lookups
        // cannot miss; fall back to the ambient context regardless.
        let common = take("common").unwrap_or_else(|| Arc::clone(ambient));
        let server = take("server").unwrap_or_else(|| Arc::clone(&common));
        let shared = take("shared").unwrap_or_else(|| Arc::clone(&common));
        Ok(Self {
            common,
            server,
            shared,
        })
    }
}

/// Builds one context per layer, strictly in the given order.
///
/// The first layer's context (or the ambient context, when the first layer
/// carries no configuration) becomes the parent of every subsequent layer.
/// A later layer with no configuration reuses that parent directly.
///
/// # Errors
///
/// Returns [`ContextBuildError`] when repository expansion fails for any
/// layer. The whole bootstrap aborts in that case.
pub fn build_layers<F>(
    layers: &[&str],
    lookup: F,
    substitutions: &Substitutions<'_>,
    ambient: &Arc<LoaderContext>,
) -> Result<Vec<(String, Arc<LoaderContext>)>, ContextBuildError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut built = Vec::with_capacity(layers.len());
    let mut parent: Option<Arc<LoaderContext>> = None;
    for (index, layer) in layers.iter().enumerate() {
        let value = lookup(&format!("{layer}.loader")).filter(|value| !value.is_empty());
        let repositories = resolve(value.as_deref(), substitutions);
        let context = if repositories.is_empty() {
            match (&parent, index) {
                // First layer unset: fall back to the context already
                // loading this process, the single-context deployment.
                (None, 0) => {
                    debug!(target: BUILDER_TARGET, layer, "no configuration, using ambient context");
                    Arc::clone(ambient)
                }
                (Some(existing), _) => {
                    debug!(target: BUILDER_TARGET, layer, parent = existing.name(), "no configuration, inheriting parent");
                    Arc::clone(existing)
                }
                (None, _) => Arc::clone(ambient),
            }
        } else {
            let repositories = expand_globs(repositories)?;
            info!(
                target: BUILDER_TARGET,
                layer,
                repositories = repositories.len(),
                "building loading context"
            );
            LoaderContext::new(*layer, parent.clone(), repositories)
        };
        if parent.is_none() {
            parent = Some(Arc::clone(&context));
        }
        built.push(((*layer).to_owned(), context));
    }
    Ok(built)
}

/// Replaces each pack-glob descriptor with the packs found in its directory.
///
/// Entries are sorted so repeated builds see a stable repository order.
fn expand_globs(repositories: Vec<Repository>) -> Result<Vec<Repository>, ContextBuildError> {
    let mut expanded = Vec::with_capacity(repositories.len());
    for repository in repositories {
        if repository.kind() == RepositoryKind::PackGlob {
            expanded.extend(enumerate_packs(Utf8Path::new(repository.location()))?);
        } else {
            expanded.push(repository);
        }
    }
    Ok(expanded)
}

fn enumerate_packs(directory: &Utf8Path) -> Result<Vec<Repository>, ContextBuildError> {
    let entries = directory
        .read_dir_utf8()
        .map_err(|source| ContextBuildError::GlobEnumeration {
            path: directory.to_owned(),
            source,
        })?;
    let mut packs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ContextBuildError::GlobEnumeration {
            path: directory.to_owned(),
            source,
        })?;
        let name = entry.file_name();
        if name.ends_with(PACK_SUFFIX) {
            packs.push(Repository::new(
                entry.path().as_str(),
                RepositoryKind::Pack,
            ));
        }
    }
    packs.sort_by(|a, b| a.location().cmp(b.location()));
    Ok(packs)
}
