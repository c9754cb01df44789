//! Chained type-resolution scopes.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::debug;

use hearth_config::Repository;

use crate::port::{InstantiationError, LateBound, OpaqueObject};

/// Factory producing a fresh instance of a registered type.
pub type Factory = Arc<dyn Fn() -> Result<OpaqueObject, InstantiationError> + Send + Sync>;

/// Errors raised while resolving a type name to a live object.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No context in the chain knows the type name.
    #[error("type '{name}' is not registered in context '{context}' or its parents")]
    UnknownType {
        /// Name that was looked up.
        name: String,
        /// Context where the lookup started.
        context: String,
    },
    /// The factory was found but construction failed.
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
}

const LOADER_TARGET: &str = "hearth::loader";

/// An isolated type-resolution scope with an optional parent for fallback.
///
/// Resolution walks the local registry first and then the parent chain, so
/// a child context can shadow a parent registration. The chain is strict:
/// every context has at most one parent and the graph is never a diamond.
pub struct LoaderContext {
    name: String,
    parent: Option<Arc<LoaderContext>>,
    repositories: Vec<Repository>,
    registry: RwLock<HashMap<String, Factory>>,
}

impl LoaderContext {
    /// Creates a context populated with the supplied repositories.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        parent: Option<Arc<Self>>,
        repositories: Vec<Repository>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent,
            repositories,
            registry: RwLock::new(HashMap::new()),
        })
    }

    /// Creates the ambient root context that loaded this process itself.
    ///
    /// Used when the very first layer carries no configuration at all, the
    /// degenerate single-context deployment.
    #[must_use]
    pub fn ambient() -> Arc<Self> {
        Self::new("ambient", None, Vec::new())
    }

    /// Layer name this context was built for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent context, when one exists.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Repositories this context was populated from.
    #[must_use]
    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Registers a factory under a dotted type name.
    ///
    /// Re-registering a name replaces the previous factory; a child
    /// registration shadows the same name in any parent.
    pub fn register(&self, type_name: impl Into<String>, factory: Factory) {
        let type_name = type_name.into();
        debug!(target: LOADER_TARGET, context = %self.name, %type_name, "registering type");
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name, factory);
    }

    /// Registers a default-constructible [`LateBound`] type.
    pub fn register_default<T>(&self, type_name: impl Into<String>)
    where
        T: LateBound + Default + 'static,
    {
        self.register(type_name, Arc::new(|| Ok(Box::new(T::default()) as OpaqueObject)));
    }

    /// Looks up a factory, walking local registry then parent chain.
    #[must_use]
    pub fn lookup(&self, type_name: &str) -> Option<Factory> {
        let local = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
            .cloned();
        if local.is_some() {
            return local;
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.lookup(type_name))
    }

    /// Resolves a type name and default-constructs an instance.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownType`] when no context in the chain
    /// knows the name and [`ResolveError::Instantiation`] when the factory
    /// fails.
    pub fn instantiate(&self, type_name: &str) -> Result<OpaqueObject, ResolveError> {
        let factory = self
            .lookup(type_name)
            .ok_or_else(|| ResolveError::UnknownType {
                name: type_name.to_owned(),
                context: self.name.clone(),
            })?;
        Ok(factory()?)
    }
}

impl std::fmt::Debug for LoaderContext {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LoaderContext")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|parent| parent.name()))
            .field("repositories", &self.repositories.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
