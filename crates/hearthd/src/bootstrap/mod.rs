//! Daemon bootstrap orchestration and the late-bound facade.
//!
//! The facade owns the single per-process daemon handle. Apart from
//! construction, every interaction with the bootstrapped entry point goes
//! through [`hearth_loader::LateBound::invoke`] by method name: the entry
//! point's type lives in the isolated server context and is invisible to
//! this crate's static type graph.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use hearth_config::{
    BASE_PROP, CONFIG_FILE_RELATIVE_PATH, HOME_PROP, PropertiesError, PropertyTable,
    Substitutions, ensure_home_and_base,
};
use hearth_loader::{
    BootLayers, ContextBuildError, LateBindingError, LoaderContext, OpaqueObject, ResolveError,
    Value, active,
};

use crate::security;
use crate::server::{self, SERVER_TYPE};

const BOOTSTRAP_TARGET: &str = "hearth::bootstrap";

/// Environment variable pre-seeding `hearth.home`.
pub const HOME_ENV_VAR: &str = "HEARTH_HOME";

/// Environment variable pre-seeding `hearth.base`.
pub const BASE_ENV_VAR: &str = "HEARTH_BASE";

/// Errors surfaced during bootstrap and facade dispatch.
///
/// Everything raised from the `init` phase is fatal: the binary logs the
/// failure and terminates with a non-zero status, since no caller further
/// up has meaningful context to recover with.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The ambient property file failed to load.
    #[error("failed to load properties: {source}")]
    Properties {
        /// Underlying property loader error.
        #[from]
        source: PropertiesError,
    },
    /// Building a loading context failed.
    #[error("failed to build loading contexts: {source}")]
    ContextBuild {
        /// Underlying builder error.
        #[from]
        source: ContextBuildError,
    },
    /// The entry point could not be resolved or constructed.
    #[error("failed to create entry point: {source}")]
    EntryPoint {
        /// Underlying resolution error.
        #[from]
        source: ResolveError,
    },
    /// A late-bound invocation on the daemon handle failed.
    #[error(transparent)]
    LateBinding(#[from] LateBindingError),
    /// A facade command was issued before a handle was bound.
    #[error("no daemon handle is bound; init must succeed first")]
    NotBound,
    /// The daemon returned a value of an unexpected shape.
    #[error("method '{method}' returned {kind}, expected {expected}")]
    UnexpectedReturn {
        /// Method that was invoked.
        method: String,
        /// Kind tag of the value that came back.
        kind: &'static str,
        /// Expected value shape.
        expected: &'static str,
    },
}

/// Owns the process's daemon handle and the loading-context chain.
pub struct Bootstrap {
    table: PropertyTable,
    cwd: Utf8PathBuf,
    ambient: Arc<LoaderContext>,
    layers: Option<BootLayers>,
    daemon: Option<OpaqueObject>,
}

impl Bootstrap {
    /// Creates an unbound facade over the given property table.
    #[must_use]
    pub fn new(table: PropertyTable, cwd: Utf8PathBuf) -> Self {
        Self::with_ambient(table, cwd, LoaderContext::ambient())
    }

    /// Creates a facade with an injected ambient context.
    ///
    /// The ambient context stands in for the scope that loaded this process
    /// itself; injecting it lets tests pre-register replacement types.
    #[must_use]
    pub fn with_ambient(
        table: PropertyTable,
        cwd: Utf8PathBuf,
        ambient: Arc<LoaderContext>,
    ) -> Self {
        Self {
            table,
            cwd,
            ambient,
            layers: None,
            daemon: None,
        }
    }

    /// Returns `true` once a daemon handle has been bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.daemon.is_some()
    }

    /// The built layer chain, once `init` has succeeded.
    #[must_use]
    pub fn layers(&self) -> Option<&BootLayers> {
        self.layers.as_ref()
    }

    /// Rebinds the calling thread's active context to the server context.
    ///
    /// Required on any thread that issues commands after another thread
    /// performed the bootstrap — late-bound resolution consults the calling
    /// thread's binding, not a passed-in reference.
    pub fn bind_thread_context(&self) {
        if let Some(layers) = &self.layers {
            active::bind(Arc::clone(&layers.server));
        }
    }

    /// Initialises the daemon.
    ///
    /// Applies the home/base fallback policy, merges the property file from
    /// under base, builds the common/server/shared contexts, rebinds the
    /// calling thread, runs the security preload pass, and instantiates the
    /// entry point by its fixed name before wiring it to the shared
    /// context. Calling `init` again performs every step again and silently
    /// rebinds the handle; callers guard against double-init themselves.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] on any failure; all of them are fatal to
    /// the bootstrap.
    pub fn init(&mut self) -> Result<(), BootstrapError> {
        ensure_home_and_base(&mut self.table, &self.cwd);
        let base = path_property(&self.table, BASE_PROP, &self.cwd);
        let file = PropertyTable::load(&base.join(CONFIG_FILE_RELATIVE_PATH))?;
        self.table.merge(file);

        let home = path_property(&self.table, HOME_PROP, &self.cwd);
        let base = path_property(&self.table, BASE_PROP, &self.cwd);
        debug!(target: BOOTSTRAP_TARGET, %home, %base, "paths resolved");
        let substitutions = Substitutions::new(home.as_path(), base.as_path(), &self.table);
        let layers = BootLayers::build(
            |key| self.table.get(key).map(ToOwned::to_owned),
            &substitutions,
            &self.ambient,
        )?;

        server::register_builtins(&layers.server);
        active::bind(Arc::clone(&layers.server));
        security::preload(&layers.server);

        info!(target: BOOTSTRAP_TARGET, "loading entry point");
        let mut daemon = layers.server.instantiate(SERVER_TYPE)?;
        daemon.invoke(
            "set_parent_context",
            vec![Value::Context(Arc::clone(&layers.shared))],
        )?;

        self.layers = Some(layers);
        self.daemon = Some(daemon);
        Ok(())
    }

    /// Initialises the daemon and immediately loads it with arguments.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] when either phase fails.
    pub fn init_with(&mut self, arguments: &[String]) -> Result<(), BootstrapError> {
        self.init()?;
        self.load(arguments)
    }

    /// Invokes `load` on the daemon handle.
    ///
    /// An empty argument list selects the zero-argument overload; anything
    /// else passes the whole list through. This is the only place the
    /// facade chooses between two method signatures.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] when no handle is bound or the
    /// invocation fails.
    pub fn load(&mut self, arguments: &[String]) -> Result<(), BootstrapError> {
        let args = if arguments.is_empty() {
            Vec::new()
        } else {
            vec![Value::Args(arguments.to_vec())]
        };
        self.daemon_mut()?.invoke("load", args)?;
        Ok(())
    }

    /// Invokes `start`, performing `init` first when no handle is bound.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] when the implicit init or the
    /// invocation fails.
    pub fn start(&mut self) -> Result<(), BootstrapError> {
        if !self.is_bound() {
            self.init()?;
        }
        self.daemon_mut()?.invoke("start", Vec::new())?;
        Ok(())
    }

    /// Invokes `stop` on the daemon handle.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] when no handle is bound or the
    /// invocation fails.
    pub fn stop(&mut self) -> Result<(), BootstrapError> {
        self.daemon_mut()?.invoke("stop", Vec::new())?;
        Ok(())
    }

    /// Invokes `stop_server`, passing arguments through when present.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] when no handle is bound or the
    /// invocation fails.
    pub fn stop_server(&mut self, arguments: &[String]) -> Result<(), BootstrapError> {
        let args = if arguments.is_empty() {
            Vec::new()
        } else {
            vec![Value::Args(arguments.to_vec())]
        };
        self.daemon_mut()?.invoke("stop_server", args)?;
        Ok(())
    }

    /// Invokes `set_await` with the given flag.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] when no handle is bound or the
    /// invocation fails.
    pub fn set_await(&mut self, flag: bool) -> Result<(), BootstrapError> {
        self.daemon_mut()?
            .invoke("set_await", vec![Value::Bool(flag)])?;
        Ok(())
    }

    /// Invokes `get_await` and extracts the flag.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] when no handle is bound, the invocation
    /// fails, or the daemon returns a non-boolean value.
    pub fn get_await(&mut self) -> Result<bool, BootstrapError> {
        expect_bool(self.daemon_mut()?.invoke("get_await", Vec::new())?, "get_await")
    }

    /// Invokes `get_server`: whether the daemon produced a server object.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] when no handle is bound, the invocation
    /// fails, or the daemon returns a non-boolean value.
    pub fn get_server(&mut self) -> Result<bool, BootstrapError> {
        expect_bool(
            self.daemon_mut()?.invoke("get_server", Vec::new())?,
            "get_server",
        )
    }

    /// Tears the daemon down. Documented no-op: teardown is an external
    /// concern and the handle lives until process exit.
    pub fn destroy(&self) {}

    fn daemon_mut(&mut self) -> Result<&mut OpaqueObject, BootstrapError> {
        self.daemon.as_mut().ok_or(BootstrapError::NotBound)
    }
}

fn expect_bool(value: Value, method: &str) -> Result<bool, BootstrapError> {
    value.as_bool().ok_or_else(|| BootstrapError::UnexpectedReturn {
        method: method.to_owned(),
        kind: value.kind(),
        expected: "bool",
    })
}

fn path_property(table: &PropertyTable, key: &str, fallback: &Utf8Path) -> Utf8PathBuf {
    table
        .get(key)
        .map_or_else(|| fallback.to_owned(), Utf8PathBuf::from)
}
