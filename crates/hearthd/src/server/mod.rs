//! Built-in subsystem entry point driven through the late-bound port.
//!
//! [`Server`] is the object the bootstrap instantiates by its fixed dotted
//! name inside the server context and then only ever touches through
//! [`LateBound::invoke`]. Its `load` operation assembles the inner object
//! graph by feeding its configuration document's events through the rule
//! engine, resolving type names against the calling thread's active
//! loading context — which is why stop commands issued from other threads
//! must rebind that context first.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use hearth_digester::{Attributes, EngineError, RuleEngine};
use hearth_loader::{
    LateBindingError, LateBound, LoaderContext, OpaqueObject, Value, active,
};

const SERVER_TARGET: &str = "hearth::server";

/// Fixed dotted name the bootstrap resolves the entry point by.
pub const SERVER_TYPE: &str = "hearth.core.Server";

/// Dotted name of the object graph root assembled by `load`.
pub const KERNEL_TYPE: &str = "hearth.core.Kernel";

/// Attribute allowing a configuration document to override the kernel type.
pub const CLASS_ATTRIBUTE: &str = "class-name";

/// Registers the compiled-in platform types into the server context.
///
/// Repositories may provide replacements for these names; an existing
/// registration anywhere in the chain wins over the compiled-in fallback.
pub fn register_builtins(context: &Arc<LoaderContext>) {
    if context.lookup(SERVER_TYPE).is_none() {
        context.register_default::<Server>(SERVER_TYPE);
    }
    if context.lookup(KERNEL_TYPE).is_none() {
        context.register_default::<Kernel>(KERNEL_TYPE);
    }
}

/// Failures raised by the entry point's method bodies.
///
/// These cross the port wrapped in [`LateBindingError::Invocation`]; the
/// caller unwraps one level before reporting them.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No loading context is bound to the calling thread.
    #[error("no active loading context is bound to the calling thread")]
    NoActiveContext,
    /// Assembling the object graph from the configuration document failed.
    #[error(transparent)]
    Assembly(#[from] EngineError),
    /// A kernel method invocation failed.
    #[error("kernel invocation failed: {0}")]
    Kernel(#[source] LateBindingError),
}

/// The subsystem entry point.
///
/// Holds the parent (shared) context handed over by the bootstrap's wiring
/// call, the await flag, and the kernel object produced by `load`.
#[derive(Default)]
pub struct Server {
    parent_context: Option<Arc<LoaderContext>>,
    kernel: Option<OpaqueObject>,
    await_on_start: bool,
    started: bool,
}

impl Server {
    fn do_load(&mut self, arguments: &[String]) -> Result<(), ServerError> {
        if !arguments.is_empty() {
            debug!(target: SERVER_TARGET, ?arguments, "load arguments");
        }
        let context = active::current().ok_or(ServerError::NoActiveContext)?;
        let mut engine = RuleEngine::new(context);
        engine.add_object_create("server", KERNEL_TYPE, Some(CLASS_ATTRIBUTE));
        // The document parser is an external collaborator; the entry point
        // replays the document's events into the engine. The degenerate
        // document is a single root element.
        engine.begin_element("server", &Attributes::new())?;
        engine.end_element()?;
        self.kernel = engine.take_root();
        info!(
            target: SERVER_TARGET,
            kernel = self.kernel.as_ref().map(|kernel| kernel.type_name().to_owned()),
            "load complete"
        );
        Ok(())
    }

    fn do_start(&mut self) -> Result<(), ServerError> {
        if self.kernel.is_none() {
            self.do_load(&[])?;
        }
        if let Some(kernel) = self.kernel.as_mut() {
            kernel.invoke("start", Vec::new()).map_err(ServerError::Kernel)?;
        }
        self.started = true;
        info!(target: SERVER_TARGET, await_on_start = self.await_on_start, "server started");
        Ok(())
    }

    fn do_stop(&mut self) -> Result<(), ServerError> {
        if let Some(kernel) = self.kernel.as_mut() {
            kernel.invoke("stop", Vec::new()).map_err(ServerError::Kernel)?;
        }
        self.started = false;
        info!(target: SERVER_TARGET, "server stopped");
        Ok(())
    }

    fn invocation_error(&self, method: &str, error: ServerError) -> LateBindingError {
        LateBindingError::Invocation {
            type_name: self.type_name().to_owned(),
            method: method.to_owned(),
            source: Box::new(error),
        }
    }

    fn invalid_arguments(&self, method: &str, expected: &'static str) -> LateBindingError {
        LateBindingError::InvalidArguments {
            type_name: self.type_name().to_owned(),
            method: method.to_owned(),
            expected,
        }
    }
}

impl LateBound for Server {
    fn type_name(&self) -> &str {
        SERVER_TYPE
    }

    fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Value, LateBindingError> {
        match (method, args.as_slice()) {
            ("set_parent_context", [Value::Context(context)]) => {
                self.parent_context = Some(Arc::clone(context));
                Ok(Value::Unit)
            }
            ("set_parent_context", _) => {
                Err(self.invalid_arguments(method, "one context argument"))
            }
            ("load", []) => self
                .do_load(&[])
                .map(|()| Value::Unit)
                .map_err(|error| self.invocation_error(method, error)),
            ("load", [Value::Args(arguments)]) => {
                let arguments = arguments.clone();
                self.do_load(&arguments)
                    .map(|()| Value::Unit)
                    .map_err(|error| self.invocation_error(method, error))
            }
            ("load", _) => Err(self.invalid_arguments(method, "no arguments or one argument list")),
            ("start", []) => self
                .do_start()
                .map(|()| Value::Unit)
                .map_err(|error| self.invocation_error(method, error)),
            ("stop", []) => self
                .do_stop()
                .map(|()| Value::Unit)
                .map_err(|error| self.invocation_error(method, error)),
            ("stop_server", []) | ("stop_server", [Value::Args(_)]) => self
                .do_stop()
                .map(|()| Value::Unit)
                .map_err(|error| self.invocation_error(method, error)),
            ("stop_server", _) => {
                Err(self.invalid_arguments(method, "no arguments or one argument list"))
            }
            ("set_await", [Value::Bool(flag)]) => {
                self.await_on_start = *flag;
                Ok(Value::Unit)
            }
            ("set_await", _) => Err(self.invalid_arguments(method, "one boolean argument")),
            ("get_await", []) => Ok(Value::Bool(self.await_on_start)),
            ("get_server", []) => Ok(Value::Bool(self.kernel.is_some())),
            _ => Err(LateBindingError::MethodNotFound {
                type_name: self.type_name().to_owned(),
                method: method.to_owned(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Root of the object graph assembled from the configuration document.
#[derive(Default)]
pub struct Kernel {
    running: bool,
}

impl LateBound for Kernel {
    fn type_name(&self) -> &str {
        KERNEL_TYPE
    }

    fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Value, LateBindingError> {
        match (method, args.as_slice()) {
            ("start", []) => {
                self.running = true;
                Ok(Value::Unit)
            }
            ("stop", []) => {
                self.running = false;
                Ok(Value::Unit)
            }
            ("is_running", []) => Ok(Value::Bool(self.running)),
            _ => Err(LateBindingError::MethodNotFound {
                type_name: self.type_name().to_owned(),
                method: method.to_owned(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests;
