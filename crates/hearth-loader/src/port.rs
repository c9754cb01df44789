//! Late-bound invocation vocabulary.
//!
//! Objects produced by a context factory live behind the [`LateBound`]
//! trait: callers name a method and pass [`Value`] arguments at call time,
//! because the caller and the object were defined in mutually invisible
//! type scopes. The boundary is a hand-written port, not a generic dynamic
//! dispatch facility, so every crossing stays auditable.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::context::LoaderContext;

/// Argument and return values carried across the late-bound boundary.
#[derive(Clone, Default)]
pub enum Value {
    /// No value.
    #[default]
    Unit,
    /// A boolean flag.
    Bool(bool),
    /// An ordered argument list, as handed to process entry commands.
    Args(Vec<String>),
    /// A loading context, passed when wiring the bootstrapped object.
    Context(Arc<LoaderContext>),
}

impl Value {
    /// Extracts a boolean, if this value carries one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Short tag used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Bool(_) => "bool",
            Self::Args(_) => "args",
            Self::Context(_) => "context",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => formatter.write_str("Unit"),
            Self::Bool(flag) => write!(formatter, "Bool({flag})"),
            Self::Args(args) => write!(formatter, "Args({args:?})"),
            Self::Context(context) => write!(formatter, "Context({})", context.name()),
        }
    }
}

/// Errors raised while invoking a method across the late-bound boundary.
#[derive(Debug, Error)]
pub enum LateBindingError {
    /// The target does not expose the named method.
    #[error("type '{type_name}' has no method '{method}'")]
    MethodNotFound {
        /// Type that was invoked.
        type_name: String,
        /// Method that was requested.
        method: String,
    },
    /// The target exposes the method but the argument shape did not match.
    #[error("method '{method}' on '{type_name}' expects {expected}")]
    InvalidArguments {
        /// Type that was invoked.
        type_name: String,
        /// Method that was requested.
        method: String,
        /// Human-readable description of the expected argument shape.
        expected: &'static str,
    },
    /// The method was dispatched but its body failed.
    ///
    /// This is the invocation wrapper callers unwrap one level before
    /// reporting: the underlying cause is what the operator needs to see.
    #[error("invocation of '{method}' on '{type_name}' failed: {source}")]
    Invocation {
        /// Type that was invoked.
        type_name: String,
        /// Method that was requested.
        method: String,
        /// Failure raised by the method body.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl LateBindingError {
    /// Unwraps one level of invocation wrapper, yielding the underlying
    /// cause for [`LateBindingError::Invocation`] and the error itself
    /// otherwise.
    #[must_use]
    pub fn unwrap_invocation(self) -> Box<dyn std::error::Error + Send + Sync> {
        match self {
            Self::Invocation { source, .. } => source,
            other => Box::new(other),
        }
    }
}

/// Errors raised while default-constructing a registered type.
#[derive(Debug, Error)]
#[error("failed to construct '{type_name}': {message}")]
pub struct InstantiationError {
    /// Type that was being constructed.
    pub type_name: String,
    /// Human-readable failure description.
    pub message: String,
}

/// An opaque object supporting late-bound method invocation.
///
/// Implementations match on the method name and argument shape themselves;
/// there is no registry of signatures. Methods the type does not expose
/// fall through to [`LateBindingError::MethodNotFound`].
pub trait LateBound: Any + Send {
    /// The dotted type name this object was registered under.
    fn type_name(&self) -> &str;

    /// Invokes a method by name with the supplied arguments.
    ///
    /// # Errors
    ///
    /// Returns [`LateBindingError`] when the method is unknown, the
    /// arguments do not match, or the method body fails.
    fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Value, LateBindingError>;

    /// Upcast for inspection by cooperating rules and tests.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl fmt::Debug for dyn LateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LateBound")
            .field("type_name", &self.type_name())
            .finish()
    }
}

/// Boxed late-bound object, as produced by context factories and carried
/// on the rule engine's stack.
pub type OpaqueObject = Box<dyn LateBound>;
