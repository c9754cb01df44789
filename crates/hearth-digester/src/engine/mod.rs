//! The rule-dispatch stack machine.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use hearth_loader::{LoaderContext, OpaqueObject, ResolveError};

use crate::attributes::Attributes;
use crate::object_create::ObjectCreateRule;
use crate::rule::Rule;

const ENGINE_TARGET: &str = "hearth::digester";

/// Errors raised by the engine and its rules.
///
/// These propagate to the document-processing caller, which decides
/// whether to abort the parse or the process; the engine treats them as
/// terminal for the current document.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A pop was requested with nothing on the stack.
    #[error("object stack is empty at '{path}'")]
    EmptyStack {
        /// Match path at the time of the underflow.
        path: String,
    },
    /// No type name was available for object creation.
    #[error("no type name specified for element at '{path}'")]
    MissingTypeName {
        /// Match path of the offending element.
        path: String,
    },
    /// Type resolution or construction failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Drives rules against element events for one document parse.
///
/// The engine owns the object stack and the currently matched element path
/// exclusively for the duration of the parse; it must not be shared across
/// concurrent parses. Rules are registered against exact slash-separated
/// element paths before events are fed in.
pub struct RuleEngine {
    context: Arc<LoaderContext>,
    rules: Vec<(String, Arc<dyn Rule>)>,
    stack: Vec<OpaqueObject>,
    path: String,
    root: Option<OpaqueObject>,
}

impl RuleEngine {
    /// Creates an engine resolving types through the given context.
    #[must_use]
    pub fn new(context: Arc<LoaderContext>) -> Self {
        Self {
            context,
            rules: Vec::new(),
            stack: Vec::new(),
            path: String::new(),
            root: None,
        }
    }

    /// Registers a rule for an exact element path.
    pub fn add_rule(&mut self, pattern: impl Into<String>, rule: Arc<dyn Rule>) {
        self.rules.push((pattern.into(), rule));
    }

    /// Registers an [`ObjectCreateRule`] for an exact element path.
    pub fn add_object_create(
        &mut self,
        pattern: impl Into<String>,
        type_name: &str,
        override_attribute: Option<&str>,
    ) {
        let rule = match override_attribute {
            Some(attribute) => ObjectCreateRule::with_override(type_name, attribute),
            None => ObjectCreateRule::new(type_name),
        };
        self.add_rule(pattern, Arc::new(rule));
    }

    /// The context used to resolve type names from the document.
    #[must_use]
    pub fn context(&self) -> &Arc<LoaderContext> {
        &self.context
    }

    /// The currently matched slash-separated element path.
    #[must_use]
    pub fn match_path(&self) -> &str {
        &self.path
    }

    /// Pushes an object for the rules of enclosed elements to find.
    pub fn push(&mut self, object: OpaqueObject) {
        trace!(target: ENGINE_TARGET, path = %self.path, type_name = object.type_name(), depth = self.stack.len(), "push");
        self.stack.push(object);
    }

    /// Pops the top of the object stack.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyStack`] on underflow, which indicates an
    /// unbalanced cooperating rule.
    pub fn pop(&mut self) -> Result<OpaqueObject, EngineError> {
        self.stack.pop().ok_or_else(|| EngineError::EmptyStack {
            path: self.path.clone(),
        })
    }

    /// Borrows the top of the object stack, when one exists.
    #[must_use]
    pub fn peek(&self) -> Option<&OpaqueObject> {
        self.stack.last()
    }

    /// Current stack depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Resolves and default-constructs a type through the engine's context.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Resolve`] when the name is unknown or
    /// construction fails.
    pub fn instantiate(&self, type_name: &str) -> Result<OpaqueObject, EngineError> {
        Ok(self.context.instantiate(type_name)?)
    }

    /// Hands a popped object back to the engine once its element closed.
    ///
    /// When the stack has emptied, the object is the root of the finished
    /// graph and is kept for [`RuleEngine::take_root`]; otherwise the
    /// enclosing element's rules own the wiring and the object is dropped
    /// here.
    pub fn complete(&mut self, object: OpaqueObject) {
        if self.stack.is_empty() {
            self.root = Some(object);
        }
    }

    /// Takes the root object produced by the last completed parse, if any.
    pub fn take_root(&mut self) -> Option<OpaqueObject> {
        self.root.take()
    }

    /// Feeds an element-begin event into the engine.
    ///
    /// Extends the match path and invokes `begin` on every rule registered
    /// for the resulting path, in registration order.
    ///
    /// # Errors
    ///
    /// Propagates the first rule failure; the parse should be abandoned.
    pub fn begin_element(
        &mut self,
        name: &str,
        attributes: &Attributes,
    ) -> Result<(), EngineError> {
        if !self.path.is_empty() {
            self.path.push('/');
        }
        self.path.push_str(name);
        debug!(target: ENGINE_TARGET, path = %self.path, "begin element");
        for rule in self.matching_rules() {
            rule.begin(self, attributes)?;
        }
        Ok(())
    }

    /// Feeds an element-end event into the engine.
    ///
    /// Invokes `end` on the matching rules in reverse registration order,
    /// then retracts the match path by one segment.
    ///
    /// # Errors
    ///
    /// Propagates the first rule failure; the parse should be abandoned.
    pub fn end_element(&mut self) -> Result<(), EngineError> {
        debug!(target: ENGINE_TARGET, path = %self.path, "end element");
        let matched = self.matching_rules();
        for rule in matched.iter().rev() {
            rule.end(self)?;
        }
        match self.path.rfind('/') {
            Some(separator) => self.path.truncate(separator),
            None => self.path.clear(),
        }
        Ok(())
    }

    fn matching_rules(&self) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|(pattern, _)| pattern == &self.path)
            .map(|(_, rule)| Arc::clone(rule))
            .collect()
    }
}
