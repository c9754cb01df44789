//! Rule contract for element-begin and element-end events.

use crate::attributes::Attributes;
use crate::engine::{EngineError, RuleEngine};

/// A unit of behaviour triggered by structured-document parse events.
///
/// Both hooks default to no-ops so a rule only implements the events it
/// cares about. Any push a rule performs in [`Rule::begin`] must be matched
/// by a pop in [`Rule::end`] for the same element; violating that balance
/// corrupts sibling rules' view of the stack top.
pub trait Rule: Send + Sync {
    /// Called when the element this rule is registered for begins.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the rule cannot process the element;
    /// the failure is terminal for the current document.
    fn begin(&self, engine: &mut RuleEngine, attributes: &Attributes) -> Result<(), EngineError> {
        let _ = (engine, attributes);
        Ok(())
    }

    /// Called when the element this rule is registered for ends.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the rule cannot complete the element.
    fn end(&self, engine: &mut RuleEngine) -> Result<(), EngineError> {
        let _ = engine;
        Ok(())
    }
}
