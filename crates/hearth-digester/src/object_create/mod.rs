//! Object creation with optional attribute-driven type override.

use tracing::debug;

use crate::attributes::Attributes;
use crate::engine::{EngineError, RuleEngine};
use crate::rule::Rule;

const RULE_TARGET: &str = "hearth::digester::object_create";

/// Creates an object on element begin and pops it on element end.
///
/// The type name is statically configured at registration time; when an
/// override attribute is configured and present on the element, its value
/// wins for that invocation only. The configuration itself is never
/// mutated and is shared across every matching element occurrence.
#[derive(Debug, Clone)]
pub struct ObjectCreateRule {
    type_name: Option<String>,
    override_attribute: Option<String>,
}

impl ObjectCreateRule {
    /// Rule creating the given type with no override attribute.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            override_attribute: None,
        }
    }

    /// Rule creating the given type unless the named attribute overrides it.
    #[must_use]
    pub fn with_override(type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            override_attribute: Some(attribute.into()),
        }
    }

    /// Rule with no declared type: the named attribute must supply one.
    #[must_use]
    pub fn from_attribute(attribute: impl Into<String>) -> Self {
        Self {
            type_name: None,
            override_attribute: Some(attribute.into()),
        }
    }
}

impl Rule for ObjectCreateRule {
    fn begin(&self, engine: &mut RuleEngine, attributes: &Attributes) -> Result<(), EngineError> {
        let mut resolved = self.type_name.as_deref();
        if let Some(attribute) = self.override_attribute.as_deref() {
            if let Some(value) = attributes.get(attribute) {
                resolved = Some(value);
            }
        }
        let Some(type_name) = resolved else {
            return Err(EngineError::MissingTypeName {
                path: engine.match_path().to_owned(),
            });
        };
        debug!(target: RULE_TARGET, path = engine.match_path(), type_name, "new");
        let instance = engine.instantiate(type_name)?;
        engine.push(instance);
        Ok(())
    }

    fn end(&self, engine: &mut RuleEngine) -> Result<(), EngineError> {
        let top = engine.pop()?;
        debug!(target: RULE_TARGET, path = engine.match_path(), type_name = top.type_name(), "pop");
        engine.complete(top);
        Ok(())
    }
}
