//! Rule-dispatch stack machine for declarative object assembly.
//!
//! A structured configuration document is parsed elsewhere; this crate
//! consumes the resulting element-begin and element-end events and turns
//! them into a live object graph. Each event dispatches to the rules
//! registered for the current element path, and rules cooperate through a
//! shared object stack whose pushes and pops must balance across one
//! element's begin/end pair.
//!
//! Type names encountered in the document resolve through the engine's
//! loading context, so the same isolation rules apply here as everywhere
//! else in the substrate.

mod attributes;
mod engine;
mod object_create;
mod rule;

pub use attributes::Attributes;
pub use engine::{EngineError, RuleEngine};
pub use object_create::ObjectCreateRule;
pub use rule::Rule;
