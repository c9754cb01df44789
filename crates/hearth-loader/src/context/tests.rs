//! Unit tests for chained context resolution.

use std::any::Any;

use super::*;
use crate::port::{LateBindingError, Value};

#[derive(Default)]
struct Widget;

impl LateBound for Widget {
    fn type_name(&self) -> &str {
        "test.Widget"
    }

    fn invoke(&mut self, method: &str, _args: Vec<Value>) -> Result<Value, LateBindingError> {
        Err(LateBindingError::MethodNotFound {
            type_name: self.type_name().to_owned(),
            method: method.to_owned(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
struct Gadget;

impl LateBound for Gadget {
    fn type_name(&self) -> &str {
        "test.Gadget"
    }

    fn invoke(&mut self, method: &str, _args: Vec<Value>) -> Result<Value, LateBindingError> {
        Err(LateBindingError::MethodNotFound {
            type_name: self.type_name().to_owned(),
            method: method.to_owned(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn resolves_locally_registered_type() {
    let context = LoaderContext::new("server", None, Vec::new());
    context.register_default::<Widget>("test.Widget");
    let instance = context.instantiate("test.Widget").expect("instantiate");
    assert_eq!(instance.type_name(), "test.Widget");
}

#[test]
fn falls_back_to_parent_lookup() {
    let parent = LoaderContext::new("common", None, Vec::new());
    parent.register_default::<Widget>("test.Widget");
    let child = LoaderContext::new("server", Some(parent), Vec::new());
    let instance = child.instantiate("test.Widget").expect("instantiate");
    assert_eq!(instance.type_name(), "test.Widget");
}

#[test]
fn child_registration_shadows_parent() {
    let parent = LoaderContext::new("common", None, Vec::new());
    parent.register_default::<Widget>("test.Thing");
    let child = LoaderContext::new("server", Some(parent), Vec::new());
    child.register_default::<Gadget>("test.Thing");
    let instance = child.instantiate("test.Thing").expect("instantiate");
    assert_eq!(instance.type_name(), "test.Gadget");
}

#[test]
fn parent_cannot_see_child_registrations() {
    let parent = LoaderContext::new("common", None, Vec::new());
    let child = LoaderContext::new("server", Some(parent.clone()), Vec::new());
    child.register_default::<Widget>("test.Widget");
    let error = parent
        .instantiate("test.Widget")
        .expect_err("parent lookup should fail");
    assert!(matches!(error, ResolveError::UnknownType { name, .. } if name == "test.Widget"));
}

#[test]
fn failing_factory_surfaces_instantiation_error() {
    let context = LoaderContext::new("server", None, Vec::new());
    context.register(
        "test.Broken",
        Arc::new(|| {
            Err(InstantiationError {
                type_name: "test.Broken".to_owned(),
                message: "constructor refused".to_owned(),
            })
        }),
    );
    let error = context
        .instantiate("test.Broken")
        .expect_err("construction should fail");
    assert!(matches!(error, ResolveError::Instantiation(_)));
    assert!(error.to_string().contains("constructor refused"));
}
