//! Unit tests for the built-in entry point.

use super::*;

fn bound_context() -> Arc<LoaderContext> {
    let context = LoaderContext::new("server", None, Vec::new());
    register_builtins(&context);
    active::bind(Arc::clone(&context));
    context
}

fn invoke(server: &mut Server, method: &str, args: Vec<Value>) -> Result<Value, LateBindingError> {
    LateBound::invoke(server, method, args)
}

#[test]
fn await_flag_round_trips() {
    let mut server = Server::default();
    invoke(&mut server, "set_await", vec![Value::Bool(true)]).expect("set_await");
    let flag = invoke(&mut server, "get_await", Vec::new())
        .expect("get_await")
        .as_bool()
        .expect("boolean return");
    assert!(flag);
}

#[test]
fn load_assembles_the_kernel() {
    let _context = bound_context();
    let mut server = Server::default();
    invoke(&mut server, "load", Vec::new()).expect("load");
    let present = invoke(&mut server, "get_server", Vec::new())
        .expect("get_server")
        .as_bool()
        .expect("boolean return");
    assert!(present);
    active::clear();
}

#[test]
fn get_server_is_false_before_load() {
    let mut server = Server::default();
    let present = invoke(&mut server, "get_server", Vec::new())
        .expect("get_server")
        .as_bool()
        .expect("boolean return");
    assert!(!present);
}

#[test]
fn load_without_bound_context_fails_with_wrapped_cause() {
    active::clear();
    let mut server = Server::default();
    let error = invoke(&mut server, "load", Vec::new()).expect_err("load should fail");
    let cause = error.unwrap_invocation();
    assert!(cause.to_string().contains("no active loading context"));
}

#[test]
fn start_loads_implicitly() {
    let _context = bound_context();
    let mut server = Server::default();
    invoke(&mut server, "start", Vec::new()).expect("start");
    let present = invoke(&mut server, "get_server", Vec::new())
        .expect("get_server")
        .as_bool()
        .expect("boolean return");
    assert!(present);
    active::clear();
}

#[test]
fn kernel_type_override_attribute_wins() {
    // A context where the override name resolves but the default does not:
    // the engine must instantiate the override.
    let context = LoaderContext::new("server", None, Vec::new());
    context.register_default::<Kernel>("custom.Kernel");
    let mut engine = RuleEngine::new(context);
    engine.add_object_create("server", KERNEL_TYPE, Some(CLASS_ATTRIBUTE));
    engine
        .begin_element(
            "server",
            &Attributes::from_pairs([(CLASS_ATTRIBUTE, "custom.Kernel")]),
        )
        .expect("begin");
    engine.end_element().expect("end");
    assert!(engine.take_root().is_some());
}

#[test]
fn unknown_method_is_not_found() {
    let mut server = Server::default();
    let error = invoke(&mut server, "reload", Vec::new()).expect_err("unknown method");
    assert!(matches!(error, LateBindingError::MethodNotFound { .. }));
}

#[test]
fn wiring_call_requires_a_context_argument() {
    let mut server = Server::default();
    let error = invoke(&mut server, "set_parent_context", vec![Value::Bool(true)])
        .expect_err("wrong argument shape");
    assert!(matches!(error, LateBindingError::InvalidArguments { .. }));
}
