//! Unit tests for entry command selection and dispatch.

use std::any::Any;
use std::sync::Arc;

use camino::Utf8PathBuf;
use rstest::rstest;
use tempfile::TempDir;

use hearth_config::PropertyTable;
use hearth_loader::{LateBindingError, LateBound, LoaderContext, OpaqueObject, Value, active};

use super::{CommandOutcome, EntryCommand, dispatch};
use crate::bootstrap::Bootstrap;
use crate::server::SERVER_TYPE;

fn workspace() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let cwd = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 path");
    (dir, cwd)
}

fn booted() -> (TempDir, Bootstrap) {
    let (dir, cwd) = workspace();
    let mut bootstrap = Bootstrap::new(PropertyTable::new(), cwd);
    bootstrap.init().expect("init");
    (dir, bootstrap)
}

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|token| (*token).to_owned()).collect()
}

/// An entry point that loads cleanly but never produces a server.
struct HollowServer;

impl LateBound for HollowServer {
    fn type_name(&self) -> &str {
        SERVER_TYPE
    }

    fn invoke(&mut self, method: &str, _args: Vec<Value>) -> Result<Value, LateBindingError> {
        match method {
            "set_parent_context" | "load" | "start" | "stop" | "stop_server" | "set_await" => {
                Ok(Value::Unit)
            }
            "get_await" | "get_server" => Ok(Value::Bool(false)),
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

fn hollow_bootstrap() -> (TempDir, Bootstrap) {
    let (dir, cwd) = workspace();
    let ambient = LoaderContext::ambient();
    ambient.register(
        SERVER_TYPE,
        Arc::new(|| Ok(Box::new(HollowServer) as OpaqueObject)),
    );
    let mut bootstrap = Bootstrap::with_ambient(PropertyTable::new(), cwd, ambient);
    bootstrap.init().expect("init");
    (dir, bootstrap)
}

#[rstest]
#[case::empty(&[], EntryCommand::Start)]
#[case::start(&["start"], EntryCommand::Start)]
#[case::stop(&["stop"], EntryCommand::Stop)]
#[case::startd(&["startd"], EntryCommand::Startd)]
#[case::stopd(&["stopd"], EntryCommand::Stopd)]
#[case::configtest(&["configtest"], EntryCommand::Configtest)]
#[case::trailing_wins(&["--verbose", "stop"], EntryCommand::Stop)]
fn command_comes_from_the_trailing_token(
    #[case] tokens: &[&str],
    #[case] expected: EntryCommand,
) {
    assert_eq!(EntryCommand::from_args(&args(tokens)), expected);
}

#[test]
fn unrecognised_token_is_preserved() {
    assert_eq!(
        EntryCommand::from_args(&args(&["restart"])),
        EntryCommand::Unknown("restart".to_owned())
    );
}

#[test]
fn start_sets_await_and_starts() {
    let (_dir, mut bootstrap) = booted();
    let outcome = dispatch(&mut bootstrap, args(&["start"])).expect("dispatch");
    assert_eq!(outcome, CommandOutcome::Completed);
    assert!(bootstrap.get_await().expect("get_await"));
    assert!(bootstrap.get_server().expect("get_server"));
    active::clear();
}

#[test]
fn startd_starts_without_awaiting() {
    let (_dir, mut bootstrap) = booted();
    let outcome = dispatch(&mut bootstrap, args(&["startd"])).expect("dispatch");
    assert_eq!(outcome, CommandOutcome::Completed);
    assert!(!bootstrap.get_await().expect("get_await"));
    assert!(bootstrap.get_server().expect("get_server"));
    active::clear();
}

#[test]
fn stop_and_stopd_complete_after_start() {
    let (_dir, mut bootstrap) = booted();
    dispatch(&mut bootstrap, args(&["start"])).expect("start");
    let stopped = dispatch(&mut bootstrap, args(&["stop"])).expect("stop");
    assert_eq!(stopped, CommandOutcome::Completed);
    let stopped_again = dispatch(&mut bootstrap, args(&["stopd"])).expect("stopd");
    assert_eq!(stopped_again, CommandOutcome::Completed);
    active::clear();
}

#[test]
fn configtest_passes_when_a_server_is_produced() {
    let (_dir, mut bootstrap) = booted();
    let outcome = dispatch(&mut bootstrap, args(&["configtest"])).expect("dispatch");
    assert_eq!(outcome, CommandOutcome::Completed);
    active::clear();
}

#[test]
fn configtest_fails_when_no_server_is_produced() {
    let (_dir, mut bootstrap) = hollow_bootstrap();
    let outcome = dispatch(&mut bootstrap, args(&["configtest"])).expect("dispatch");
    assert_eq!(outcome, CommandOutcome::ConfigtestFailed);
    active::clear();
}

#[test]
fn unknown_command_takes_no_action() {
    let (_dir, mut bootstrap) = booted();
    let outcome = dispatch(&mut bootstrap, args(&["restart"])).expect("dispatch");
    assert_eq!(outcome, CommandOutcome::Completed);
    assert!(!bootstrap.get_server().expect("no load happened"));
    active::clear();
}

#[test]
fn facade_errors_propagate_from_dispatch() {
    let (_dir, cwd) = workspace();
    let mut bootstrap = Bootstrap::new(PropertyTable::new(), cwd);
    // Unbound facade: dispatch surfaces the facade's error untouched.
    assert!(dispatch(&mut bootstrap, args(&["stop"])).is_err());
}
