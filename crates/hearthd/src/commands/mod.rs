//! Entry command selection and dispatch.
//!
//! The daemon takes its command from the trailing token of the argument
//! list, defaulting to `start` when no arguments were given. The whole
//! list travels with the command so the bootstrapped subsystem sees the
//! same arguments the operator typed, with the `startd`/`stopd` service
//! aliases remapped to the token the subsystem understands.

use std::process::ExitCode;

use tracing::{error, warn};

use crate::bootstrap::{Bootstrap, BootstrapError};

const COMMANDS_TARGET: &str = "hearth::commands";

/// Command selected from the trailing argument token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryCommand {
    /// Load and start the daemon, awaiting shutdown.
    Start,
    /// Ask a running daemon to stop.
    Stop,
    /// Service-manager alias for `start`; does not set the await flag.
    Startd,
    /// Service-manager alias for `stop`.
    Stopd,
    /// Load the configuration and report whether it produced a server.
    Configtest,
    /// An unrecognised token; logged and otherwise ignored.
    Unknown(String),
}

impl EntryCommand {
    /// Selects the command from the trailing token, `start` when absent.
    #[must_use]
    pub fn from_args(arguments: &[String]) -> Self {
        match arguments.last().map(String::as_str) {
            None => Self::Start,
            Some("start") => Self::Start,
            Some("stop") => Self::Stop,
            Some("startd") => Self::Startd,
            Some("stopd") => Self::Stopd,
            Some("configtest") => Self::Configtest,
            Some(other) => Self::Unknown(other.to_owned()),
        }
    }
}

/// What a dispatched command concluded.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command ran to completion.
    Completed,
    /// `configtest` loaded the configuration but no server was produced.
    ConfigtestFailed,
}

/// Runs one entry command against the facade and maps it to an exit code.
///
/// A facade that is not yet bound is initialised first; a facade bound by
/// an earlier call (typically from another thread) only has its thread
/// context rebound. Any failure is logged, with late-binding failures
/// unwrapped one level so the subsystem's own error reaches the log.
pub fn run(bootstrap: &mut Bootstrap, arguments: Vec<String>) -> ExitCode {
    if bootstrap.is_bound() {
        bootstrap.bind_thread_context();
    } else if let Err(error) = bootstrap.init() {
        error!(target: COMMANDS_TARGET, error = %report(error), "initialisation failed");
        return ExitCode::FAILURE;
    }
    match dispatch(bootstrap, arguments) {
        Ok(CommandOutcome::Completed) => ExitCode::SUCCESS,
        Ok(CommandOutcome::ConfigtestFailed) => ExitCode::FAILURE,
        Err(error) => {
            error!(target: COMMANDS_TARGET, error = %report(error), "command failed");
            ExitCode::FAILURE
        }
    }
}

/// Dispatches the command selected by the trailing argument token.
///
/// # Errors
///
/// Returns [`BootstrapError`] when the facade rejects an operation.
pub fn dispatch(
    bootstrap: &mut Bootstrap,
    mut arguments: Vec<String>,
) -> Result<CommandOutcome, BootstrapError> {
    match EntryCommand::from_args(&arguments) {
        EntryCommand::Startd => {
            remap_trailing(&mut arguments, "start");
            bootstrap.load(&arguments)?;
            bootstrap.start()?;
        }
        EntryCommand::Stopd => {
            remap_trailing(&mut arguments, "stop");
            bootstrap.stop()?;
        }
        EntryCommand::Start => {
            bootstrap.set_await(true)?;
            bootstrap.load(&arguments)?;
            bootstrap.start()?;
        }
        EntryCommand::Stop => {
            bootstrap.stop_server(&arguments)?;
        }
        EntryCommand::Configtest => {
            bootstrap.load(&arguments)?;
            if !bootstrap.get_server()? {
                return Ok(CommandOutcome::ConfigtestFailed);
            }
        }
        EntryCommand::Unknown(token) => {
            warn!(target: COMMANDS_TARGET, command = %token, "command does not exist");
        }
    }
    Ok(CommandOutcome::Completed)
}

fn remap_trailing(arguments: &mut [String], replacement: &str) {
    if let Some(last) = arguments.last_mut() {
        replacement.clone_into(last);
    }
}

fn report(error: BootstrapError) -> Box<dyn std::error::Error + Send + Sync> {
    match error {
        BootstrapError::LateBinding(inner) => inner.unwrap_invocation(),
        other => Box::new(other),
    }
}

#[cfg(test)]
mod tests;
