//! Binary entry point for the hearth daemon.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use tracing::error;

use hearth_config::{BASE_PROP, HOME_PROP, LogFormat, PropertyTable, default_log_filter};
use hearthd::{BASE_ENV_VAR, Bootstrap, Cli, HOME_ENV_VAR, commands, telemetry};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = std::env::var(telemetry::LOG_FILTER_ENV_VAR)
        .unwrap_or_else(|_| default_log_filter().to_owned());
    let format = std::env::var(telemetry::LOG_FORMAT_ENV_VAR)
        .ok()
        .and_then(|raw| raw.parse::<LogFormat>().ok())
        .unwrap_or_default();
    if telemetry::initialise(&filter, format).is_err() {
        // Nothing can be logged when telemetry itself fails to come up.
        return ExitCode::FAILURE;
    }

    let cwd = match std::env::current_dir().map(Utf8PathBuf::from_path_buf) {
        Ok(Ok(cwd)) => cwd,
        Ok(Err(_)) | Err(_) => {
            error!("working directory is unavailable or not valid UTF-8");
            return ExitCode::FAILURE;
        }
    };

    let mut table = PropertyTable::new();
    if let Ok(home) = std::env::var(HOME_ENV_VAR) {
        table.set(HOME_PROP, home);
    }
    if let Ok(base) = std::env::var(BASE_ENV_VAR) {
        table.set(BASE_PROP, base);
    }

    let mut bootstrap = Bootstrap::new(table, cwd);
    commands::run(&mut bootstrap, cli.arguments)
}
