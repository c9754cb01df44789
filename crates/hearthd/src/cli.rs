//! CLI argument definitions for the daemon binary.

use clap::Parser;

/// Command-line interface for the hearth daemon.
///
/// The daemon deliberately takes no flags of its own: the trailing token of
/// the argument list selects the entry command, and the full list is handed
/// through to the bootstrapped subsystem's `load` call.
#[derive(Parser, Debug)]
#[command(name = "hearthd", disable_help_subcommand = true)]
pub struct Cli {
    /// Arguments passed through to the daemon; the last token selects the
    /// entry command (`start` when absent).
    #[arg(
        value_name = "ARG",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub arguments: Vec<String>,
}
