//! Command line surface: argument model, dispatch and exit codes

pub mod args;
pub mod commands;
pub mod error;
pub mod output;

pub use args::{Cli, Commands, ConfigCommands, PrefsCommands};
pub use commands::execute_command;
pub use error::{CliError, CliResult};
