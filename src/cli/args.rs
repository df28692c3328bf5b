//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::{Field, NodePath};

/// Hierarchical task outline kept in a YAML document
#[derive(Parser, Debug)]
#[command(name = "tasktree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Task list document (default: from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Extra config file layered over the global one
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the task tree
    Show {
        /// Include finished tasks even if config hides them
        #[arg(short, long)]
        all: bool,
    },

    /// Add a task
    Add {
        /// Parent task path (default: top level)
        #[arg(short, long)]
        under: Option<NodePath>,
        /// Position among the parent's children (default: append)
        #[arg(long)]
        at: Option<usize>,
        /// Task description
        #[arg(num_args = 1.., required = true)]
        description: Vec<String>,
    },

    /// Set one field of a task
    Set {
        /// Task path, e.g. 0.2
        path: NodePath,
        /// description | done | expanded
        field: Field,
        /// New value
        value: String,
    },

    /// Mark a task done
    Done {
        /// Task path
        path: NodePath,
    },

    /// Mark a task not done
    Undone {
        /// Task path
        path: NodePath,
    },

    /// Remove a task and its subtasks
    Remove {
        /// Task path
        path: NodePath,
        /// Number of consecutive siblings to remove
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Move tasks under another parent
    Move {
        /// First task to move
        path: NodePath,
        /// Destination parent path (`/` for top level)
        to: NodePath,
        /// Destination position, counted before the move
        position: usize,
        /// Number of consecutive siblings to move
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Remove all tasks
    Clear,

    /// Print tasks as plain transfer text
    Export {
        /// Task paths
        #[arg(num_args = 1.., required = true)]
        paths: Vec<NodePath>,
    },

    /// Manage flat preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommands {
    /// List all preferences
    List,
    /// Print one preference
    Get {
        key: String,
    },
    /// Set a preference; several values make a list
    Set {
        key: String,
        #[arg(num_args = 1.., required = true)]
        values: Vec<String>,
        /// Store the single value as hex-encoded bytes
        #[arg(long)]
        bytes: bool,
    },
    /// Delete a preference
    Unset {
        key: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a config template
    Template,
    /// Show config file locations
    Path,
}
