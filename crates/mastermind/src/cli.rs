//! Command-line interface for mastermind.

use clap::{Parser, Subcommand};
use mastermind_engine::{ModeKind, SessionId};

/// Mastermind - guess the hidden four-digit code (digits 0-7)
#[derive(Parser, Debug)]
#[command(name = "mastermind")]
#[command(about = "Code-breaking game with classic and timed modes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Database path (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a new game
    New {
        /// Game mode
        #[arg(short, long, default_value = "classic")]
        mode: ModeKind,

        /// Time limit in seconds (timed mode only)
        #[arg(long)]
        time_limit: Option<u32>,
    },

    /// Submit a guess, e.g. `guess <ID> 0427`
    Guess {
        /// Session ID
        id: SessionId,

        /// Four digits, each 0-7
        digits: String,
    },

    /// Show a game's state and guess history
    Show {
        /// Session ID
        id: SessionId,
    },

    /// End a game as lost
    Expire {
        /// Session ID
        id: SessionId,
    },

    /// List all games, newest first
    List,
}
