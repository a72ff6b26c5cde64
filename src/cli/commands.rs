//! Command definitions for the pomo CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::instance::DEFAULT_LOCK_PORT;
use crate::types::{DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

// ============================================================================
// CLI Structure
// ============================================================================

/// pomo - a Pomodoro timer for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "pomo",
    version,
    about = "Pomodoro work/break timer for the terminal",
    long_about = "A Pomodoro countdown timer. Type commands on stdin to start, pause, \
                  reset, or change durations. Only one instance may run at a time.",
    propagate_version = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Run arguments given without the `run` subcommand
    #[command(flatten)]
    pub run: RunArgs,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Returns the command to execute, treating a bare invocation as `run`.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Run(self.run))
    }
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer (default)
    Run(RunArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Work duration in minutes (1-60)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_WORK_MINUTES,
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub work: u32,

    /// Break duration in minutes (1-60)
    #[arg(
        short,
        long = "break",
        default_value_t = DEFAULT_BREAK_MINUTES,
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub break_time: u32,

    /// Disable notification sounds
    #[arg(long)]
    pub no_sound: bool,

    /// Audio file played when a period ends
    #[arg(long, value_name = "PATH", conflicts_with = "no_sound")]
    pub sound: Option<PathBuf>,

    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Start with the status window hidden
    #[arg(long)]
    pub hidden: bool,

    /// Local port used as the single-instance lock
    #[arg(long, hide = true, default_value_t = DEFAULT_LOCK_PORT)]
    pub lock_port: u16,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            work: DEFAULT_WORK_MINUTES,
            break_time: DEFAULT_BREAK_MINUTES,
            no_sound: false,
            sound: None,
            json: false,
            hidden: false,
            lock_port: DEFAULT_LOCK_PORT,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
