//! CLI module for pomo.
//!
//! This module provides the command-line and console interface:
//! - `commands`: Command definitions using clap derive
//! - `input`: Console command parsing
//! - `settings`: Interactive settings form
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod input;
pub mod settings;

pub use commands::{Cli, Commands, RunArgs};
pub use display::Display;
pub use input::{parse_command, ConsoleCommand};
pub use settings::{FormOutcome, SettingsForm};
