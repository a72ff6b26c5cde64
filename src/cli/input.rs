//! Console command parsing.
//!
//! One command per line. Shortcuts and long forms map onto the same
//! `MenuAction`s the tray produces.

use crate::menubar::MenuAction;

// ============================================================================
// ConsoleCommand
// ============================================================================

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// A user intent
    Action(MenuAction),
    /// Direct settings submission: `settings <work> <break>`
    ApplySettings {
        /// Work minutes as typed
        work_minutes: u32,
        /// Break minutes as typed
        break_minutes: u32,
    },
    /// Print the current status once
    Status,
    /// Print the command list
    Help,
    /// Blank line
    Empty,
    /// Anything else, kept for the error hint
    Unknown(String),
}

/// Parses one console line.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn parse_command(line: &str) -> ConsoleCommand {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleCommand::Empty;
    }

    let lowered = line.to_ascii_lowercase();
    let mut words = lowered.split_whitespace();
    let head = words.next().unwrap_or_default();
    let rest: Vec<&str> = words.collect();

    match (head, rest.as_slice()) {
        ("t" | "toggle" | "start" | "stop" | "pause", []) => {
            ConsoleCommand::Action(MenuAction::ToggleTimer)
        }
        ("r" | "reset", []) => ConsoleCommand::Action(MenuAction::Reset),
        ("s" | "settings", []) => ConsoleCommand::Action(MenuAction::OpenSettings),
        ("s" | "settings", [work, brk]) => match (work.parse(), brk.parse()) {
            (Ok(work_minutes), Ok(break_minutes)) => ConsoleCommand::ApplySettings {
                work_minutes,
                break_minutes,
            },
            _ => ConsoleCommand::Unknown(line.to_string()),
        },
        ("w" | "window" | "hide" | "show", []) => {
            ConsoleCommand::Action(MenuAction::ToggleWindowVisibility)
        }
        ("q" | "quit" | "exit", []) => ConsoleCommand::Action(MenuAction::Quit),
        ("status", []) => ConsoleCommand::Status,
        ("h" | "help" | "?", []) => ConsoleCommand::Help,
        _ => ConsoleCommand::Unknown(line.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
