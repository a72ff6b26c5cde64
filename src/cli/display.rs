//! Display utilities for the pomo console.
//!
//! This module provides formatted output for:
//! - The status line (mode, time, progress bar, running flag)
//! - Timer events and period-change banners
//! - JSON event lines
//! - Help and error messages
//!
//! Formatting functions return strings; the app decides where they go.

use serde::Serialize;

use crate::app::timer::TimerEvent;
use crate::menubar::MenuAction;
use crate::types::{format_mmss, StatusSnapshot, TimerMode, TimerState};

/// Width of the progress bar in cells.
pub const PROGRESS_BAR_WIDTH: usize = 20;

const BAR_FILLED: char = '#';
const BAR_EMPTY: char = '-';

// ============================================================================
// JsonLine
// ============================================================================

/// One `--json` output line: the event plus the status after it.
#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    #[serde(flatten)]
    event: &'a TimerEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a StatusSnapshot>,
}

// ============================================================================
// Display
// ============================================================================

/// Display utilities for console output.
pub struct Display;

impl Display {
    /// Formats the one-line status, e.g.
    /// `Work   24:59  [####----------------]   20%  running`.
    pub fn status_line(state: &TimerState) -> String {
        let ratio = state.progress_ratio();
        format!(
            "{:<5}  {}  [{}]  {:>3}%  {}",
            state.mode().label(),
            format_mmss(i64::from(state.remaining_seconds())),
            Self::progress_bar(ratio, PROGRESS_BAR_WIDTH),
            Self::percent(ratio),
            if state.is_running() { "running" } else { "stopped" },
        )
    }

    /// Renders a fixed-width bar for a ratio in `[0, 1]`.
    pub fn progress_bar(ratio: f64, width: usize) -> String {
        let ratio = if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = ((ratio * width as f64).round() as usize).min(width);
        let mut bar = String::with_capacity(width);
        bar.extend(std::iter::repeat(BAR_FILLED).take(filled));
        bar.extend(std::iter::repeat(BAR_EMPTY).take(width - filled));
        bar
    }

    fn percent(ratio: f64) -> u32 {
        (ratio.clamp(0.0, 1.0) * 100.0).round() as u32
    }

    /// Formats a timer event for humans.
    ///
    /// Returns `None` for per-second ticks, which only update the status line.
    pub fn event_message(event: &TimerEvent) -> Option<String> {
        match event {
            TimerEvent::Started {
                mode,
                remaining_seconds,
            } => Some(format!(
                "> {} started, {} left",
                mode.label(),
                format_mmss(i64::from(*remaining_seconds))
            )),
            TimerEvent::Paused {
                mode,
                remaining_seconds,
            } => Some(format!(
                "|| {} paused at {}",
                mode.label(),
                format_mmss(i64::from(*remaining_seconds))
            )),
            TimerEvent::Tick { .. } => None,
            TimerEvent::PeriodCompleted {
                finished,
                next,
                next_seconds,
            } => Some(Self::banner(*finished, *next, *next_seconds)),
            TimerEvent::Reset {
                mode,
                remaining_seconds,
            } => Some(format!(
                "[] {} reset to {}",
                mode.label(),
                format_mmss(i64::from(*remaining_seconds))
            )),
            TimerEvent::SettingsApplied {
                work_minutes,
                break_minutes,
            } => Some(format!(
                "* Settings saved: work {} min, break {} min",
                work_minutes, break_minutes
            )),
        }
    }

    /// Banner announced at a period boundary.
    pub fn banner(finished: TimerMode, next: TimerMode, next_seconds: u32) -> String {
        format!(
            "\n*** {} ***\n{} is over. Type 't' to start the {} {} period.",
            next.banner(),
            finished.label(),
            format_mmss(i64::from(next_seconds)),
            next.as_str(),
        )
    }

    /// Serializes an event, and the status when given, as one JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json_line(
        event: &TimerEvent,
        status: Option<&StatusSnapshot>,
    ) -> Result<String, serde_json::Error> {
        serde_json::to_string(&JsonLine { event, status })
    }

    /// Serializes a bare status snapshot as one JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json_status(status: &StatusSnapshot) -> Result<String, serde_json::Error> {
        serde_json::to_string(status)
    }

    /// Command reference printed by `help`.
    pub fn help_text() -> String {
        let mut text = String::from("Commands:\n");
        for action in MenuAction::ALL {
            text.push_str(&format!(
                "  {}, {:<10} {}\n",
                action.shortcut(),
                action.as_command(),
                action.description()
            ));
        }
        text.push_str("  settings <work> <break>  apply durations directly\n");
        text.push_str("  status        print the current status\n");
        text.push_str("  h, help       show this list");
        text
    }

    /// Hint for an unrecognised command.
    pub fn unknown_command(input: &str) -> String {
        format!("Unknown command '{}'. Type 'help' for a list.", input)
    }

    /// Shows an error message on stderr.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DurationConfig;

    mod progress_bar_tests {
        use super::*;

        #[test]
        fn test_empty_and_full() {
            assert_eq!(Display::progress_bar(0.0, 4), "----");
            assert_eq!(Display::progress_bar(1.0, 4), "####");
        }

        #[test]
        fn test_partial() {
            assert_eq!(Display::progress_bar(0.5, 10), "#####-----");
            assert_eq!(Display::progress_bar(0.2, 20).matches('#').count(), 4);
        }

        #[test]
        fn test_out_of_range_clamps() {
            assert_eq!(Display::progress_bar(-1.0, 3), "---");
            assert_eq!(Display::progress_bar(7.0, 3), "###");
            assert_eq!(Display::progress_bar(f64::NAN, 3), "---");
        }
    }

    mod status_line_tests {
        use super::*;

        #[test]
        fn test_initial_status() {
            let state = TimerState::new(DurationConfig::default());
            assert_eq!(
                Display::status_line(&state),
                "Work   25:00  [--------------------]    0%  stopped"
            );
        }

        #[test]
        fn test_running_status() {
            let mut state = TimerState::new(DurationConfig::new(1, 1).unwrap());
            state.toggle();
            for _ in 0..15 {
                state.tick();
            }
            let line = Display::status_line(&state);
            assert!(line.starts_with("Work   00:45"));
            assert!(line.contains("[#####---------------]"));
            assert!(line.contains(" 25%"));
            assert!(line.ends_with("running"));
        }
    }

    mod event_tests {
        use super::*;

        #[test]
        fn test_tick_is_silent() {
            let event = TimerEvent::Tick {
                remaining_seconds: 10,
            };
            assert!(Display::event_message(&event).is_none());
        }

        #[test]
        fn test_period_completed_banner() {
            let event = TimerEvent::PeriodCompleted {
                finished: TimerMode::Work,
                next: TimerMode::Break,
                next_seconds: 300,
            };
            let message = Display::event_message(&event).unwrap();
            assert!(message.contains("Break!"));
            assert!(message.contains("05:00"));
        }

        #[test]
        fn test_messages() {
            let started = TimerEvent::Started {
                mode: TimerMode::Work,
                remaining_seconds: 1500,
            };
            assert_eq!(
                Display::event_message(&started).unwrap(),
                "> Work started, 25:00 left"
            );

            let settings = TimerEvent::SettingsApplied {
                work_minutes: 30,
                break_minutes: 10,
            };
            assert!(Display::event_message(&settings)
                .unwrap()
                .contains("work 30 min, break 10 min"));
        }
    }

    mod json_tests {
        use super::*;

        #[test]
        fn test_json_line_flattens_event() {
            let state = TimerState::new(DurationConfig::default());
            let status = StatusSnapshot::from_timer_state(&state);
            let event = TimerEvent::Reset {
                mode: TimerMode::Work,
                remaining_seconds: 1500,
            };

            let line = Display::json_line(&event, Some(&status)).unwrap();
            let value: serde_json::Value = serde_json::from_str(&line).unwrap();

            assert_eq!(value["event"], "reset");
            assert_eq!(value["mode"], "work");
            assert_eq!(value["remainingSeconds"], 1500);
            assert_eq!(value["status"]["display"], "25:00");
            assert_eq!(value["status"]["running"], false);
        }

        #[test]
        fn test_json_line_without_status() {
            let event = TimerEvent::Tick {
                remaining_seconds: 0,
            };

            let line = Display::json_line(&event, None).unwrap();
            assert_eq!(line, r#"{"event":"tick","remainingSeconds":0}"#);
        }
    }

    #[test]
    fn test_help_lists_every_action() {
        let help = Display::help_text();
        for action in MenuAction::ALL {
            assert!(help.contains(action.as_command()));
        }
    }

    #[test]
    fn test_unknown_command() {
        assert!(Display::unknown_command("xyz").contains("'xyz'"));
    }
}
