//! Title and tooltip text for the tray.
//!
//! - Title: "🍅 MM:SS" during work, "☕ MM:SS" during a break, with a pause
//!   marker while stopped
//! - Tooltip: "Work · MM:SS" / "Break · MM:SS"

use crate::types::{format_mmss, TimerMode, TimerState};

// ============================================================================
// Constants
// ============================================================================

/// Emoji for work session
const WORKING_EMOJI: &str = "🍅";

/// Emoji for break session
const BREAK_EMOJI: &str = "☕";

/// Marker appended while the timer is stopped
const STOPPED_MARKER: &str = "⏸";

// ============================================================================
// IconManager
// ============================================================================

/// Generates tray text from timer state.
#[derive(Debug, Default)]
pub struct IconManager;

impl IconManager {
    /// Title text shown next to the tray icon.
    pub fn title(state: &TimerState) -> String {
        let time = format_mmss(i64::from(state.remaining_seconds()));
        let emoji = Self::emoji(state.mode());
        if state.is_running() {
            format!("{} {}", emoji, time)
        } else {
            format!("{} {} {}", emoji, time, STOPPED_MARKER)
        }
    }

    /// Hover tooltip.
    pub fn tooltip(state: &TimerState) -> String {
        format!(
            "{} · {}",
            state.mode().label(),
            format_mmss(i64::from(state.remaining_seconds()))
        )
    }

    /// Emoji for a mode.
    pub fn emoji(mode: TimerMode) -> &'static str {
        match mode {
            TimerMode::Work => WORKING_EMOJI,
            TimerMode::Break => BREAK_EMOJI,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
