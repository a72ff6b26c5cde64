//! Core data types for the Pomodoro timer.
//!
//! This module defines the data structures used for:
//! - Timer mode (work / break)
//! - Duration configuration with validation
//! - Timer state and its transitions
//! - Status snapshots for machine-readable output

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Shortest allowed period in minutes
pub const MIN_DURATION_MINUTES: u32 = 1;

/// Longest allowed period in minutes
pub const MAX_DURATION_MINUTES: u32 = 60;

/// Default work session length in minutes
pub const DEFAULT_WORK_MINUTES: u32 = 25;

/// Default break length in minutes
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

// ============================================================================
// TimerMode
// ============================================================================

/// Whether the current period is a work session or a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Focused work session
    Work,
    /// Rest period
    Break,
}

impl TimerMode {
    /// Returns the machine-readable name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
    }

    /// Returns the capitalized label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Work => "Work",
            TimerMode::Break => "Break",
        }
    }

    /// Returns the banner announced when this mode begins.
    pub fn banner(&self) -> &'static str {
        match self {
            TimerMode::Work => "Work!",
            TimerMode::Break => "Break!",
        }
    }

    /// Returns the other mode.
    pub fn flipped(&self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Work
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SettingsError
// ============================================================================

/// Which duration field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationField {
    /// Work session length
    Work,
    /// Break length
    Break,
}

impl fmt::Display for DurationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationField::Work => f.write_str("pomodoro time"),
            DurationField::Break => f.write_str("break time"),
        }
    }
}

/// Errors raised when applying new duration settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A duration was outside the allowed range.
    #[error(
        "{field} must be between {min} and {max} minutes (got {value})",
        min = MIN_DURATION_MINUTES,
        max = MAX_DURATION_MINUTES
    )]
    InvalidDuration {
        /// The offending field
        field: DurationField,
        /// The rejected value
        value: u32,
    },
}

// ============================================================================
// DurationConfig
// ============================================================================

/// Work and break lengths, both within
/// [`MIN_DURATION_MINUTES`]..=[`MAX_DURATION_MINUTES`].
///
/// Fields are private so a constructed value is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationConfig {
    work_minutes: u32,
    break_minutes: u32,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl DurationConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidDuration`] if either value is out of range.
    pub fn new(work_minutes: u32, break_minutes: u32) -> Result<Self, SettingsError> {
        validate_minutes(DurationField::Work, work_minutes)?;
        validate_minutes(DurationField::Break, break_minutes)?;
        Ok(Self {
            work_minutes,
            break_minutes,
        })
    }

    /// Work session length in minutes.
    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    /// Break length in minutes.
    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    /// Total length of a period of the given mode, in seconds.
    pub fn total_seconds(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work_minutes * 60,
            TimerMode::Break => self.break_minutes * 60,
        }
    }
}

fn validate_minutes(field: DurationField, value: u32) -> Result<(), SettingsError> {
    if (MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::InvalidDuration { field, value })
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Result of a single [`TimerState::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is stopped; nothing changed.
    Idle,
    /// One second elapsed and the period continues.
    Counting {
        /// Seconds left in the period
        remaining_seconds: u32,
    },
    /// The period ended: the timer stopped and the mode flipped.
    PeriodCompleted {
        /// Mode of the period that just ended
        finished: TimerMode,
        /// Mode of the period that is now ready
        next: TimerMode,
    },
}

/// Countdown state for the current period.
///
/// Invariant: `remaining_seconds <= config.total_seconds(mode)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    mode: TimerMode,
    remaining_seconds: u32,
    running: bool,
    config: DurationConfig,
}

impl TimerState {
    /// Creates a stopped timer at the start of a work period.
    pub fn new(config: DurationConfig) -> Self {
        Self {
            mode: TimerMode::Work,
            remaining_seconds: config.total_seconds(TimerMode::Work),
            running: false,
            config,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Seconds left in the current period.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Returns true while the countdown is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Active duration configuration.
    pub fn config(&self) -> &DurationConfig {
        &self.config
    }

    /// Total length of the current period in seconds.
    pub fn total_seconds(&self) -> u32 {
        self.config.total_seconds(self.mode)
    }

    /// Starts a stopped timer or pauses a running one.
    ///
    /// Returns the new running flag. Remaining time is kept either way.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Advances the countdown by one second.
    ///
    /// Does nothing while stopped. When the countdown reaches zero the
    /// timer stops, the mode flips, and the new period is loaded in full.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return TickOutcome::Counting {
                remaining_seconds: self.remaining_seconds,
            };
        }

        let finished = self.mode;
        self.running = false;
        self.mode = finished.flipped();
        self.remaining_seconds = self.total_seconds();

        TickOutcome::PeriodCompleted {
            finished,
            next: self.mode,
        }
    }

    /// Stops the timer and rewinds the current period. The mode is kept.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.total_seconds();
    }

    /// Replaces the duration configuration.
    ///
    /// On success the in-progress period is discarded: the timer stops at
    /// the start of a fresh work period. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidDuration`] if either value is out of range.
    pub fn apply_settings(
        &mut self,
        work_minutes: u32,
        break_minutes: u32,
    ) -> Result<(), SettingsError> {
        let config = DurationConfig::new(work_minutes, break_minutes)?;
        self.config = config;
        self.mode = TimerMode::Work;
        self.running = false;
        self.remaining_seconds = config.total_seconds(TimerMode::Work);
        Ok(())
    }

    /// Fraction of the current period that has elapsed, in `[0, 1]`.
    pub fn progress_ratio(&self) -> f64 {
        progress_ratio(self.total_seconds(), i64::from(self.remaining_seconds))
    }
}

/// Elapsed fraction of a period of `total_seconds` with `remaining_seconds`
/// left, clamped to `[0, 1]`. A zero-length period counts as complete.
pub fn progress_ratio(total_seconds: u32, remaining_seconds: i64) -> f64 {
    if total_seconds == 0 {
        return 1.0;
    }
    let total = f64::from(total_seconds);
    let elapsed = total - remaining_seconds as f64;
    (elapsed / total).clamp(0.0, 1.0)
}

/// Formats a second count as zero-padded `MM:SS`. Negative input shows as `00:00`.
pub fn format_mmss(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ============================================================================
// StatusSnapshot
// ============================================================================

/// Read-only view of the timer used for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Current mode
    pub mode: TimerMode,
    /// Seconds left in the period
    pub remaining_seconds: u32,
    /// Remaining time as `MM:SS`
    pub display: String,
    /// Whether the countdown is running
    pub running: bool,
    /// Elapsed fraction of the period
    pub progress: f64,
    /// Configured work minutes
    pub work_minutes: u32,
    /// Configured break minutes
    pub break_minutes: u32,
}

impl StatusSnapshot {
    /// Creates a snapshot from timer state.
    pub fn from_timer_state(state: &TimerState) -> Self {
        Self {
            mode: state.mode(),
            remaining_seconds: state.remaining_seconds(),
            display: format_mmss(i64::from(state.remaining_seconds())),
            running: state.is_running(),
            progress: state.progress_ratio(),
            work_minutes: state.config().work_minutes(),
            break_minutes: state.config().break_minutes(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
