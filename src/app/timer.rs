//! Timer engine for the Pomodoro timer.
//!
//! This module provides the core timer functionality:
//! - State transitions (Work ⇄ Break, running ⇄ stopped)
//! - Event firing for rendering, the tray, and notification sounds
//! - The one-second ticker that drives the countdown

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

use crate::types::{DurationConfig, SettingsError, TickOutcome, TimerMode, TimerState};

/// Cadence of the countdown.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started {
        /// Mode of the running period
        mode: TimerMode,
        /// Seconds left when it started
        remaining_seconds: u32,
    },
    /// Countdown paused
    Paused {
        /// Mode of the paused period
        mode: TimerMode,
        /// Seconds left when it paused
        remaining_seconds: u32,
    },
    /// One second elapsed
    Tick {
        /// Seconds left in the period
        remaining_seconds: u32,
    },
    /// A period ran out; the timer stopped and the mode flipped
    PeriodCompleted {
        /// Mode that just ended
        finished: TimerMode,
        /// Mode that is now ready
        next: TimerMode,
        /// Length of the next period
        next_seconds: u32,
    },
    /// Current period rewound
    Reset {
        /// Mode of the rewound period
        mode: TimerMode,
        /// Full length of the period
        remaining_seconds: u32,
    },
    /// New durations applied
    SettingsApplied {
        /// Work minutes now in effect
        work_minutes: u32,
        /// Break minutes now in effect
        break_minutes: u32,
    },
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Owns the timer state and reports every transition as a [`TimerEvent`].
///
/// The engine is the only writer of [`TimerState`]; everything else reads it
/// through [`TimerEngine::state`].
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a new TimerEngine with the given configuration and event channel.
    pub fn new(config: DurationConfig, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            state: TimerState::new(config),
            event_tx,
        }
    }

    /// Starts or pauses the countdown. Returns the new running flag.
    pub fn toggle(&mut self) -> bool {
        let running = self.state.toggle();
        let mode = self.state.mode();
        let remaining_seconds = self.state.remaining_seconds();

        if running {
            tracing::info!(mode = %mode, remaining_seconds, "timer started");
            self.emit(TimerEvent::Started {
                mode,
                remaining_seconds,
            });
        } else {
            tracing::info!(mode = %mode, remaining_seconds, "timer paused");
            self.emit(TimerEvent::Paused {
                mode,
                remaining_seconds,
            });
        }

        running
    }

    /// Advances the countdown by one second.
    ///
    /// A stopped timer ignores the tick and emits nothing.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.state.tick();

        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Counting { remaining_seconds } => {
                self.emit(TimerEvent::Tick { remaining_seconds });
            }
            TickOutcome::PeriodCompleted { finished, next } => {
                let next_seconds = self.state.remaining_seconds();
                tracing::info!(finished = %finished, next = %next, "period completed");
                self.emit(TimerEvent::Tick {
                    remaining_seconds: 0,
                });
                self.emit(TimerEvent::PeriodCompleted {
                    finished,
                    next,
                    next_seconds,
                });
            }
        }

        outcome
    }

    /// Stops the countdown and rewinds the current period.
    pub fn reset(&mut self) {
        self.state.reset();
        let mode = self.state.mode();
        let remaining_seconds = self.state.remaining_seconds();

        tracing::info!(mode = %mode, "timer reset");
        self.emit(TimerEvent::Reset {
            mode,
            remaining_seconds,
        });
    }

    /// Applies new durations and restarts at a stopped work period.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidDuration`] if either value is out of
    /// range. The state is left untouched and no event is emitted.
    pub fn apply_settings(
        &mut self,
        work_minutes: u32,
        break_minutes: u32,
    ) -> Result<(), SettingsError> {
        if let Err(e) = self.state.apply_settings(work_minutes, break_minutes) {
            tracing::warn!(work_minutes, break_minutes, error = %e, "settings rejected");
            return Err(e);
        }

        tracing::info!(work_minutes, break_minutes, "settings applied");
        self.emit(TimerEvent::SettingsApplied {
            work_minutes,
            break_minutes,
        });
        Ok(())
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Sends an event; a closed receiver is not an error for the timer.
    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("timer event receiver dropped");
        }
    }
}

/// Creates the one-second ticker that drives [`TimerEngine::tick`].
///
/// Missed ticks are skipped rather than replayed in a burst.
pub fn ticker() -> Interval {
    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

// ============================================================================
// Tests
// ============================================================================
