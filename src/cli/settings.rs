//! Interactive settings form.
//!
//! Two prompts, work minutes then break minutes, each pre-filled with the
//! value currently in effect. The form only collects numbers; range
//! checking happens in `TimerState::apply_settings`, and the caller calls
//! [`SettingsForm::restart`] when that rejects the pair.

use crate::types::{DurationConfig, DurationField};

/// Answer that discards the form.
pub const CANCEL_WORD: &str = "cancel";

// ============================================================================
// FormOutcome
// ============================================================================

/// Result of feeding one answer to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Ask the next question
    Prompt(String),
    /// Both fields answered
    Submit {
        /// Work minutes entered
        work_minutes: u32,
        /// Break minutes entered
        break_minutes: u32,
    },
    /// User typed `cancel`
    Cancelled,
    /// Answer was not a whole number; the same prompt repeats
    Rejected {
        /// What was wrong
        reason: String,
        /// Prompt to show again
        prompt: String,
    },
}

// ============================================================================
// SettingsForm
// ============================================================================

/// Two-field form for work and break durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    /// Field currently asked for
    field: DurationField,
    /// Values in effect when the form opened
    initial: (u32, u32),
    /// Work minutes collected so far
    work_minutes: u32,
    /// Break minutes collected so far
    break_minutes: u32,
}

impl SettingsForm {
    /// Opens the form pre-filled with the given durations.
    pub fn open(config: &DurationConfig) -> Self {
        let initial = (config.work_minutes(), config.break_minutes());
        Self {
            field: DurationField::Work,
            initial,
            work_minutes: initial.0,
            break_minutes: initial.1,
        }
    }

    /// Field currently asked for.
    pub fn field(&self) -> DurationField {
        self.field
    }

    /// Prompt text for the current field.
    pub fn prompt(&self) -> String {
        match self.field {
            DurationField::Work => {
                format!("Pomodoro time (minutes) [{}]: ", self.work_minutes)
            }
            DurationField::Break => format!("Break time (minutes) [{}]: ", self.break_minutes),
        }
    }

    /// Feeds one line of input to the form.
    pub fn answer(&mut self, line: &str) -> FormOutcome {
        let line = line.trim();
        if line.eq_ignore_ascii_case(CANCEL_WORD) {
            return FormOutcome::Cancelled;
        }

        let value = if line.is_empty() {
            self.current_value()
        } else {
            match line.parse::<u32>() {
                Ok(value) => value,
                Err(_) => {
                    return FormOutcome::Rejected {
                        reason: format!("'{}' is not a whole number of minutes", line),
                        prompt: self.prompt(),
                    };
                }
            }
        };

        match self.field {
            DurationField::Work => {
                self.work_minutes = value;
                self.field = DurationField::Break;
                FormOutcome::Prompt(self.prompt())
            }
            DurationField::Break => {
                self.break_minutes = value;
                FormOutcome::Submit {
                    work_minutes: self.work_minutes,
                    break_minutes: self.break_minutes,
                }
            }
        }
    }

    /// Starts over from the first field with the values the form opened with.
    pub fn restart(&mut self) -> String {
        self.field = DurationField::Work;
        self.work_minutes = self.initial.0;
        self.break_minutes = self.initial.1;
        self.prompt()
    }

    fn current_value(&self) -> u32 {
        match self.field {
            DurationField::Work => self.work_minutes,
            DurationField::Break => self.break_minutes,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
