//! pomo library
//!
//! This library provides the core functionality of the pomo Pomodoro timer.
//! It includes:
//! - Timer state machine and duration settings
//! - Timer engine and the single-instance guard
//! - Console command parsing, settings form, and display utilities
//! - Menu bar UI with tray icon (macOS only)
//! - Sound playback for period-end notifications

pub mod app;
pub mod cli;
pub mod menubar;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_mmss, progress_ratio, DurationConfig, DurationField, SettingsError, StatusSnapshot,
    TickOutcome, TimerMode, TimerState,
};

pub use app::{App, AppOptions, Flow, InstanceError, InstanceGuard, TimerEngine, TimerEvent};

// Re-export menubar types
pub use menubar::{
    EventHandler, IconManager, MenuAction, MenuBuilder, MenuConfig, MenuItemConfig, MenuItemId,
    TrayIconManager, TrayLink, TrayUpdate, TrayView,
};

// Re-export sound types
pub use sound::{
    resolve_notification_sound, try_create_player, MockSoundPlayer, RodioSoundPlayer, SoundError,
    SoundPlayer, SoundSource,
};
