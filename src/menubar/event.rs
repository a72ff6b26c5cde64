//! Event handling for user intents.
//!
//! This module handles:
//! - The closed set of user intents (`MenuAction`)
//! - Mapping tray menu items to intents
//! - Updates pushed to the tray from the rest of the app
//!
//! The types are platform-independent. Native tray events are translated
//! into these types in the platform-specific code.

use std::fmt;

use super::menu::TrayView;

// ============================================================================
// MenuAction
// ============================================================================

/// Actions the user can trigger from the tray, the console, or the window.
///
/// Every user gesture is reduced to one of these before it reaches the
/// timer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    /// Start or pause the countdown
    ToggleTimer,
    /// Rewind the current period
    Reset,
    /// Open the settings form
    OpenSettings,
    /// Show or hide the status window
    ToggleWindowVisibility,
    /// Quit the application
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_command())
    }
}

impl MenuAction {
    /// All intents, in menu order.
    pub const ALL: [MenuAction; 5] = [
        MenuAction::ToggleTimer,
        MenuAction::Reset,
        MenuAction::OpenSettings,
        MenuAction::ToggleWindowVisibility,
        MenuAction::Quit,
    ];

    /// Returns the console command name for this action.
    pub fn as_command(&self) -> &'static str {
        match self {
            MenuAction::ToggleTimer => "toggle",
            MenuAction::Reset => "reset",
            MenuAction::OpenSettings => "settings",
            MenuAction::ToggleWindowVisibility => "window",
            MenuAction::Quit => "quit",
        }
    }

    /// Returns the single-key shortcut accepted on the console.
    pub fn shortcut(&self) -> char {
        match self {
            MenuAction::ToggleTimer => 't',
            MenuAction::Reset => 'r',
            MenuAction::OpenSettings => 's',
            MenuAction::ToggleWindowVisibility => 'w',
            MenuAction::Quit => 'q',
        }
    }

    /// Returns a human-readable description of this action.
    pub fn description(&self) -> &'static str {
        match self {
            MenuAction::ToggleTimer => "start or pause the timer",
            MenuAction::Reset => "reset the current period",
            MenuAction::OpenSettings => "change work and break durations",
            MenuAction::ToggleWindowVisibility => "show or hide the status line",
            MenuAction::Quit => "quit",
        }
    }
}

// ============================================================================
// MenuItemId
// ============================================================================

/// Identifiers for tray menu items.
///
/// On macOS, these map to the native menu item IDs from tray-icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    /// Show/hide window item
    ToggleWindow,
    /// Start/stop item
    ToggleTimer,
    /// Reset item
    Reset,
    /// Quit item
    Quit,
    /// Unknown or unhandled menu item
    Unknown,
}

impl MenuItemId {
    /// Returns the native menu item ID string.
    pub fn as_id(&self) -> &'static str {
        match self {
            MenuItemId::ToggleWindow => "toggle_window",
            MenuItemId::ToggleTimer => "toggle_timer",
            MenuItemId::Reset => "reset",
            MenuItemId::Quit => "quit",
            MenuItemId::Unknown => "unknown",
        }
    }

    /// Parses a native menu item ID string.
    pub fn from_id(id: &str) -> Self {
        match id {
            "toggle_window" => MenuItemId::ToggleWindow,
            "toggle_timer" => MenuItemId::ToggleTimer,
            "reset" => MenuItemId::Reset,
            "quit" => MenuItemId::Quit,
            _ => MenuItemId::Unknown,
        }
    }

    /// Converts a menu item ID to the corresponding action.
    pub fn to_action(&self) -> Option<MenuAction> {
        match self {
            MenuItemId::ToggleWindow => Some(MenuAction::ToggleWindowVisibility),
            MenuItemId::ToggleTimer => Some(MenuAction::ToggleTimer),
            MenuItemId::Reset => Some(MenuAction::Reset),
            MenuItemId::Quit => Some(MenuAction::Quit),
            MenuItemId::Unknown => None,
        }
    }
}

// ============================================================================
// EventHandler
// ============================================================================

/// Converts tray menu clicks into actions.
#[derive(Debug, Default)]
pub struct EventHandler;

impl EventHandler {
    /// Creates a new EventHandler.
    pub fn new() -> Self {
        Self
    }

    /// Processes a menu item click and returns the corresponding action.
    ///
    /// Returns `None` if the item doesn't trigger an action.
    pub fn handle_click(&self, item_id: MenuItemId) -> Option<MenuAction> {
        let action = item_id.to_action();

        match action {
            Some(ref action) => tracing::info!(action = %action, "tray action received"),
            None => tracing::debug!(item = item_id.as_id(), "ignoring tray item"),
        }

        action
    }
}

// ============================================================================
// TrayUpdate
// ============================================================================

/// Updates sent to the tray icon from the rest of the app.
///
/// Carried over crossbeam-channel so the tray can live on whichever thread
/// the platform requires.
#[derive(Debug, Clone, PartialEq)]
pub enum TrayUpdate {
    /// Replace title, tooltip, and menu labels
    Refresh(TrayView),
    /// Remove the tray icon
    Shutdown,
}

// ============================================================================
// Tests
// ============================================================================
