//! Menu building for the tray.
//!
//! Menu labels follow the timer and window state:
//! - "Hide Window" / "Show Window"
//! - "Start" / "Stop"
//! - "Reset"
//! - "Quit"
//!
//! The configuration logic is platform-independent and fully testable.

use crate::types::TimerState;

use super::icon::IconManager;

// ============================================================================
// MenuItemConfig
// ============================================================================

/// Configuration for a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemConfig {
    /// Display text for the menu item
    pub text: String,
    /// Whether the menu item is enabled (clickable)
    pub enabled: bool,
}

impl MenuItemConfig {
    /// Creates a new menu item configuration.
    pub fn new(text: impl Into<String>, enabled: bool) -> Self {
        Self {
            text: text.into(),
            enabled,
        }
    }
}

// ============================================================================
// MenuConfig
// ============================================================================

/// Complete menu configuration for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    /// Show/hide window
    pub toggle_window: MenuItemConfig,
    /// Start/stop timer
    pub toggle_timer: MenuItemConfig,
    /// Reset current period
    pub reset: MenuItemConfig,
    /// Quit (after a separator)
    pub quit: MenuItemConfig,
}

// ============================================================================
// TrayView
// ============================================================================

/// Everything the tray displays, rendered from timer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayView {
    /// Menu bar title, e.g. "🍅 24:59"
    pub title: String,
    /// Hover tooltip, e.g. "Work · 24:59"
    pub tooltip: String,
    /// Menu labels
    pub menu: MenuConfig,
}

impl TrayView {
    /// Renders the view for the given state and window visibility.
    pub fn render(state: &TimerState, window_visible: bool) -> Self {
        Self {
            title: IconManager::title(state),
            tooltip: IconManager::tooltip(state),
            menu: MenuBuilder::new().build(state, window_visible),
        }
    }
}

// ============================================================================
// MenuBuilder
// ============================================================================

/// Builds menu configuration based on timer state.
#[derive(Debug, Default)]
pub struct MenuBuilder;

impl MenuBuilder {
    /// Creates a new MenuBuilder.
    pub fn new() -> Self {
        Self
    }

    /// Builds a complete menu configuration.
    pub fn build(&self, state: &TimerState, window_visible: bool) -> MenuConfig {
        MenuConfig {
            toggle_window: MenuItemConfig::new(Self::window_label(window_visible), true),
            toggle_timer: MenuItemConfig::new(Self::timer_label(state.is_running()), true),
            reset: MenuItemConfig::new("Reset", true),
            quit: MenuItemConfig::new("Quit", true),
        }
    }

    /// Label of the show/hide item.
    pub fn window_label(window_visible: bool) -> &'static str {
        if window_visible {
            "Hide Window"
        } else {
            "Show Window"
        }
    }

    /// Label of the start/stop item.
    pub fn timer_label(running: bool) -> &'static str {
        if running {
            "Stop"
        } else {
            "Start"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DurationConfig;

    #[test]
    fn test_build_stopped_visible() {
        let state = TimerState::new(DurationConfig::default());
        let config = MenuBuilder::new().build(&state, true);

        assert_eq!(config.toggle_window.text, "Hide Window");
        assert_eq!(config.toggle_timer.text, "Start");
        assert_eq!(config.reset.text, "Reset");
        assert_eq!(config.quit.text, "Quit");
        assert!(config.quit.enabled);
    }

    #[test]
    fn test_build_running_hidden() {
        let mut state = TimerState::new(DurationConfig::default());
        state.toggle();
        let config = MenuBuilder::new().build(&state, false);

        assert_eq!(config.toggle_window.text, "Show Window");
        assert_eq!(config.toggle_timer.text, "Stop");
    }

    #[test]
    fn test_render_view() {
        let state = TimerState::new(DurationConfig::default());
        let view = TrayView::render(&state, true);

        assert_eq!(view.tooltip, "Work · 25:00");
        assert_eq!(view.menu.toggle_timer.text, "Start");
    }
}
