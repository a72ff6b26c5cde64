//! Menu bar UI module for the Pomodoro timer.
//!
//! This module provides:
//! - Tray icon management for the macOS menu bar
//! - Live countdown in the title (e.g., "🍅 24:59")
//! - Dropdown menu with show/hide, start/stop, reset, and quit
//! - Translation of menu clicks into `MenuAction`s
//!
//! # Architecture
//!
//! The module is split into platform-independent and platform-specific parts:
//!
//! - `icon.rs`: Title and tooltip text (platform-independent, fully testable)
//! - `menu.rs`: Menu labels and `TrayView` (platform-independent, fully testable)
//! - `event.rs`: Intents and update messages (platform-independent, fully testable)
//! - `runner.rs`: Main-thread loop (native event loop on macOS, blocking loop elsewhere)
//! - `mod.rs`: TrayIconManager and the channels that connect it to the app
//!
//! # Threads
//!
//! The tray lives on the main thread, the app on a worker thread:
//!
//! ```text
//!   worker thread                      main thread
//! ┌───────────────┐   TrayUpdate    ┌─────────────────┐
//! │  App          │ ──────────────▶ │ TrayIconManager │
//! │  (TrayLink)   │ ◀────────────── │ (runner loop)   │
//! └───────────────┘   MenuAction    └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use pomo::menubar;
//!
//! let (link, mut manager) = menubar::channel();
//! let app = app.with_tray(link);
//! // move `app` to a worker thread, then on the main thread:
//! menubar::run_until_exit(manager, initial_view, app_thread);
//! ```

pub mod event;
pub mod icon;
pub mod menu;
pub mod runner;

pub use event::{EventHandler, MenuAction, MenuItemId, TrayUpdate};
pub use icon::IconManager;
pub use menu::{MenuBuilder, MenuConfig, MenuItemConfig, TrayView};
pub use runner::{run_until_exit, EXIT_APP_PANICKED};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Creates a connected app-side link and tray manager.
pub fn channel() -> (TrayLink, TrayIconManager) {
    let (update_tx, update_rx) = crossbeam_channel::unbounded();
    let (action_tx, action_rx) = crossbeam_channel::unbounded();

    let link = TrayLink {
        updates: update_tx,
        actions: action_rx,
    };
    (link, TrayIconManager::new(update_rx, action_tx))
}

// ============================================================================
// TrayLink
// ============================================================================

/// App-side ends of the tray channels.
#[derive(Debug, Clone)]
pub struct TrayLink {
    /// Views and shutdown requests for the tray
    updates: Sender<TrayUpdate>,
    /// Actions clicked in the tray menu
    actions: Receiver<MenuAction>,
}

impl TrayLink {
    /// A link with no tray behind it. Updates are dropped and no actions arrive.
    pub fn detached() -> Self {
        channel().0
    }

    /// Sends an update to the tray. A tray that is gone is not an error.
    pub fn send(&self, update: TrayUpdate) {
        if self.updates.send(update).is_err() {
            tracing::trace!("tray is not listening");
        }
    }

    /// Returns the next action clicked in the tray, if any.
    pub fn next_action(&self) -> Option<MenuAction> {
        self.actions.try_recv().ok()
    }
}

// ============================================================================
// NativeTray
// ============================================================================

/// Native tray handles kept alive while the icon is shown.
#[cfg(target_os = "macos")]
struct NativeTray {
    tray_icon: tray_icon::TrayIcon,
    toggle_window: tray_icon::menu::MenuItem,
    toggle_timer: tray_icon::menu::MenuItem,
}

// ============================================================================
// TrayIconManager
// ============================================================================

/// Manages the tray icon and its menu.
///
/// The manager never owns timer state. It only displays the last `TrayView`
/// it was sent and forwards clicks to the app as `MenuAction`s.
///
/// On platforms without a menu bar it runs in no-op mode: updates are still
/// consumed so the channel never backs up, and nothing is ever clicked.
pub struct TrayIconManager {
    /// Event handler for menu clicks
    event_handler: EventHandler,
    /// Channel for receiving updates from the app
    update_rx: Receiver<TrayUpdate>,
    /// Channel for sending clicked actions to the app
    action_tx: Sender<MenuAction>,
    /// Last view applied
    current_view: Option<TrayView>,
    /// The app asked for shutdown or went away
    closed: bool,
    /// Native tray instance (macOS only)
    #[cfg(target_os = "macos")]
    native: Option<NativeTray>,
}

impl TrayIconManager {
    /// Creates a new TrayIconManager.
    ///
    /// The native icon is not created until `initialize()` is called.
    pub fn new(update_rx: Receiver<TrayUpdate>, action_tx: Sender<MenuAction>) -> Self {
        Self {
            event_handler: EventHandler::new(),
            update_rx,
            action_tx,
            current_view: None,
            closed: false,
            #[cfg(target_os = "macos")]
            native: None,
        }
    }

    /// Returns whether the app has shut the tray down.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the last view applied, if any.
    pub fn current_view(&self) -> Option<&TrayView> {
        self.current_view.as_ref()
    }

    /// Processes a pending update from the channel.
    ///
    /// Returns `true` if an update was processed, `false` if the channel was empty.
    pub fn process_pending_update(&mut self) -> bool {
        match self.update_rx.try_recv() {
            Ok(update) => {
                self.handle_update(update);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.on_disconnected();
                false
            }
        }
    }

    /// Drains every pending update. Returns how many were applied.
    pub fn process_pending_updates(&mut self) -> usize {
        let mut count = 0;
        while self.process_pending_update() {
            count += 1;
        }
        count
    }

    /// Blocks applying updates until the app shuts the tray down.
    pub fn wait_for_shutdown(&mut self) {
        while !self.closed {
            match self.update_rx.recv() {
                Ok(update) => self.handle_update(update),
                Err(_) => self.on_disconnected(),
            }
        }
    }

    /// Forwards a clicked menu item to the app.
    ///
    /// Returns `true` if an action was sent.
    pub fn forward_click(&self, item: MenuItemId) -> bool {
        match self.event_handler.handle_click(item) {
            Some(action) => self.action_tx.send(action).is_ok(),
            None => false,
        }
    }

    fn on_disconnected(&mut self) {
        if !self.closed {
            tracing::debug!("tray update channel disconnected");
            self.shutdown();
        }
    }

    fn handle_update(&mut self, update: TrayUpdate) {
        match update {
            TrayUpdate::Refresh(view) => {
                if self.current_view.as_ref() == Some(&view) {
                    return;
                }
                tracing::trace!(title = %view.title, "tray refresh");
                self.apply_view(&view);
                self.current_view = Some(view);
            }
            TrayUpdate::Shutdown => {
                tracing::info!("shutting down tray");
                self.shutdown();
            }
        }
    }

    /// Removes the tray icon and stops listening for updates.
    pub fn shutdown(&mut self) {
        self.closed = true;
        #[cfg(target_os = "macos")]
        {
            self.native = None;
        }
    }

    /// Creates the tray icon (macOS only).
    ///
    /// # Errors
    ///
    /// Returns an error if the menu or tray icon cannot be created.
    #[cfg(target_os = "macos")]
    pub fn initialize(&mut self, view: &TrayView) -> anyhow::Result<()> {
        use anyhow::Context;
        use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem};
        use tray_icon::TrayIconBuilder;

        let config = &view.menu;
        let menu = Menu::new();

        let toggle_window = MenuItem::with_id(
            MenuItemId::ToggleWindow.as_id(),
            &config.toggle_window.text,
            config.toggle_window.enabled,
            None,
        );
        menu.append(&toggle_window)?;

        let toggle_timer = MenuItem::with_id(
            MenuItemId::ToggleTimer.as_id(),
            &config.toggle_timer.text,
            config.toggle_timer.enabled,
            None,
        );
        menu.append(&toggle_timer)?;

        let reset = MenuItem::with_id(
            MenuItemId::Reset.as_id(),
            &config.reset.text,
            config.reset.enabled,
            None,
        );
        menu.append(&reset)?;

        menu.append(&PredefinedMenuItem::separator())?;

        let quit = MenuItem::with_id(
            MenuItemId::Quit.as_id(),
            &config.quit.text,
            config.quit.enabled,
            None,
        );
        menu.append(&quit)?;

        let tray_icon = TrayIconBuilder::new()
            .with_title(&view.title)
            .with_tooltip(&view.tooltip)
            .with_menu(Box::new(menu))
            .build()
            .context("failed to create tray icon")?;

        self.native = Some(NativeTray {
            tray_icon,
            toggle_window,
            toggle_timer,
        });
        self.current_view = Some(view.clone());

        tracing::info!("tray icon initialized");
        Ok(())
    }

    /// Creates the tray icon (non-macOS, no-op).
    #[cfg(not(target_os = "macos"))]
    pub fn initialize(&mut self, view: &TrayView) -> anyhow::Result<()> {
        tracing::debug!("menu bar is only available on macOS");
        self.current_view = Some(view.clone());
        Ok(())
    }

    #[cfg(target_os = "macos")]
    fn apply_view(&self, view: &TrayView) {
        let Some(native) = self.native.as_ref() else {
            return;
        };
        native.tray_icon.set_title(Some(&view.title));
        if let Err(e) = native.tray_icon.set_tooltip(Some(&view.tooltip)) {
            tracing::warn!(error = %e, "failed to update tray tooltip");
        }
        native.toggle_window.set_text(&view.menu.toggle_window.text);
        native.toggle_timer.set_text(&view.menu.toggle_timer.text);
    }

    #[cfg(not(target_os = "macos"))]
    fn apply_view(&self, _view: &TrayView) {}
}

impl std::fmt::Debug for TrayIconManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrayIconManager")
            .field("closed", &self.closed)
            .field("current_view", &self.current_view)
            .field("event_handler", &self.event_handler)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
