//! Main-thread side of the tray.
//!
//! The app runs on a worker thread and talks to the tray over channels.
//! On macOS the status item only redraws, and menu clicks are only
//! delivered, while the main thread runs the native event loop. Elsewhere
//! the main thread just applies updates until the app shuts the tray down.
//!
//! Either way the process exits with the code the app thread returned.

use std::thread::JoinHandle;

use super::{TrayIconManager, TrayView};

/// Exit code when the app thread panicked.
pub const EXIT_APP_PANICKED: i32 = 101;

/// How often the native loop checks for updates from the app.
#[cfg(target_os = "macos")]
const UPDATE_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

/// Runs the tray on the calling thread until the app finishes, then exits
/// the process with the app's exit code.
///
/// Must be called from the main thread.
#[cfg(target_os = "macos")]
pub fn run_until_exit(mut manager: TrayIconManager, view: TrayView, app: JoinHandle<i32>) -> ! {
    use std::time::Instant;

    use tao::event::{Event, StartCause};
    use tao::event_loop::{ControlFlow, EventLoopBuilder};
    use tao::platform::macos::{ActivationPolicy, EventLoopExtMacOS};
    use tray_icon::menu::MenuEvent;

    use super::MenuItemId;

    let mut event_loop = EventLoopBuilder::<MenuEvent>::with_user_event().build();
    // Menu bar only: no Dock icon, no app switcher entry
    event_loop.set_activation_policy(ActivationPolicy::Accessory);

    let proxy = event_loop.create_proxy();
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        if proxy.send_event(event).is_err() {
            tracing::debug!("tray event loop closed");
        }
    }));

    let mut app = Some(app);
    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(Instant::now() + UPDATE_POLL_INTERVAL);

        match event {
            Event::NewEvents(StartCause::Init) => {
                if let Err(e) = manager.initialize(&view) {
                    tracing::warn!(error = %e, "tray icon unavailable, continuing without it");
                }
            }
            Event::UserEvent(menu_event) => {
                manager.forward_click(MenuItemId::from_id(&menu_event.id.0));
            }
            _ => {}
        }

        manager.process_pending_updates();
        if manager.is_closed() {
            if let Some(app) = app.take() {
                std::process::exit(join_app(app));
            }
        }
    })
}

/// Applies tray updates on the calling thread until the app finishes, then
/// exits the process with the app's exit code.
#[cfg(not(target_os = "macos"))]
pub fn run_until_exit(mut manager: TrayIconManager, view: TrayView, app: JoinHandle<i32>) -> ! {
    if let Err(e) = manager.initialize(&view) {
        tracing::warn!(error = %e, "tray icon unavailable, continuing without it");
    }
    manager.wait_for_shutdown();
    std::process::exit(join_app(app))
}

/// Waits for the app thread and returns its exit code.
fn join_app(app: JoinHandle<i32>) -> i32 {
    match app.join() {
        Ok(code) => code,
        Err(_) => {
            tracing::error!("app thread panicked");
            EXIT_APP_PANICKED
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
