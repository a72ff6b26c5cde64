//! Integration tests for the timer state machine, engine, and instance guard.
//!
//! These tests exercise the public API the way the binary uses it:
//! - Countdown, boundary crossings, and mode alternation
//! - Reset and settings behavior
//! - Progress and time formatting
//! - Engine events as seen by the presentation layer
//! - The app and tray on separate threads
//! - Single-instance locking

use std::sync::Arc;

use tokio::sync::mpsc;

use pomo::app::{App, AppOptions, Flow, InstanceError, InstanceGuard, TimerEngine, TimerEvent};
use pomo::menubar::{self, MenuAction, MenuItemId};
use pomo::sound::{MockSoundPlayer, SoundSource};
use pomo::types::{
    format_mmss, progress_ratio, DurationConfig, DurationField, SettingsError, TickOutcome,
    TimerMode, TimerState,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a state with 1-minute work and 2-minute break periods.
fn create_fast_state() -> TimerState {
    TimerState::new(DurationConfig::new(1, 2).unwrap())
}

/// Creates an engine with its event receiver.
fn create_engine(
    config: DurationConfig,
) -> (TimerEngine, mpsc::UnboundedReceiver<TimerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TimerEngine::new(config, tx), rx)
}

/// Collects every pending event.
fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Ticks until the current period ends.
fn run_period(state: &mut TimerState) -> TickOutcome {
    loop {
        let outcome = state.tick();
        if matches!(outcome, TickOutcome::PeriodCompleted { .. }) {
            return outcome;
        }
        assert!(
            matches!(outcome, TickOutcome::Counting { .. }),
            "timer stopped before the period ended"
        );
    }
}

// ============================================================================
// Countdown
// ============================================================================

#[test]
fn test_tick_decrements_by_one_without_changing_mode() {
    let mut state = create_fast_state();
    state.toggle();

    for expected in (1..60).rev() {
        let outcome = state.tick();
        assert_eq!(
            outcome,
            TickOutcome::Counting {
                remaining_seconds: expected
            }
        );
        assert_eq!(state.remaining_seconds(), expected);
        assert_eq!(state.mode(), TimerMode::Work);
        assert!(state.is_running());
    }
}

#[test]
fn test_boundary_flips_mode_once_and_stops() {
    let mut state = create_fast_state();
    state.toggle();

    let outcome = run_period(&mut state);

    assert_eq!(
        outcome,
        TickOutcome::PeriodCompleted {
            finished: TimerMode::Work,
            next: TimerMode::Break
        }
    );
    assert_eq!(state.mode(), TimerMode::Break);
    assert_eq!(state.remaining_seconds(), 120);
    assert!(!state.is_running());

    // Stopped: further ticks change nothing
    assert_eq!(state.tick(), TickOutcome::Idle);
    assert_eq!(state.remaining_seconds(), 120);
}

#[test]
fn test_modes_alternate_forever() {
    let mut state = create_fast_state();
    let mut expected = TimerMode::Work;

    for _ in 0..6 {
        assert_eq!(state.mode(), expected);
        state.toggle();
        run_period(&mut state);
        expected = expected.flipped();
        assert_eq!(state.mode(), expected);
        assert_eq!(state.remaining_seconds(), state.total_seconds());
    }
}

#[test]
fn test_pause_keeps_remaining() {
    let mut state = create_fast_state();
    state.toggle();
    state.tick();
    state.tick();

    assert!(!state.toggle());
    assert_eq!(state.remaining_seconds(), 58);
    assert_eq!(state.tick(), TickOutcome::Idle);

    assert!(state.toggle());
    state.tick();
    assert_eq!(state.remaining_seconds(), 57);
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn test_reset_keeps_mode_and_rewinds() {
    let mut state = create_fast_state();
    state.toggle();
    run_period(&mut state);
    state.toggle();
    state.tick();

    state.reset();
    assert_eq!(state.mode(), TimerMode::Break);
    assert_eq!(state.remaining_seconds(), 120);
    assert!(!state.is_running());

    let snapshot = state.clone();
    state.reset();
    assert_eq!(state, snapshot);
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn test_apply_settings_rejects_out_of_range() {
    let mut state = create_fast_state();
    state.toggle();
    state.tick();
    let before = state.clone();

    assert_eq!(
        state.apply_settings(0, 5),
        Err(SettingsError::InvalidDuration {
            field: DurationField::Work,
            value: 0
        })
    );
    assert_eq!(
        state.apply_settings(5, 61),
        Err(SettingsError::InvalidDuration {
            field: DurationField::Break,
            value: 61
        })
    );
    assert_eq!(state, before);
}

#[test]
fn test_apply_settings_resets_to_work() {
    let mut state = create_fast_state();
    state.toggle();
    run_period(&mut state);
    assert_eq!(state.mode(), TimerMode::Break);

    state.apply_settings(25, 5).unwrap();

    assert_eq!(state.mode(), TimerMode::Work);
    assert!(!state.is_running());
    assert_eq!(state.remaining_seconds(), 1500);
    assert_eq!(state.config().break_minutes(), 5);
}

#[test]
fn test_apply_settings_boundaries() {
    let mut state = create_fast_state();
    assert!(state.apply_settings(1, 60).is_ok());
    assert!(state.apply_settings(60, 1).is_ok());
    assert_eq!(state.remaining_seconds(), 3600);
}

// ============================================================================
// Progress and formatting
// ============================================================================

#[test]
fn test_progress_over_a_period() {
    let mut state = create_fast_state();
    assert_eq!(state.progress_ratio(), 0.0);

    state.toggle();
    let mut last = state.progress_ratio();
    for _ in 0..59 {
        state.tick();
        let progress = state.progress_ratio();
        assert!(progress > last);
        assert!(progress < 1.0);
        last = progress;
    }

    assert_eq!(progress_ratio(60, 0), 1.0);
    assert_eq!(progress_ratio(60, -3), 1.0);
    assert_eq!(progress_ratio(60, 60), 0.0);
}

#[test]
fn test_format_mmss() {
    assert_eq!(format_mmss(0), "00:00");
    assert_eq!(format_mmss(59), "00:59");
    assert_eq!(format_mmss(60), "01:00");
    assert_eq!(format_mmss(125), "02:05");
    assert_eq!(format_mmss(3600), "60:00");
    assert_eq!(format_mmss(-5), "00:00");
}

// ============================================================================
// Engine events
// ============================================================================

#[test]
fn test_engine_reports_full_period() {
    let (mut engine, mut rx) = create_engine(DurationConfig::new(1, 1).unwrap());

    engine.toggle();
    for _ in 0..60 {
        engine.tick();
    }
    let events = drain(&mut rx);

    assert_eq!(
        events.first(),
        Some(&TimerEvent::Started {
            mode: TimerMode::Work,
            remaining_seconds: 60
        })
    );
    assert_eq!(
        events.last(),
        Some(&TimerEvent::PeriodCompleted {
            finished: TimerMode::Work,
            next: TimerMode::Break,
            next_seconds: 60
        })
    );
    let ticks = events
        .iter()
        .filter(|e| matches!(e, TimerEvent::Tick { .. }))
        .count();
    assert_eq!(ticks, 60);
}

#[test]
fn test_engine_rejected_settings_emit_nothing() {
    let (mut engine, mut rx) = create_engine(DurationConfig::default());

    assert!(engine.apply_settings(61, 5).is_err());
    assert!(drain(&mut rx).is_empty());
    assert_eq!(engine.state().remaining_seconds(), 1500);
}

#[test]
fn test_engine_survives_dropped_receiver() {
    let (mut engine, rx) = create_engine(DurationConfig::default());
    drop(rx);

    assert!(engine.toggle());
    engine.tick();
    engine.reset();
    assert_eq!(engine.state().remaining_seconds(), 1500);
}

// ============================================================================
// App
// ============================================================================

#[test]
fn test_app_full_cycle_with_sound() {
    let mock = Arc::new(MockSoundPlayer::new());
    let options = AppOptions {
        config: DurationConfig::new(1, 1).unwrap(),
        sound: SoundSource::file("/tmp/chime.wav"),
        ..AppOptions::default()
    };
    let mut app = App::new(options, Vec::new()).with_sound_player(Box::new(Arc::clone(&mock)));

    for expected in [TimerMode::Break, TimerMode::Work] {
        app.dispatch(MenuAction::ToggleTimer).unwrap();
        for _ in 0..60 {
            app.on_tick().unwrap();
        }
        assert_eq!(app.state().mode(), expected);
    }

    assert_eq!(mock.play_count(), 2);
    assert!(mock.get_play_calls().iter().all(|s| s.is_file()));

    let out = String::from_utf8_lossy(app.writer()).into_owned();
    assert!(out.contains("Break!"));
    assert!(out.contains("Work!"));
}

#[test]
fn test_app_sound_failure_is_not_fatal() {
    let mock = Arc::new(MockSoundPlayer::new());
    mock.set_should_fail(true);
    let options = AppOptions {
        config: DurationConfig::new(1, 1).unwrap(),
        ..AppOptions::default()
    };
    let mut app = App::new(options, Vec::new()).with_sound_player(Box::new(Arc::clone(&mock)));

    app.dispatch(MenuAction::ToggleTimer).unwrap();
    for _ in 0..60 {
        assert!(app.on_tick().is_ok());
    }
    assert_eq!(app.state().mode(), TimerMode::Break);
}

#[test]
fn test_app_console_session() {
    let mut app = App::new(AppOptions::default(), Vec::new());

    for line in ["settings", "30", "10"] {
        assert_eq!(app.handle_line(line).unwrap(), Flow::Continue);
    }
    assert_eq!(app.state().remaining_seconds(), 1800);

    app.handle_line("t").unwrap();
    assert!(app.state().is_running());
    app.handle_line("w").unwrap();
    assert!(!app.is_window_visible());

    assert_eq!(app.handle_line("exit").unwrap(), Flow::Quit);
}

#[test]
fn test_app_thread_drives_tray_until_shutdown() {
    let (link, mut tray) = menubar::channel();

    let app = std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let app = App::new(AppOptions::default(), Vec::new()).with_tray(link);
        runtime.block_on(app.run_with_input(&b"t\nw\nq\n"[..]))
    });

    tray.wait_for_shutdown();
    assert!(app.join().unwrap().is_ok());

    let view = tray.current_view().unwrap();
    assert_eq!(view.menu.toggle_timer.text, "Start");
    assert_eq!(view.menu.toggle_window.text, "Show Window");
}

#[test]
fn test_tray_click_reaches_app() {
    let (link, tray) = menubar::channel();
    let mut app = App::new(AppOptions::default(), Vec::new()).with_tray(link);

    assert!(tray.forward_click(MenuItemId::ToggleTimer));
    app.poll_tray().unwrap();
    assert!(app.state().is_running());

    assert!(tray.forward_click(MenuItemId::Reset));
    assert!(tray.forward_click(MenuItemId::Quit));
    assert_eq!(app.poll_tray().unwrap(), Flow::Quit);
    assert!(!app.state().is_running());
}

// ============================================================================
// Instance guard
// ============================================================================

#[test]
fn test_guard_excludes_second_instance() {
    let mut first = InstanceGuard::localhost(0);
    first.acquire().unwrap();
    let addr = first.local_addr().unwrap();

    let mut second = InstanceGuard::new(addr);
    match second.acquire() {
        Err(InstanceError::AlreadyRunning { addr: held, .. }) => assert_eq!(held, addr),
        other => panic!("Expected AlreadyRunning, got {:?}", other),
    }
    assert!(!second.is_held());

    first.release();
    let mut third = InstanceGuard::new(addr);
    assert!(third.acquire().is_ok());
}

#[test]
fn test_guard_drop_releases() {
    let addr = {
        let mut guard = InstanceGuard::localhost(0);
        guard.acquire().unwrap();
        guard.local_addr().unwrap()
    };

    let mut again = InstanceGuard::new(addr);
    assert!(again.acquire().is_ok());
}
