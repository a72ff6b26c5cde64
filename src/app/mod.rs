//! Application controller for pomo.
//!
//! The app owns the timer engine and everything that presents it:
//! - Console output (status line, event messages, JSON lines)
//! - The settings form
//! - Updates for the tray icon
//! - The notification sound
//!
//! Every user gesture becomes a [`MenuAction`] and goes through
//! [`App::dispatch`]. After each operation the app drains the engine's
//! events and renders them.
//!
//! # Event loop
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌─────────┐
//! │  ticker  │   │ console lines │   │ Ctrl-C  │
//! └────┬─────┘   └───────┬───────┘   └────┬────┘
//!      └────────── select! ───────────────┘
//!                    │
//!                    ▼
//!             App::dispatch ──▶ TimerEngine ──▶ TimerEvent
//!                                                   │
//!                     console ◀── render ◀──────────┘
//!                     tray    ◀── TrayUpdate
//!                     sound   ◀── PeriodCompleted
//! ```
//!
//! Tray clicks arrive over the [`TrayLink`] and are picked up on every tick.

pub mod instance;
pub mod timer;

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use crate::cli::{parse_command, ConsoleCommand, Display, FormOutcome, SettingsForm};
use crate::menubar::{MenuAction, TrayLink, TrayUpdate, TrayView};
use crate::sound::{SoundPlayer, SoundSource};
use crate::types::{DurationConfig, StatusSnapshot, TickOutcome, TimerState};

pub use instance::{InstanceError, InstanceGuard, DEFAULT_LOCK_PORT};
pub use timer::{TimerEngine, TimerEvent, TICK_INTERVAL};

/// Clears the current terminal line before redrawing the live status.
const CLEAR_LINE: &str = "\r\x1b[2K";

// ============================================================================
// AppOptions
// ============================================================================

/// Startup options for the app.
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Initial durations
    pub config: DurationConfig,
    /// Print events as JSON lines
    pub json: bool,
    /// Start with the status window hidden
    pub start_hidden: bool,
    /// Redraw the status line every second (stdout is a terminal)
    pub live_status: bool,
    /// Sound played when a period ends
    pub sound: SoundSource,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            config: DurationConfig::default(),
            json: false,
            start_hidden: false,
            live_status: false,
            sound: SoundSource::default_beep(),
        }
    }
}

// ============================================================================
// Flow
// ============================================================================

/// Whether the event loop keeps going after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running
    Continue,
    /// Leave the event loop
    Quit,
}

// ============================================================================
// App
// ============================================================================

/// The running application.
///
/// Generic over the output sink so tests can capture what would be printed.
pub struct App<W: Write> {
    /// Timer engine (sole owner of the timer state)
    engine: TimerEngine,
    /// Events emitted by the engine
    event_rx: mpsc::UnboundedReceiver<TimerEvent>,
    /// Console output
    out: W,
    /// Print events as JSON lines
    json: bool,
    /// Redraw the status line every second
    live_status: bool,
    /// Whether the status window is shown
    window_visible: bool,
    /// Open settings form, if any
    form: Option<SettingsForm>,
    /// Sound played at period boundaries
    sound: SoundSource,
    /// Audio output; `None` when sound is off or unavailable
    player: Option<Box<dyn SoundPlayer>>,
    /// Channels to the tray on the main thread
    tray: TrayLink,
    /// A live status line is on screen without a trailing newline
    live_line_open: bool,
    /// The ticker should restart its one-second cadence
    restart_cadence: bool,
}

impl<W: Write> App<W> {
    /// Creates a new app writing to `out`.
    pub fn new(options: AppOptions, out: W) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            engine: TimerEngine::new(options.config, event_tx),
            event_rx,
            out,
            json: options.json,
            live_status: options.live_status,
            window_visible: !options.start_hidden,
            form: None,
            sound: options.sound,
            player: None,
            tray: TrayLink::detached(),
            live_line_open: false,
            restart_cadence: false,
        }
    }

    /// Plays `player` at every period boundary.
    pub fn with_sound_player(mut self, player: Box<dyn SoundPlayer>) -> Self {
        self.player = Some(player);
        self
    }

    /// Connects the app to a tray.
    pub fn with_tray(mut self, tray: TrayLink) -> Self {
        self.tray = tray;
        self
    }

    /// Returns the current timer state.
    pub fn state(&self) -> &TimerState {
        self.engine.state()
    }

    /// Returns whether the status window is shown.
    pub fn is_window_visible(&self) -> bool {
        self.window_visible
    }

    /// Returns whether the settings form is open.
    pub fn is_settings_open(&self) -> bool {
        self.form.is_some()
    }

    /// Returns the output sink.
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Returns the tray view for the current state.
    pub fn tray_view(&self) -> TrayView {
        TrayView::render(self.engine.state(), self.window_visible)
    }

    /// Sends the tray its first view and prints the initial status.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the console fails.
    pub fn start(&mut self) -> Result<()> {
        self.refresh_tray();

        if self.json {
            return self.print_status();
        }

        let config = self.engine.state().config();
        let greeting = format!(
            "pomo: {} min work / {} min break. Type 'help' for commands.",
            config.work_minutes(),
            config.break_minutes()
        );
        self.print_line(&greeting)?;
        if self.window_visible {
            self.print_status()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Performs a user intent.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the console fails.
    pub fn dispatch(&mut self, action: MenuAction) -> Result<Flow> {
        tracing::debug!(action = %action, "dispatch");

        match action {
            MenuAction::ToggleTimer => {
                if self.engine.toggle() {
                    self.restart_cadence = true;
                }
            }
            MenuAction::Reset => self.engine.reset(),
            MenuAction::OpenSettings => self.open_settings()?,
            MenuAction::ToggleWindowVisibility => {
                self.window_visible = !self.window_visible;
                if self.window_visible {
                    self.print_line("Window shown.")?;
                    self.print_status()?;
                } else {
                    self.print_line("Window hidden.")?;
                }
            }
            MenuAction::Quit => return Ok(Flow::Quit),
        }

        self.render()?;
        Ok(Flow::Continue)
    }

    /// Handles one line of console input.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the console fails.
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        if self.form.is_some() {
            self.handle_form_answer(line)?;
            return Ok(Flow::Continue);
        }

        match parse_command(line) {
            ConsoleCommand::Action(action) => return self.dispatch(action),
            ConsoleCommand::ApplySettings {
                work_minutes,
                break_minutes,
            } => {
                self.submit_settings(work_minutes, break_minutes)?;
            }
            ConsoleCommand::Status => self.print_status()?,
            ConsoleCommand::Help => self.print_line(&Display::help_text())?,
            ConsoleCommand::Empty => {}
            ConsoleCommand::Unknown(input) => {
                self.print_line(&Display::unknown_command(&input))?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Advances the timer by one second and renders the result.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the console fails.
    pub fn on_tick(&mut self) -> Result<()> {
        match self.engine.tick() {
            TickOutcome::Idle => Ok(()),
            TickOutcome::Counting { .. } => {
                self.drain_events()?;
                if self.live_status && self.window_visible && !self.json && self.form.is_none() {
                    self.draw_live_line()?;
                }
                Ok(())
            }
            TickOutcome::PeriodCompleted { .. } => self.render(),
        }
    }

    /// Dispatches any clicked tray items.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the console fails.
    pub fn poll_tray(&mut self) -> Result<Flow> {
        while let Some(action) = self.tray.next_action() {
            if self.dispatch(action)? == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Returns `true` once after the timer was started.
    pub fn take_cadence_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_cadence)
    }

    /// Stops the timer and removes the tray icon.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the console fails.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.engine.state().is_running() {
            self.engine.toggle();
        }
        self.drain_events()?;

        self.tray.send(TrayUpdate::Shutdown);

        self.close_live_line()?;
        self.out.flush().context("failed to flush console output")?;
        tracing::info!("shut down");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Event loop
    // ------------------------------------------------------------------------

    /// Runs until quit, end of input on stdin, or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if console I/O fails.
    pub async fn run(self) -> Result<()> {
        self.run_with_input(tokio::io::stdin()).await
    }

    /// Runs with console lines read from `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if console I/O fails.
    pub async fn run_with_input<R>(mut self, input: R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        self.start()?;
        let result = self.event_loop(input).await;
        let shutdown = self.shutdown();
        result.and(shutdown)
    }

    async fn event_loop<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(input).lines();
        let mut ticker = timer::ticker();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            let flow = tokio::select! {
                _ = ticker.tick() => {
                    self.on_tick()?;
                    self.poll_tray()?
                }
                line = lines.next_line() => {
                    match line.context("failed to read console input")? {
                        Some(line) => self.handle_line(&line)?,
                        None => {
                            tracing::debug!("console input closed");
                            Flow::Quit
                        }
                    }
                }
                signal = &mut ctrl_c => {
                    signal.context("failed to listen for Ctrl-C")?;
                    tracing::info!("interrupted");
                    Flow::Quit
                }
            };

            if flow == Flow::Quit {
                return Ok(());
            }
            if self.take_cadence_restart() {
                ticker.reset();
            }
        }
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    fn open_settings(&mut self) -> Result<()> {
        let form = SettingsForm::open(self.engine.state().config());
        let prompt = form.prompt();
        self.form = Some(form);
        self.print_line("Settings (empty keeps the current value, 'cancel' aborts)")?;
        self.print_prompt(&prompt)
    }

    fn handle_form_answer(&mut self, line: &str) -> Result<()> {
        let Some(form) = self.form.as_mut() else {
            return Ok(());
        };

        match form.answer(line) {
            FormOutcome::Prompt(prompt) => self.print_prompt(&prompt)?,
            FormOutcome::Rejected { reason, prompt } => {
                self.print_line(&format!("! {}", reason))?;
                self.print_prompt(&prompt)?;
            }
            FormOutcome::Cancelled => {
                self.form = None;
                self.print_line("Settings unchanged.")?;
            }
            FormOutcome::Submit {
                work_minutes,
                break_minutes,
            } => {
                if self.submit_settings(work_minutes, break_minutes)? {
                    self.form = None;
                } else if let Some(form) = self.form.as_mut() {
                    let prompt = form.restart();
                    self.print_prompt(&prompt)?;
                }
            }
        }
        Ok(())
    }

    /// Applies durations. Returns `false` (after telling the user) if rejected.
    fn submit_settings(&mut self, work_minutes: u32, break_minutes: u32) -> Result<bool> {
        match self.engine.apply_settings(work_minutes, break_minutes) {
            Ok(()) => {
                self.render()?;
                Ok(true)
            }
            Err(e) => {
                self.print_line(&format!("! {}", e))?;
                Ok(false)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Drains events, then shows the status line if anything was printed.
    fn render(&mut self) -> Result<()> {
        let printed = self.drain_events()?;
        if printed > 0 && self.window_visible && !self.json {
            self.print_status()?;
        }
        Ok(())
    }

    /// Prints pending engine events and refreshes the tray.
    /// Returns how many human-readable messages were printed.
    fn drain_events(&mut self) -> Result<usize> {
        let mut printed = 0;

        while let Ok(event) = self.event_rx.try_recv() {
            if matches!(event, TimerEvent::PeriodCompleted { .. }) {
                self.notify();
            }

            if self.json {
                // The period that hit zero is already replaced; the next
                // line carries the new period's status.
                let status = match event {
                    TimerEvent::Tick {
                        remaining_seconds: 0,
                    } => None,
                    _ => Some(StatusSnapshot::from_timer_state(self.engine.state())),
                };
                let line = Display::json_line(&event, status.as_ref())
                    .context("failed to serialize timer event")?;
                self.print_line(&line)?;
            } else if let Some(message) = Display::event_message(&event) {
                self.print_line(&message)?;
                printed += 1;
            }
        }

        self.refresh_tray();
        Ok(printed)
    }

    fn refresh_tray(&self) {
        self.tray.send(TrayUpdate::Refresh(self.tray_view()));
    }

    fn notify(&self) {
        let Some(player) = self.player.as_ref() else {
            return;
        };
        if let Err(e) = player.play(&self.sound) {
            tracing::warn!(error = %e, sound = self.sound.name(), "notification sound failed");
        }
    }

    fn print_status(&mut self) -> Result<()> {
        let line = if self.json {
            Display::json_status(&StatusSnapshot::from_timer_state(self.engine.state()))
                .context("failed to serialize status")?
        } else {
            Display::status_line(self.engine.state())
        };
        self.print_line(&line)
    }

    fn print_line(&mut self, line: &str) -> Result<()> {
        self.close_live_line()?;
        writeln!(self.out, "{}", line).context("failed to write console output")
    }

    fn print_prompt(&mut self, prompt: &str) -> Result<()> {
        self.close_live_line()?;
        write!(self.out, "{}", prompt).context("failed to write console output")?;
        self.out.flush().context("failed to flush console output")
    }

    fn draw_live_line(&mut self) -> Result<()> {
        let line = Display::status_line(self.engine.state());
        write!(self.out, "{}{}", CLEAR_LINE, line).context("failed to write console output")?;
        self.out.flush().context("failed to flush console output")?;
        self.live_line_open = true;
        Ok(())
    }

    fn close_live_line(&mut self) -> Result<()> {
        if self.live_line_open {
            self.live_line_open = false;
            writeln!(self.out).context("failed to write console output")?;
        }
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for App<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("state", self.engine.state())
            .field("json", &self.json)
            .field("window_visible", &self.window_visible)
            .field("settings_open", &self.form.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menubar;
    use crate::sound::MockSoundPlayer;
    use crate::types::TimerMode;
    use std::sync::Arc;

    fn create_app() -> App<Vec<u8>> {
        App::new(AppOptions::default(), Vec::new())
    }

    fn create_short_app(json: bool) -> App<Vec<u8>> {
        let options = AppOptions {
            config: DurationConfig::new(1, 1).unwrap(),
            json,
            ..AppOptions::default()
        };
        App::new(options, Vec::new())
    }

    fn output(app: &App<Vec<u8>>) -> String {
        String::from_utf8_lossy(app.writer()).into_owned()
    }

    mod dispatch_tests {
        use super::*;

        #[test]
        fn test_toggle_starts_and_requests_cadence_restart() {
            let mut app = create_app();

            assert_eq!(app.dispatch(MenuAction::ToggleTimer).unwrap(), Flow::Continue);
            assert!(app.state().is_running());
            assert!(app.take_cadence_restart());
            assert!(!app.take_cadence_restart());

            app.dispatch(MenuAction::ToggleTimer).unwrap();
            assert!(!app.state().is_running());
            assert!(!app.take_cadence_restart());
        }

        #[test]
        fn test_reset() {
            let mut app = create_app();
            app.dispatch(MenuAction::ToggleTimer).unwrap();
            app.on_tick().unwrap();
            app.dispatch(MenuAction::Reset).unwrap();

            assert!(!app.state().is_running());
            assert_eq!(app.state().remaining_seconds(), 1500);
            assert!(output(&app).contains("Work reset to 25:00"));
        }

        #[test]
        fn test_window_visibility() {
            let (link, mut tray) = menubar::channel();
            let mut app = create_app().with_tray(link);
            assert!(app.is_window_visible());

            app.dispatch(MenuAction::ToggleWindowVisibility).unwrap();
            assert!(!app.is_window_visible());
            tray.process_pending_updates();
            assert_eq!(
                tray.current_view().unwrap().menu.toggle_window.text,
                "Show Window"
            );

            app.dispatch(MenuAction::ToggleWindowVisibility).unwrap();
            assert!(app.is_window_visible());
        }

        #[test]
        fn test_showing_window_prints_status() {
            let mut app = create_app();
            app.dispatch(MenuAction::ToggleWindowVisibility).unwrap();
            assert!(!output(&app).contains("Work   25:00"));

            app.dispatch(MenuAction::ToggleWindowVisibility).unwrap();

            let out = output(&app);
            assert!(out.ends_with(
                "Window shown.\nWork   25:00  [--------------------]    0%  stopped\n"
            ));
        }

        #[test]
        fn test_quit() {
            let mut app = create_app();
            assert_eq!(app.dispatch(MenuAction::Quit).unwrap(), Flow::Quit);
        }
    }

    mod tray_tests {
        use super::*;
        use crate::menubar::MenuItemId;

        #[test]
        fn test_start_sends_initial_view() {
            let (link, mut tray) = menubar::channel();
            let mut app = create_app().with_tray(link);

            app.start().unwrap();
            tray.process_pending_updates();

            assert_eq!(tray.current_view(), Some(&app.tray_view()));
        }

        #[test]
        fn test_clicks_reach_the_timer() {
            let (link, tray) = menubar::channel();
            let mut app = create_app().with_tray(link);

            tray.forward_click(MenuItemId::ToggleTimer);
            assert_eq!(app.poll_tray().unwrap(), Flow::Continue);
            assert!(app.state().is_running());

            tray.forward_click(MenuItemId::Quit);
            assert_eq!(app.poll_tray().unwrap(), Flow::Quit);
        }

        #[test]
        fn test_shutdown_closes_tray() {
            let (link, mut tray) = menubar::channel();
            let mut app = create_app().with_tray(link);
            app.start().unwrap();

            app.shutdown().unwrap();
            tray.process_pending_updates();

            assert!(tray.is_closed());
        }
    }

    mod console_tests {
        use super::*;

        #[test]
        fn test_commands() {
            let mut app = create_app();

            app.handle_line("t").unwrap();
            assert!(app.state().is_running());

            app.handle_line("status").unwrap();
            assert!(output(&app).contains("running"));

            assert_eq!(app.handle_line("quit").unwrap(), Flow::Quit);
        }

        #[test]
        fn test_unknown_and_help() {
            let mut app = create_app();
            app.handle_line("jump").unwrap();
            app.handle_line("help").unwrap();

            let out = output(&app);
            assert!(out.contains("Unknown command 'jump'"));
            assert!(out.contains("Commands:"));
        }

        #[test]
        fn test_direct_settings() {
            let mut app = create_app();
            app.handle_line("settings 30 10").unwrap();
            assert_eq!(app.state().remaining_seconds(), 1800);

            app.handle_line("settings 0 10").unwrap();
            assert_eq!(app.state().remaining_seconds(), 1800);
            assert!(output(&app).contains("between 1 and 60"));
        }
    }

    mod settings_form_tests {
        use super::*;

        #[test]
        fn test_form_applies() {
            let mut app = create_app();
            app.handle_line("s").unwrap();
            assert!(app.is_settings_open());

            app.handle_line("40").unwrap();
            app.handle_line("").unwrap();

            assert!(!app.is_settings_open());
            assert_eq!(app.state().config().work_minutes(), 40);
            assert_eq!(app.state().config().break_minutes(), 5);
            assert_eq!(app.state().mode(), TimerMode::Work);
        }

        #[test]
        fn test_form_stays_open_on_invalid_duration() {
            let mut app = create_app();
            app.handle_line("s").unwrap();
            app.handle_line("0").unwrap();
            app.handle_line("5").unwrap();

            assert!(app.is_settings_open());
            assert_eq!(app.state().config().work_minutes(), 25);

            app.handle_line("cancel").unwrap();
            assert!(!app.is_settings_open());
            assert!(output(&app).contains("Settings unchanged."));
        }

        #[test]
        fn test_form_consumes_commands() {
            let mut app = create_app();
            app.handle_line("s").unwrap();

            assert_eq!(app.handle_line("q").unwrap(), Flow::Continue);
            assert!(app.is_settings_open());
            assert!(output(&app).contains("not a whole number"));
        }
    }

    mod tick_tests {
        use super::*;

        #[test]
        fn test_period_completed_plays_sound() {
            let mock = Arc::new(MockSoundPlayer::new());
            let mut app = create_short_app(false).with_sound_player(Box::new(Arc::clone(&mock)));

            app.dispatch(MenuAction::ToggleTimer).unwrap();
            for _ in 0..60 {
                app.on_tick().unwrap();
            }

            assert_eq!(mock.play_count(), 1);
            assert_eq!(app.state().mode(), TimerMode::Break);
            assert!(!app.state().is_running());
            assert!(output(&app).contains("Break!"));
        }

        #[test]
        fn test_idle_tick_prints_nothing() {
            let mut app = create_app();
            app.on_tick().unwrap();
            assert!(output(&app).is_empty());
        }

        #[test]
        fn test_json_output() {
            let mut app = create_short_app(true);
            app.dispatch(MenuAction::ToggleTimer).unwrap();
            app.on_tick().unwrap();

            let out = output(&app);
            let lines: Vec<serde_json::Value> = out
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect();

            assert_eq!(lines.len(), 2);
            assert_eq!(lines[0]["event"], "started");
            assert_eq!(lines[1]["event"], "tick");
            assert_eq!(lines[1]["remainingSeconds"], 59);
            assert_eq!(lines[1]["status"]["display"], "00:59");
        }

        #[test]
        fn test_json_boundary_tick_has_no_stale_status() {
            let mut app = create_short_app(true);
            app.dispatch(MenuAction::ToggleTimer).unwrap();
            for _ in 0..60 {
                app.on_tick().unwrap();
            }

            let out = output(&app);
            let lines: Vec<serde_json::Value> = out
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect();
            let n = lines.len();

            assert_eq!(lines[n - 2]["event"], "tick");
            assert_eq!(lines[n - 2]["remainingSeconds"], 0);
            assert!(lines[n - 2].get("status").is_none());

            assert_eq!(lines[n - 1]["event"], "period_completed");
            assert_eq!(lines[n - 1]["status"]["mode"], "break");
            assert_eq!(lines[n - 1]["status"]["remainingSeconds"], 60);

            for line in &lines[1..n - 2] {
                assert_eq!(line["status"]["mode"], "work");
                assert_eq!(line["status"]["remainingSeconds"], line["remainingSeconds"]);
            }
        }
    }

    #[tokio::test]
    async fn test_run_with_scripted_input() {
        let app = create_app();
        let result = app.run_with_input(&b"t\nr\nq\n"[..]).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_ends_at_eof() {
        let app = create_app();
        assert!(app.run_with_input(&b""[..]).await.is_ok());
    }
}
