//! pomo - a Pomodoro timer for the terminal
//!
//! Alternates work periods and breaks:
//! - 25 minutes of focused work by default
//! - 5 minutes of break by default
//! - A sound and a banner at every boundary

use std::io::{self, IsTerminal};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use pomo::app::{App, AppOptions, InstanceError, InstanceGuard};
use pomo::cli::{Cli, Commands, Display, RunArgs};
use pomo::menubar::{self, TrayIconManager, TrayView};
use pomo::sound::{resolve_notification_sound, try_create_player};
use pomo::types::{DurationConfig, TimerState};

/// Exit code when another instance holds the lock.
const EXIT_ALREADY_RUNNING: i32 = 1;

/// Exit code for every other failure.
const EXIT_FAILURE: i32 = 2;

/// A started timer: the app on its worker thread and the tray for the main thread.
struct Session {
    app: JoinHandle<i32>,
    tray: TrayIconManager,
    view: TrayView,
}

/// Main entry point
fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let code = match cli.into_command() {
        Commands::Run(args) => match start(args) {
            Ok(session) => menubar::run_until_exit(session.tray, session.view, session.app),
            Err(e) => report(&e),
        },
        Commands::Completions { shell } => {
            generate_completions(shell);
            0
        }
    };

    std::process::exit(code);
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr; stdout belongs to the console UI.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

/// Acquires the instance lock and starts the app on a worker thread.
///
/// The main thread is left for the tray.
fn start(args: RunArgs) -> Result<Session> {
    let mut guard = InstanceGuard::localhost(args.lock_port);
    guard.acquire()?;
    tracing::info!(addr = ?guard.local_addr(), "instance lock acquired");

    let config = DurationConfig::new(args.work, args.break_time)?;
    let search_dir = std::env::current_dir().context("failed to read the working directory")?;
    let sound = resolve_notification_sound(args.sound.as_deref(), &search_dir);

    let options = AppOptions {
        config,
        json: args.json,
        start_hidden: args.hidden,
        live_status: io::stdout().is_terminal(),
        sound,
    };
    let view = TrayView::render(&TimerState::new(config), !args.hidden);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let (link, tray) = menubar::channel();
    let play_sound = !args.no_sound;

    let app = thread::Builder::new()
        .name("pomo-app".to_string())
        .spawn(move || {
            let mut app = App::new(options, io::stdout()).with_tray(link);
            if play_sound {
                if let Some(player) = try_create_player() {
                    app = app.with_sound_player(Box::new(player));
                }
            }

            let result = runtime.block_on(app.run());
            // A stdin read may still be pending; do not wait for it.
            runtime.shutdown_background();
            guard.release();

            match result {
                Ok(()) => 0,
                Err(e) => report(&e),
            }
        })
        .context("failed to start the app thread")?;

    Ok(Session { app, tray, view })
}

/// Prints an error and returns its exit code.
fn report(error: &anyhow::Error) -> i32 {
    Display::show_error(&format!("{:#}", error));
    exit_code(error)
}

/// Maps an error to the process exit code.
fn exit_code(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<InstanceError>().is_some() {
        EXIT_ALREADY_RUNNING
    } else {
        EXIT_FAILURE
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
