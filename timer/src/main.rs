//! tasktimer - countdown timer with per-task daily summaries.
//!
//! # Commands
//!
//! - `tasktimer [TASK] [MINUTES]`: run a countdown (arguments in either order)
//! - `tasktimer summary [DATE]`: print per-task totals for a day
//!
//! # Environment Variables
//!
//! See the [`config`](tasktimer::config) module for available configuration options.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use tasktimer::args::{resolve_start, StartRequest};
use tasktimer::config::Config;
use tasktimer::engine::{Phase, TimerEngine};
use tasktimer::error::{TimerError, TuiError};
use tasktimer::notify::{notification_body, DesktopNotifier, Notifier};
use tasktimer::store::SessionStore;
use tasktimer::summary::{parse_date, render_report, summarize_store};
use tasktimer::tui::{
    install_panic_hook, pick_task, run_countdown, ui, wait_for_shutdown, CountdownOutcome,
    EventHandler, PickerState, Tui, TICK_INTERVAL,
};

/// Capacity of the terminal input channel.
const INPUT_BUFFER: usize = 32;

/// tasktimer - countdown timer with per-task daily summaries.
///
/// Runs a countdown for a task and records the time spent. Pause and resume
/// with 'p'; stop early with Ctrl+C or 'q' to record a partial session.
#[derive(Parser, Debug)]
#[command(name = "tasktimer")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    TASKTIMER_DATA_FILE        Session file (default: ~/.work_sessions.json)
    TASKTIMER_DEFAULT_MINUTES  Countdown length when none is given (default: 25)
    TASKTIMER_SOUND            Play a sound on completion (default: true)
    TASKTIMER_NOTIFICATIONS    Show a desktop notification on completion (default: true)

EXAMPLES:
    # Pick a task from recent ones, 25 minutes
    tasktimer

    # 50 minutes on a named task, arguments in either order
    tasktimer \"write report\" 50
    tasktimer 50 \"write report\"

    # Totals for today, or for another day
    tasktimer summary
    tasktimer summary 2024-03-05
    tasktimer summary Mar 5
")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Task name and duration in minutes, in either order.
    #[arg(value_name = "TASK|MINUTES", allow_hyphen_values = true)]
    args: Vec<String>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Print per-task totals for one day.
    ///
    /// Accepts YYYY-MM-DD, YYYY/MM/DD, MM-DD, MM/DD, "Mon D" or "Month D".
    /// Without a year the current year is used; without a date, today.
    Summary {
        /// Day to summarize (default: today).
        #[arg(value_name = "DATE")]
        date: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => return report_error(&TimerError::from(e)),
    };

    match cli.command {
        Some(Command::Summary { date }) => match run_summary(&config, &date) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => report_error(&e),
        },
        None => match run_start(&config, &cli.args) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Prints `err` and returns the failure exit code.
fn report_error(err: &TimerError) -> ExitCode {
    eprintln!("Error: {err}");
    ExitCode::FAILURE
}

/// Prints the report for the requested day.
fn run_summary(config: &Config, date_args: &[String]) -> tasktimer::Result<()> {
    let today = Local::now().date_naive();
    let day = if date_args.is_empty() {
        today
    } else {
        parse_date(&date_args.join(" "), today)?
    };

    let summary = summarize_store(&SessionStore::new(&config.data_file), day)?;
    print!("{}", render_report(&summary));
    Ok(())
}

/// Runs a countdown and reports how it ended.
fn run_start(config: &Config, args: &[String]) -> Result<ExitCode> {
    let request = match resolve_start(args, config.default_minutes) {
        Ok(request) => request,
        Err(e) => return Ok(report_error(&TimerError::from(e))),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    match runtime.block_on(run_timer(config, request)) {
        Ok(outcome) => {
            report_outcome(outcome);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_error(&e)),
    }
}

/// Owns the terminal for the picker and the countdown, restoring it after.
async fn run_timer(config: &Config, request: StartRequest) -> tasktimer::Result<CountdownOutcome> {
    install_panic_hook();
    let mut tui = Tui::new().map_err(TuiError::TerminalInit)?;

    let (input_tx, mut input_rx) = mpsc::channel(INPUT_BUFFER);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let input_task = tokio::spawn(EventHandler::new(input_tx, shutdown_rx).run());

    let result = drive(&mut tui, config, request, &mut input_rx).await;

    let _ = shutdown_tx.send(());
    let _ = input_task.await;
    if let Err(e) = tui.restore() {
        warn!(error = %e, "Failed to restore terminal");
    }

    result
}

async fn drive(
    tui: &mut Tui,
    config: &Config,
    request: StartRequest,
    input_rx: &mut mpsc::Receiver<tasktimer::tui::InputEvent>,
) -> tasktimer::Result<CountdownOutcome> {
    let store = SessionStore::new(&config.data_file);
    let target = request.target();

    let task = match request.task {
        Some(task) => task,
        None => {
            let recent = store.recent_tasks().unwrap_or_else(|e| {
                warn!(error = %e, "Could not read recent tasks");
                Vec::new()
            });
            let mut picker = PickerState::new(recent);
            pick_task(&mut picker, input_rx, wait_for_shutdown(), |picker| {
                tui.draw(|frame| ui::render_picker(frame, picker))
            })
            .await?
        }
    };

    let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier::new(
        config.desktop_notifications,
        config.sound,
    ));
    let mut engine = TimerEngine::start(
        task,
        target,
        store,
        Some(notifier),
        Local::now().fixed_offset(),
    );

    let outcome = run_countdown(
        &mut engine,
        input_rx,
        wait_for_shutdown(),
        TICK_INTERVAL,
        |state| tui.draw(|frame| ui::render_countdown(frame, state, Local::now().fixed_offset())),
    )
    .await?;

    Ok(outcome)
}

/// Prints the result of a countdown once the terminal is restored.
fn report_outcome(outcome: CountdownOutcome) {
    match outcome.saved {
        Some(Ok(session)) => match outcome.state.phase() {
            Phase::Cancelled { .. } => println!(
                "\nSaved partial session: {} ({:.2} seconds)",
                session.task,
                session.duration.as_secs_f64()
            ),
            _ => println!("{}", notification_body(&session.task)),
        },
        Some(Err(e)) => eprintln!("Error saving session: {e}"),
        None => {}
    }
}

/// Initializes the logging subsystem.
///
/// Logs go to stderr so stdout only carries reports.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}
