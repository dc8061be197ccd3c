//! Interactive loops for the task picker and the countdown.
//!
//! Both loops multiplex with `tokio::select!` over a shutdown signal, the
//! terminal input channel fed by [`EventHandler`](super::events::EventHandler)
//! and, for the countdown, a tick deadline that is armed only while the
//! timer is running. Rendering is passed in as a closure so the loops can be
//! driven without a terminal.

use std::future::Future;
use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::engine::{TimerEngine, TimerEvent, TimerState};
use crate::error::{Result, TimerError, TuiError};
use crate::store::{SessionSink, StoreError};
use crate::tui::events::InputEvent;
use crate::tui::picker::{PickerAction, PickerState};
use crate::types::Session;

/// One countdown time unit.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How a countdown ended.
#[derive(Debug)]
pub struct CountdownOutcome {
    /// Final, terminal state.
    pub state: TimerState,
    /// The recorded session, or why it could not be saved.
    pub saved: Option<std::result::Result<Session, StoreError>>,
}

/// Maps a key press to a timer event: `p` toggles pause, `q` and Ctrl+C cancel.
pub fn key_to_timer_event(key: KeyEvent) -> Option<TimerEvent> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TimerEvent::Cancel)
        }
        KeyCode::Char('p' | 'P') => Some(TimerEvent::TogglePause),
        KeyCode::Char('q') => Some(TimerEvent::Cancel),
        _ => None,
    }
}

/// Runs the countdown until the engine reaches a terminal state.
///
/// A resolved `shutdown` future or a closed input channel cancels the timer,
/// so the partial session is still recorded.
///
/// # Errors
///
/// Returns [`TuiError::Render`] if drawing fails while the timer is still
/// live. The timer is left in its current state in that case. Once the timer
/// is terminal a drawing failure is only logged, so the outcome is returned.
pub async fn run_countdown<S, F, R>(
    engine: &mut TimerEngine<S>,
    input_rx: &mut mpsc::Receiver<InputEvent>,
    shutdown: F,
    tick_interval: Duration,
    mut render: R,
) -> std::result::Result<CountdownOutcome, TuiError>
where
    S: SessionSink,
    F: Future<Output = ()>,
    R: FnMut(&TimerState) -> io::Result<()>,
{
    tokio::pin!(shutdown);
    let mut next_tick = Instant::now() + tick_interval;

    loop {
        render(engine.state()).map_err(TuiError::Render)?;

        let event = tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutdown signal received, cancelling timer");
                TimerEvent::Cancel
            }

            input = input_rx.recv() => match input {
                Some(InputEvent::Key(key)) => match key_to_timer_event(key) {
                    Some(event) => event,
                    None => continue,
                },
                Some(InputEvent::Resize(..)) => continue,
                None => {
                    debug!("Input channel closed, cancelling timer");
                    TimerEvent::Cancel
                }
            },

            _ = tokio::time::sleep_until(next_tick), if engine.state().is_running() => {
                TimerEvent::Tick
            }
        };

        match engine.handle(event, Local::now().fixed_offset()) {
            Ok(handled) => {
                if handled.schedule_tick {
                    next_tick = Instant::now() + tick_interval;
                }
                if engine.state().is_terminal() {
                    // The session is already saved; a failed last frame must not hide it.
                    if let Err(e) = render(engine.state()) {
                        warn!(error = %e, "Failed to draw final timer state");
                    }
                    return Ok(CountdownOutcome {
                        state: engine.state().clone(),
                        saved: handled.saved,
                    });
                }
            }
            Err(e) => debug!(error = %e, "Ignoring timer event"),
        }
    }
}

/// Shows the task picker until a task is chosen.
///
/// # Errors
///
/// - [`TimerError::CancelledSelection`] if the user aborts or `shutdown` resolves
/// - [`TuiError::InputClosed`] if terminal input stops
/// - [`TuiError::Render`] if drawing fails
pub async fn pick_task<F, R>(
    picker: &mut PickerState,
    input_rx: &mut mpsc::Receiver<InputEvent>,
    shutdown: F,
    mut render: R,
) -> Result<String>
where
    F: Future<Output = ()>,
    R: FnMut(&PickerState) -> io::Result<()>,
{
    tokio::pin!(shutdown);

    loop {
        render(picker).map_err(TuiError::Render)?;

        let key = tokio::select! {
            biased;

            _ = &mut shutdown => return Err(TimerError::CancelledSelection),

            input = input_rx.recv() => match input {
                Some(InputEvent::Key(key)) => key,
                Some(InputEvent::Resize(..)) => continue,
                None => return Err(TuiError::InputClosed.into()),
            },
        };

        match picker.handle_key(key) {
            PickerAction::None => {}
            PickerAction::Selected(task) => {
                debug!(%task, "Task selected");
                return Ok(task);
            }
            PickerAction::Cancelled => return Err(TimerError::CancelledSelection),
        }
    }
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// Resolves never if the handlers cannot be installed.
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
