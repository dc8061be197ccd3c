//! Terminal input forwarding.
//!
//! [`EventHandler`] runs on its own tokio task, polls crossterm on the
//! blocking pool and forwards key and resize events over an mpsc channel
//! until a shutdown signal arrives or the receiver is dropped.
//!
//! Countdown ticks are not produced here. The countdown loop arms its own
//! tick only while the timer is running.
//!
//! # Example
//!
//! ```ignore
//! use tokio::sync::{mpsc, oneshot};
//! use tasktimer::tui::events::EventHandler;
//!
//! let (input_tx, mut input_rx) = mpsc::channel(32);
//! let (shutdown_tx, shutdown_rx) = oneshot::channel();
//! tokio::spawn(EventHandler::new(input_tx, shutdown_rx).run());
//!
//! while let Some(event) = input_rx.recv().await {
//!     // handle event
//! }
//! let _ = shutdown_tx.send(());
//! ```

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use tokio::sync::{mpsc, oneshot};

/// Poll timeout for terminal input; bounds how long shutdown can be delayed.
const POLL_TIMEOUT_MS: u64 = 50;

/// Input events forwarded from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press.
    Key(KeyEvent),
    /// New terminal size (columns, rows).
    Resize(u16, u16),
}

/// Polls the terminal and forwards [`InputEvent`]s.
#[derive(Debug)]
pub struct EventHandler {
    event_tx: mpsc::Sender<InputEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    poll_timeout: Duration,
}

impl EventHandler {
    pub fn new(event_tx: mpsc::Sender<InputEvent>, shutdown_rx: oneshot::Receiver<()>) -> Self {
        Self {
            event_tx,
            shutdown_rx,
            poll_timeout: Duration::from_millis(POLL_TIMEOUT_MS),
        }
    }

    /// Runs until shutdown is signalled or the receiver is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocking poll task panics.
    pub async fn run(mut self) -> std::io::Result<()> {
        loop {
            let timeout = self.poll_timeout;

            tokio::select! {
                biased;

                _ = &mut self.shutdown_rx => {
                    tracing::debug!("EventHandler received shutdown signal");
                    break;
                }

                result = tokio::task::spawn_blocking(move || Self::poll_terminal_event(timeout)) => {
                    match result {
                        Ok(Some(event)) => {
                            if self.event_tx.send(event).await.is_err() {
                                tracing::debug!("Input receiver dropped, exiting event loop");
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(join_error) => {
                            tracing::error!("spawn_blocking task panicked: {}", join_error);
                            return Err(std::io::Error::other("Terminal polling task panicked"));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Waits up to `timeout` for a terminal event.
    ///
    /// Polling failures (no terminal, as in CI) count as "no event".
    fn poll_terminal_event(timeout: Duration) -> Option<InputEvent> {
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(crossterm_event) => Self::convert_crossterm_event(crossterm_event),
                Err(e) => {
                    tracing::trace!("Failed to read terminal event: {}", e);
                    None
                }
            },
            Ok(false) => None,
            Err(e) => {
                tracing::trace!("Failed to poll terminal: {}", e);
                // Avoid spinning when there is no terminal to poll.
                std::thread::sleep(timeout);
                None
            }
        }
    }

    /// Keeps key presses and resizes; drops releases, mouse, focus and paste.
    fn convert_crossterm_event(event: CrosstermEvent) -> Option<InputEvent> {
        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                Some(InputEvent::Key(key))
            }
            CrosstermEvent::Resize(cols, rows) => Some(InputEvent::Resize(cols, rows)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn key_press_is_forwarded() {
        let key = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE);

        let converted = EventHandler::convert_crossterm_event(CrosstermEvent::Key(key));

        assert_eq!(converted, Some(InputEvent::Key(key)));
    }

    #[test]
    fn key_release_is_dropped() {
        let key = KeyEvent {
            code: KeyCode::Char('p'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };

        assert!(EventHandler::convert_crossterm_event(CrosstermEvent::Key(key)).is_none());
    }

    #[test]
    fn resize_is_forwarded() {
        assert_eq!(
            EventHandler::convert_crossterm_event(CrosstermEvent::Resize(120, 40)),
            Some(InputEvent::Resize(120, 40))
        );
    }

    #[test]
    fn focus_and_paste_are_dropped() {
        assert!(EventHandler::convert_crossterm_event(CrosstermEvent::FocusGained).is_none());
        assert!(
            EventHandler::convert_crossterm_event(CrosstermEvent::Paste("x".to_string()))
                .is_none()
        );
    }

    #[tokio::test]
    async fn event_handler_stops_on_shutdown_signal() {
        let (event_tx, _event_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(EventHandler::new(event_tx, shutdown_rx).run());
        let _ = shutdown_tx.send(());

        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok(), "Handler should complete within timeout");
        assert!(result.unwrap().unwrap().is_ok());
    }
}
