//! Error types for tasktimer.
//!
//! This module defines the error types shared across the crate. Errors that
//! belong to a single component live next to it ([`ConfigError`] in
//! [`crate::config`], [`StoreError`] in [`crate::store`]) and convert into
//! [`TimerError`] at the binary boundary. A rejected timer event
//! ([`TransitionError`](crate::engine::TransitionError)) never leaves the
//! countdown loop; it is logged and dropped there.

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Errors that can occur while running tasktimer.
///
/// # Exit codes
///
/// The binary maps every variant to exit code `1`. A session that could not
/// be saved at the end of a countdown is not a `TimerError`: it is reported
/// through [`CountdownOutcome::saved`](crate::tui::CountdownOutcome) and the
/// process still exits with `0`.
#[derive(Error, Debug)]
pub enum TimerError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unusable command line input (duration, task name or date).
    #[error(transparent)]
    Input(#[from] InputError),

    /// The session file could not be loaded for a summary.
    #[error("session store error: {0}")]
    Store(#[from] StoreError),

    /// TUI-related error.
    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),

    /// The user aborted the task picker.
    #[error("selection cancelled")]
    CancelledSelection,
}

/// Errors raised while interpreting user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The duration is an integer but not a positive number of minutes.
    #[error("duration must be a positive number of minutes, got {0}")]
    NonPositiveDuration(i64),

    /// The task name is empty after trimming whitespace.
    #[error("task name cannot be empty")]
    EmptyTask,

    /// The summary date matched none of the accepted formats.
    #[error("invalid date format '{0}'. Use YYYY-MM-DD, MM-DD, or MMM DD")]
    InvalidDate(String),
}

/// Errors that can occur during TUI operation.
#[derive(Error, Debug)]
pub enum TuiError {
    /// Terminal initialization failed.
    #[error("failed to initialize terminal: {0}")]
    TerminalInit(#[source] std::io::Error),

    /// Terminal rendering failed.
    #[error("render error: {0}")]
    Render(#[source] std::io::Error),

    /// Terminal input could not be read.
    #[error("input closed before the timer finished")]
    InputClosed,
}

/// A specialized `Result` type for tasktimer operations.
pub type Result<T> = std::result::Result<T, TimerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_non_positive_duration_display() {
        let err = InputError::NonPositiveDuration(-5);
        assert_eq!(
            err.to_string(),
            "duration must be a positive number of minutes, got -5"
        );
    }

    #[test]
    fn input_error_invalid_date_display() {
        let err = InputError::InvalidDate("not-a-date".to_string());
        assert_eq!(
            err.to_string(),
            "invalid date format 'not-a-date'. Use YYYY-MM-DD, MM-DD, or MMM DD"
        );
    }

    #[test]
    fn input_error_is_transparent_in_timer_error() {
        let err: TimerError = InputError::EmptyTask.into();
        assert!(matches!(err, TimerError::Input(InputError::EmptyTask)));
        assert_eq!(err.to_string(), "task name cannot be empty");
    }

    #[test]
    fn config_error_to_timer_error_conversion() {
        let err: TimerError = ConfigError::NoHomeDirectory.into();
        assert!(matches!(err, TimerError::Config(_)));
        assert_eq!(
            err.to_string(),
            "configuration error: failed to determine home directory"
        );
    }

    #[test]
    fn store_error_to_timer_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TimerError = StoreError::Io(io_err).into();
        assert!(matches!(err, TimerError::Store(StoreError::Io(_))));
        assert!(err.to_string().starts_with("session store error: I/O error"));
    }

    #[test]
    fn cancelled_selection_display() {
        assert_eq!(
            TimerError::CancelledSelection.to_string(),
            "selection cancelled"
        );
    }

    #[test]
    fn tui_error_source_chain() {
        use std::error::Error;

        let io_err = std::io::Error::other("raw mode failed");
        let err = TuiError::TerminalInit(io_err);
        assert_eq!(
            err.to_string(),
            "failed to initialize terminal: raw mode failed"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn result_type_alias_works() {
        fn example_error_function() -> Result<i32> {
            Err(TimerError::CancelledSelection)
        }

        assert!(example_error_function().is_err());
    }
}
