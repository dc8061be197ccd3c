//! Resolution of the positional start arguments.
//!
//! A timer is started with up to two positional arguments, a task name and a
//! number of minutes, given in either order:
//!
//! ```text
//! tasktimer                     # pick a task, default duration
//! tasktimer "write report"      # default duration
//! tasktimer "write report" 50
//! tasktimer 50 "write report"
//! tasktimer 50                  # pick a task, 50 minutes
//! ```

use std::time::Duration;

use crate::error::InputError;

/// What the command line asked the timer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    /// Task name, or `None` to ask the task picker.
    pub task: Option<String>,
    /// Countdown length in minutes.
    pub minutes: u32,
}

impl StartRequest {
    /// Countdown length as a [`Duration`].
    pub fn target(&self) -> Duration {
        Duration::from_secs(u64::from(self.minutes) * 60)
    }
}

/// Interprets the positional start arguments.
///
/// If the first argument is an integer it is the duration and the second
/// argument, when present, is the task. Otherwise the first argument is the
/// task and the second is used as the duration only if it is an integer.
/// Arguments after the second are ignored.
///
/// # Errors
///
/// - [`InputError::NonPositiveDuration`] if an integer duration is zero or negative
/// - [`InputError::EmptyTask`] if the task argument is blank
///
/// # Examples
///
/// ```
/// use tasktimer::args::resolve_start;
///
/// let request = resolve_start(&["45".to_string(), "deep work".to_string()], 25).unwrap();
/// assert_eq!(request.task.as_deref(), Some("deep work"));
/// assert_eq!(request.minutes, 45);
/// ```
pub fn resolve_start(args: &[String], default_minutes: u32) -> Result<StartRequest, InputError> {
    let mut minutes = default_minutes;

    let task = match args {
        [] => None,
        [first, rest @ ..] => match parse_minutes(first)? {
            Some(m) => {
                minutes = m;
                rest.first().map(|t| task_name(t)).transpose()?
            }
            None => {
                if let Some(m) = rest.first().map(|s| parse_minutes(s)).transpose()?.flatten() {
                    minutes = m;
                }
                Some(task_name(first)?)
            }
        },
    };

    Ok(StartRequest { task, minutes })
}

/// `Ok(None)` when `arg` is not an integer.
fn parse_minutes(arg: &str) -> Result<Option<u32>, InputError> {
    let Ok(value) = arg.trim().parse::<i64>() else {
        return Ok(None);
    };
    match u32::try_from(value) {
        Ok(m) if m > 0 => Ok(Some(m)),
        Ok(_) => Err(InputError::NonPositiveDuration(value)),
        // Larger than u32::MAX minutes; saturate rather than reject.
        Err(_) if value > 0 => Ok(Some(u32::MAX)),
        Err(_) => Err(InputError::NonPositiveDuration(value)),
    }
}

fn task_name(arg: &str) -> Result<String, InputError> {
    let trimmed = arg.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyTask);
    }
    Ok(trimmed.to_string())
}
