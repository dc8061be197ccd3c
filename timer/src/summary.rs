//! Daily per-task totals.
//!
//! [`summarize`] attributes every session wholly to the calendar date its
//! `start_time` falls on in the local time zone, sums durations per task and
//! returns the totals sorted by task name. [`render_report`] turns the
//! result into the text printed by `tasktimer summary`.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use chrono::{DateTime, NaiveDate, Utc};
//! use tasktimer::summary::summarize_in;
//! use tasktimer::types::Session;
//!
//! let start = DateTime::parse_from_rfc3339("2024-03-05T09:00:00+00:00").unwrap();
//! let sessions = vec![
//!     Session::new("B", Duration::from_secs(300), start),
//!     Session::new("A", Duration::from_secs(600), start),
//! ];
//!
//! let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
//! let summary = summarize_in(&sessions, day, &Utc);
//!
//! assert_eq!(summary.totals[0].task, "A");
//! assert_eq!(summary.total, Duration::from_secs(900));
//! ```

use std::collections::HashMap;
use std::fmt::Write;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate, TimeZone};

use crate::error::{InputError, TimerError};
use crate::store::SessionStore;
use crate::types::Session;

/// Accepted formats that carry a year.
const DATED_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Accepted formats without a year; the current year is assumed.
const YEARLESS_FORMATS: &[&str] = &["%m-%d", "%m/%d", "%b %d", "%B %d"];

/// Width the task column is padded to in the report.
const TASK_COLUMN_WIDTH: usize = 20;

/// Horizontal rule around the task lines.
const RULE: &str = "--------------------";

/// Total time spent on one task during the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTotal {
    pub task: String,
    pub duration: Duration,
}

/// Per-task totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySummary {
    /// The day that was summarized.
    pub date: NaiveDate,
    /// One entry per task, sorted by task name.
    pub totals: Vec<TaskTotal>,
    /// Sum of every entry in `totals`.
    pub total: Duration,
}

impl DailySummary {
    /// True when no session started on `date`.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Parses a summary date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `MM-DD`, `MM/DD`, `Mon D` and
/// `Month D`. Forms without a year take the year of `today`.
///
/// # Errors
///
/// Returns [`InputError::InvalidDate`] when no format matches or the date
/// does not exist (for example `02-30`).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use tasktimer::summary::parse_date;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// assert_eq!(
///     parse_date("03-05", today).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
/// );
/// assert!(parse_date("not-a-date", today).is_err());
/// ```
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, InputError> {
    let trimmed = input.trim();

    if has_full_year(trimmed) {
        for format in DATED_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Ok(date);
            }
        }
    }

    let with_year = format!("{} {trimmed}", today.year());
    for format in YEARLESS_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, &format!("%Y {format}")) {
            return Ok(date);
        }
    }

    Err(InputError::InvalidDate(input.to_string()))
}

/// True when `input` starts with a four-digit year followed by `-` or `/`.
fn has_full_year(input: &str) -> bool {
    input
        .split(['-', '/'])
        .next()
        .is_some_and(|year| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()))
}

/// Loads every session from `store` and totals those that started on `day`
/// in the local time zone.
///
/// # Errors
///
/// Returns [`TimerError::Store`] if the session file cannot be read or is
/// corrupted. No partial summary is produced in that case.
pub fn summarize_store(store: &SessionStore, day: NaiveDate) -> Result<DailySummary, TimerError> {
    let sessions = store.load_all()?;
    Ok(summarize(&sessions, day))
}

/// Totals the sessions that started on `day` in the local time zone.
pub fn summarize(sessions: &[Session], day: NaiveDate) -> DailySummary {
    summarize_in(sessions, day, &Local)
}

/// Totals the sessions whose `start_time` falls on `day` in `tz`.
///
/// A session is never split across midnight: all of its duration counts
/// towards the day it started on.
pub fn summarize_in<Tz: TimeZone>(sessions: &[Session], day: NaiveDate, tz: &Tz) -> DailySummary {
    let mut by_task: HashMap<&str, Duration> = HashMap::new();

    for session in sessions
        .iter()
        .filter(|s| s.start_time.with_timezone(tz).date_naive() == day)
    {
        *by_task.entry(session.task.as_str()).or_default() += session.duration;
    }

    let mut totals: Vec<TaskTotal> = by_task
        .into_iter()
        .map(|(task, duration)| TaskTotal {
            task: task.to_string(),
            duration,
        })
        .collect();
    totals.sort_by(|a, b| a.task.cmp(&b.task));

    let total: Duration = totals.iter().map(|t| t.duration).sum();

    DailySummary {
        date: day,
        totals,
        total,
    }
}

/// Renders the report printed by `tasktimer summary`.
pub fn render_report(summary: &DailySummary) -> String {
    let date = summary.date.format("%A, %B %-d, %Y");

    if summary.is_empty() {
        return format!("No work sessions recorded for {date}\n");
    }

    let mut out = String::new();
    let _ = writeln!(out, "\nWork Summary for {date}:");
    let _ = writeln!(out, "{RULE}");
    for entry in &summary.totals {
        let _ = writeln!(
            out,
            "{:<width$}: {}",
            entry.task,
            format_duration(entry.duration),
            width = TASK_COLUMN_WIDTH
        );
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Total Time: {}\n", format_duration(summary.total));
    out
}

/// Formats a duration rounded to the nearest second as `1h2m3s`, `4m0s`
/// or `5s`.
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    if duration.subsec_millis() >= 500 {
        secs += 1;
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
