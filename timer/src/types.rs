//! Session record type.
//!
//! A [`Session`] is one completed or cancelled unit of tracked work. Records
//! are immutable once written; the store only ever appends them.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "task": "write report",
//!   "duration": 1500000000000,
//!   "start_time": "2024-03-05T09:00:00+01:00"
//! }
//! ```
//!
//! `duration` is an integer count of nanoseconds and `start_time` is an
//! RFC 3339 timestamp that keeps the offset it was recorded with.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One recorded work session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Name of the task the time was spent on.
    pub task: String,

    /// Time spent, excluding any paused intervals.
    #[serde(with = "duration_nanos")]
    pub duration: Duration,

    /// When the session started, in the local offset at recording time.
    pub start_time: DateTime<FixedOffset>,
}

impl Session {
    /// Creates a new session record.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use chrono::DateTime;
    /// use tasktimer::types::Session;
    ///
    /// let start = DateTime::parse_from_rfc3339("2024-03-05T09:00:00+01:00").unwrap();
    /// let session = Session::new("write report", Duration::from_secs(600), start);
    ///
    /// assert_eq!(session.task, "write report");
    /// assert_eq!(session.duration.as_secs(), 600);
    /// ```
    #[must_use]
    pub fn new(task: impl Into<String>, duration: Duration, start_time: DateTime<FixedOffset>) -> Self {
        Self {
            task: task.into(),
            duration,
            start_time,
        }
    }
}

/// Serializes a [`Duration`] as an integer number of nanoseconds.
mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}
