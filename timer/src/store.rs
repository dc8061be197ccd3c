//! Append-only session store backed by a single JSON file.
//!
//! The store keeps every [`Session`] ever recorded, in append order, as one
//! JSON array. Each append reads the whole file, pushes the new record and
//! rewrites the file in full.
//!
//! # Concurrency
//!
//! There is no locking. Two processes appending at the same time race on the
//! full-file rewrite and the last writer wins, dropping the other record.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use chrono::Local;
//! use tasktimer::store::SessionStore;
//! use tasktimer::types::Session;
//!
//! let store = SessionStore::new("/tmp/sessions.json");
//! store.append(&Session::new("write report", Duration::from_secs(1500), Local::now().fixed_offset()))?;
//!
//! for session in store.load_all()? {
//!     println!("{}: {:?}", session.task, session.duration);
//! }
//! # Ok::<(), tasktimer::store::StoreError>(())
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::types::Session;

/// Errors that can occur while reading or writing the session file.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file exists but does not hold a valid session list.
    #[error("corrupted session file {path}: {source}")]
    Parse {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The session list could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Destination for finished and cancelled sessions.
///
/// The timer engine persists through this trait so tests can observe appends
/// without touching the filesystem.
pub trait SessionSink {
    /// Durably records one session.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the session could not be recorded.
    fn append(&self, session: &Session) -> Result<(), StoreError>;
}

/// File-backed, append-only record of sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store backed by `path`. The file is not touched until the
    /// first read or write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every recorded session in append order.
    ///
    /// A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Io`] if the file exists but cannot be read
    /// - [`StoreError::Parse`] if the content is not a valid session list
    pub fn load_all(&self) -> Result<Vec<Session>, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Session file absent, store is empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        serde_json::from_slice(&data).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Appends `session` and rewrites the backing file.
    ///
    /// A corrupted file is reported rather than overwritten, so earlier
    /// records are never silently discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] if the existing file is corrupted and
    /// [`StoreError::Io`] if it cannot be read or written.
    pub fn append(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.load_all()?;
        sessions.push(session.clone());

        let data = serde_json::to_vec_pretty(&sessions).map_err(StoreError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, data)?;

        info!(
            path = %self.path.display(),
            task = %session.task,
            duration_secs = session.duration.as_secs(),
            records = sessions.len(),
            "Session saved"
        );
        Ok(())
    }

    /// Returns distinct task names in the order they were first recorded.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`load_all`](Self::load_all).
    pub fn recent_tasks(&self) -> Result<Vec<String>, StoreError> {
        let mut seen = HashSet::new();
        Ok(self
            .load_all()?
            .into_iter()
            .filter_map(|s| seen.insert(s.task.clone()).then_some(s.task))
            .collect())
    }
}

impl SessionSink for SessionStore {
    fn append(&self, session: &Session) -> Result<(), StoreError> {
        SessionStore::append(self, session)
    }
}
