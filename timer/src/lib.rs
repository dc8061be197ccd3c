//! tasktimer - countdown timer with per-task daily summaries.
//!
//! This crate runs a countdown for a named task, records every finished or
//! cancelled session to a local JSON file and reports daily totals per task.
//!
//! # Overview
//!
//! A timer is an explicit state value driven by a pure transition function
//! (see [`engine`]). Entering a terminal state persists exactly one
//! [`Session`] through the [`store`]; a natural finish also fires a detached
//! desktop notification. `tasktimer summary` reads the store back and
//! aggregates it per task for one calendar day (see [`summary`]).
//!
//! # Modules
//!
//! - [`types`]: The session record
//! - [`store`]: Append-only JSON session store
//! - [`engine`]: Countdown state machine and its driver
//! - [`summary`]: Date parsing, daily aggregation and report rendering
//! - [`notify`]: Completion notifications
//! - [`args`]: Positional start argument resolution
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types
//! - [`tui`]: Terminal user interface

pub mod args;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod store;
pub mod summary;
pub mod tui;
pub mod types;

pub use args::{resolve_start, StartRequest};
pub use config::Config;
pub use engine::{transition, Effect, Phase, Step, TimerEngine, TimerEvent, TimerState};
pub use error::{InputError, Result, TimerError};
pub use notify::{DesktopNotifier, Notifier};
pub use store::{SessionSink, SessionStore, StoreError};
pub use summary::{parse_date, render_report, summarize, summarize_store, DailySummary, TaskTotal};
pub use types::Session;
