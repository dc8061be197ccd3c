//! Terminal user interface.
//!
//! The TUI is a thin layer over the library: it collects key presses,
//! turns them into timer or picker actions and draws the current state.
//!
//! # Submodules
//!
//! - [`app`]: Countdown and task picker loops, shutdown signal handling
//! - [`events`]: Terminal input polling on a background task
//! - [`picker`]: Task picker state and key handling
//! - [`terminal`]: Terminal initialization and cleanup with panic handling
//! - [`ui`]: Frame rendering

pub mod app;
pub mod events;
pub mod picker;
pub mod terminal;
pub mod ui;

pub use app::{pick_task, run_countdown, wait_for_shutdown, CountdownOutcome, TICK_INTERVAL};
pub use events::{EventHandler, InputEvent};
pub use picker::PickerState;
pub use terminal::{install_panic_hook, Tui};
