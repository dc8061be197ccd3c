//! Countdown state machine.
//!
//! The timer is an explicit [`TimerState`] value fed through the pure
//! [`transition`] function, one [`TimerEvent`] at a time. Each call returns
//! the next state plus the [`Effect`]s the caller must carry out. The
//! [`TimerEngine`] wrapper applies those effects: it persists through a
//! [`SessionSink`] and hands the completion alert to a detached
//! [`Notifier`] task.
//!
//! # States
//!
//! ```text
//!            pause               tick (elapsed >= target)
//!   Running ───────▶ Paused       Running ───────▶ Finished
//!      ▲               │
//!      └───────────────┘          Running ─┐
//!            resume               Paused  ─┴─ cancel ──▶ Cancelled
//! ```
//!
//! `Finished` and `Cancelled` are terminal. Entering either one emits exactly
//! one [`Effect::Persist`], and no event is accepted afterwards.
//!
//! # Elapsed time
//!
//! Elapsed time excludes pauses: on resume the effective start is shifted
//! forward by the length of the pause, and cancelling while paused records
//! the elapsed time frozen at the pause instant.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::notify::{spawn_notification, Notifier};
use crate::store::{SessionSink, StoreError};
use crate::types::Session;

/// Lifecycle phase of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Counting down; ticks are scheduled.
    Running,
    /// Frozen since `since`; no ticks are scheduled.
    Paused { since: DateTime<FixedOffset> },
    /// Reached the target duration.
    Finished,
    /// Interrupted before the target, after `elapsed` of work.
    Cancelled { elapsed: Duration },
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Running => "running",
            Phase::Paused { .. } => "paused",
            Phase::Finished => "finished",
            Phase::Cancelled { .. } => "cancelled",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discrete inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One time unit passed.
    Tick,
    /// Freeze the countdown.
    Pause,
    /// Continue a frozen countdown.
    Resume,
    /// Pause when running, resume when paused.
    TogglePause,
    /// Stop early and record the partial session.
    Cancel,
}

impl fmt::Display for TimerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimerEvent::Tick => "tick",
            TimerEvent::Pause => "pause",
            TimerEvent::Resume => "resume",
            TimerEvent::TogglePause => "toggle pause",
            TimerEvent::Cancel => "cancel",
        })
    }
}

/// Side effects requested by a transition, in the order they must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Record the session. Emitted once, on entering a terminal phase.
    Persist(Session),
    /// Alert the user that the task's countdown completed.
    Notify { task: String },
    /// Deliver the next [`TimerEvent::Tick`] one time unit from now.
    ScheduleTick,
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The state after the event.
    pub state: TimerState,
    /// Effects to apply, in order.
    pub effects: Vec<Effect>,
}

/// An event arrived in a phase that does not accept it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {event} a timer that is {phase}")]
pub struct TransitionError {
    /// The rejected event.
    pub event: TimerEvent,
    /// The phase the timer was in.
    pub phase: Phase,
}

/// In-memory state of one countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    task: String,
    target: Duration,
    started_at: DateTime<FixedOffset>,
    effective_start: DateTime<FixedOffset>,
    phase: Phase,
}

impl TimerState {
    /// Starts a countdown of `target` for `task` at `now`.
    ///
    /// The returned step asks for the first tick to be scheduled.
    #[must_use]
    pub fn start(task: impl Into<String>, target: Duration, now: DateTime<FixedOffset>) -> Step {
        let state = Self {
            task: task.into(),
            target,
            started_at: now,
            effective_start: now,
            phase: Phase::Running,
        };
        Step {
            state,
            effects: vec![Effect::ScheduleTick],
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Wall-clock instant the countdown was started.
    pub fn started_at(&self) -> DateTime<FixedOffset> {
        self.started_at
    }

    /// Start instant shifted forward by every completed pause.
    pub fn effective_start(&self) -> DateTime<FixedOffset> {
        self.effective_start
    }

    /// Instant the current pause began, if paused.
    pub fn pause_started_at(&self) -> Option<DateTime<FixedOffset>> {
        match self.phase {
            Phase::Paused { since } => Some(since),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, Phase::Paused { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Finished | Phase::Cancelled { .. })
    }

    /// Elapsed countdown time at `now`, excluding pauses.
    ///
    /// Frozen at the pause instant while paused, at the target once finished
    /// and at the recorded value once cancelled.
    pub fn elapsed_at(&self, now: DateTime<FixedOffset>) -> Duration {
        match self.phase {
            Phase::Running => span(self.effective_start, now),
            Phase::Paused { since } => span(self.effective_start, since),
            Phase::Finished => self.target,
            Phase::Cancelled { elapsed } => elapsed,
        }
    }

    /// Time left on the countdown at `now`.
    pub fn remaining_at(&self, now: DateTime<FixedOffset>) -> Duration {
        self.target.saturating_sub(self.elapsed_at(now))
    }

    /// Completed fraction in `0.0..=1.0`.
    pub fn progress_at(&self, now: DateTime<FixedOffset>) -> f64 {
        if self.target.is_zero() {
            return 1.0;
        }
        (self.elapsed_at(now).as_secs_f64() / self.target.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn with_phase(&self, phase: Phase) -> Self {
        Self {
            phase,
            ..self.clone()
        }
    }
}

/// Non-negative time from `from` to `to`; zero if the clock went backwards.
fn span(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Duration {
    (to - from).to_std().unwrap_or(Duration::ZERO)
}

/// Computes the next state for `event` arriving at `now`.
///
/// This function has no side effects; the returned [`Step`] lists what the
/// caller must do.
///
/// # Errors
///
/// Returns a [`TransitionError`] when `event` is not valid in the current
/// phase. Terminal phases accept no events.
pub fn transition(
    state: &TimerState,
    event: TimerEvent,
    now: DateTime<FixedOffset>,
) -> Result<Step, TransitionError> {
    let reject = || TransitionError {
        event,
        phase: state.phase,
    };

    match (state.phase, event) {
        (Phase::Running, TimerEvent::Tick) => {
            if span(state.effective_start, now) >= state.target {
                let session = Session::new(state.task.clone(), state.target, state.effective_start);
                Ok(Step {
                    state: state.with_phase(Phase::Finished),
                    effects: vec![
                        Effect::Persist(session),
                        Effect::Notify {
                            task: state.task.clone(),
                        },
                    ],
                })
            } else {
                Ok(Step {
                    state: state.clone(),
                    effects: vec![Effect::ScheduleTick],
                })
            }
        }

        (Phase::Running, TimerEvent::Pause | TimerEvent::TogglePause) => Ok(Step {
            state: state.with_phase(Phase::Paused { since: now }),
            effects: Vec::new(),
        }),

        (Phase::Paused { since }, TimerEvent::Resume | TimerEvent::TogglePause) => {
            let pause_length = now - since;
            let mut next = state.with_phase(Phase::Running);
            if pause_length > chrono::Duration::zero() {
                next.effective_start = state.effective_start + pause_length;
            }
            Ok(Step {
                state: next,
                effects: vec![Effect::ScheduleTick],
            })
        }

        (Phase::Running | Phase::Paused { .. }, TimerEvent::Cancel) => {
            let elapsed = state.elapsed_at(now);
            let session = Session::new(state.task.clone(), elapsed, state.started_at);
            Ok(Step {
                state: state.with_phase(Phase::Cancelled { elapsed }),
                effects: vec![Effect::Persist(session)],
            })
        }

        _ => Err(reject()),
    }
}

/// What the caller needs to know after the engine handled an event.
#[derive(Debug)]
pub struct Handled {
    /// A tick must be delivered one time unit from now.
    pub schedule_tick: bool,
    /// Present when the event ended the timer: the recorded session, or the
    /// error that kept it from being saved.
    pub saved: Option<Result<Session, StoreError>>,
}

/// Drives a [`TimerState`] and carries out the effects of each transition.
pub struct TimerEngine<S: SessionSink> {
    state: TimerState,
    sink: S,
    notifier: Option<Arc<dyn Notifier>>,
}

impl<S: SessionSink> TimerEngine<S> {
    /// Starts a countdown for `task` at `now`.
    ///
    /// The caller delivers the first [`TimerEvent::Tick`] one time unit later.
    pub fn start(
        task: impl Into<String>,
        target: Duration,
        sink: S,
        notifier: Option<Arc<dyn Notifier>>,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let step = TimerState::start(task, target, now);
        info!(
            task = %step.state.task(),
            target_secs = target.as_secs(),
            "Timer started"
        );
        Self {
            state: step.state,
            sink,
            notifier,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Applies `event` at `now`.
    ///
    /// Persistence runs synchronously before the notifier is spawned. A
    /// failed save is logged and returned in [`Handled::saved`]; the timer
    /// is terminal either way.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if the event is not valid in the
    /// current phase. The state is left unchanged.
    pub fn handle(
        &mut self,
        event: TimerEvent,
        now: DateTime<FixedOffset>,
    ) -> Result<Handled, TransitionError> {
        let step = transition(&self.state, event, now)?;

        if step.state.phase() != self.state.phase() {
            debug!(
                task = %self.state.task,
                from = %self.state.phase,
                to = %step.state.phase,
                %event,
                "Timer transition"
            );
        }
        self.state = step.state;

        let mut handled = Handled {
            schedule_tick: false,
            saved: None,
        };

        for effect in step.effects {
            match effect {
                Effect::ScheduleTick => handled.schedule_tick = true,
                Effect::Persist(session) => {
                    let result = match self.sink.append(&session) {
                        Ok(()) => Ok(session),
                        Err(e) => {
                            error!(task = %session.task, error = %e, "Failed to save session");
                            Err(e)
                        }
                    };
                    handled.saved = Some(result);
                }
                Effect::Notify { task } => {
                    if let Some(notifier) = &self.notifier {
                        spawn_notification(Arc::clone(notifier), task);
                    }
                }
            }
        }

        Ok(handled)
    }
}
