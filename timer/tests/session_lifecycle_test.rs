//! Integration tests for the timer lifecycle against a real session file.
//!
//! These tests drive [`TimerEngine`] with explicit timestamps and a
//! [`SessionStore`] in a temporary directory, then read the file back to
//! check what was recorded.

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone};
use tempfile::TempDir;

use tasktimer::engine::{Phase, TimerEngine, TimerEvent};
use tasktimer::notify::Notifier;
use tasktimer::store::{SessionStore, StoreError};

// ============================================================================
// Helper Functions
// ============================================================================

/// 2024-03-05 09:00:00 at UTC+01:00.
fn t0() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 5, 9, 0, 0)
        .unwrap()
}

fn at(secs: i64) -> DateTime<FixedOffset> {
    t0() + chrono::Duration::seconds(secs)
}

fn temp_store() -> (TempDir, SessionStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = SessionStore::new(dir.path().join("sessions.json"));
    (dir, store)
}

/// Forwards every alert to a channel so tests can wait for it.
struct ChannelNotifier {
    tx: Mutex<mpsc::Sender<String>>,
}

fn channel_notifier() -> (Arc<dyn Notifier>, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel();
    let notifier: Arc<dyn Notifier> = Arc::new(ChannelNotifier { tx: Mutex::new(tx) });
    (notifier, rx)
}

impl Notifier for ChannelNotifier {
    fn notify(&self, task: &str) {
        let _ = self.tx.lock().unwrap().send(task.to_string());
    }
}

/// Ticks once per second from `from` until the timer leaves `Running`.
fn tick_until_done(engine: &mut TimerEngine<SessionStore>, from: i64, limit: i64) {
    for s in from..=limit {
        engine.handle(TimerEvent::Tick, at(s)).unwrap();
        if engine.state().is_terminal() {
            return;
        }
    }
    panic!("timer did not finish by {limit}s");
}

// ============================================================================
// Natural completion
// ============================================================================

#[test]
fn finished_session_is_recorded_with_target_duration() {
    let (_dir, store) = temp_store();
    let (notifier, alerts) = channel_notifier();

    let mut engine = TimerEngine::start(
        "write report",
        Duration::from_secs(60),
        store,
        Some(notifier),
        t0(),
    );
    assert!(engine.state().is_running());

    tick_until_done(&mut engine, 1, 120);

    assert_eq!(engine.state().phase(), Phase::Finished);
    let sessions = engine.sink().load_all().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].task, "write report");
    assert_eq!(sessions[0].duration, Duration::from_secs(60));
    assert_eq!(sessions[0].start_time, t0());

    let alerted = alerts
        .recv_timeout(Duration::from_secs(2))
        .expect("notifier should run");
    assert_eq!(alerted, "write report");
}

#[test]
fn pause_extends_wall_clock_but_not_recorded_duration() {
    let (_dir, store) = temp_store();

    let mut engine =
        TimerEngine::start("review", Duration::from_secs(60), store, None, t0());

    engine.handle(TimerEvent::Tick, at(20)).unwrap();
    engine.handle(TimerEvent::TogglePause, at(20)).unwrap();
    assert!(engine.state().is_paused());

    // Ticks are not accepted while paused.
    assert!(engine.handle(TimerEvent::Tick, at(50)).is_err());

    let handled = engine.handle(TimerEvent::TogglePause, at(50)).unwrap();
    assert!(handled.schedule_tick);

    // 20s before the pause plus 39s after it is still short of the target.
    engine.handle(TimerEvent::Tick, at(89)).unwrap();
    assert!(engine.state().is_running());

    let handled = engine.handle(TimerEvent::Tick, at(90)).unwrap();
    assert_eq!(engine.state().phase(), Phase::Finished);
    assert!(matches!(handled.saved, Some(Ok(_))));

    let sessions = engine.sink().load_all().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration, Duration::from_secs(60));
    assert_eq!(sessions[0].start_time, at(30));
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn cancelled_session_records_partial_elapsed_time() {
    let (_dir, store) = temp_store();
    let (notifier, alerts) = channel_notifier();

    let mut engine = TimerEngine::start(
        "email",
        Duration::from_secs(1500),
        store,
        Some(notifier),
        t0(),
    );

    engine.handle(TimerEvent::Tick, at(1)).unwrap();
    let handled = engine.handle(TimerEvent::Cancel, at(90)).unwrap();

    assert!(matches!(
        engine.state().phase(),
        Phase::Cancelled { elapsed } if elapsed == Duration::from_secs(90)
    ));
    let saved = handled.saved.expect("cancel persists").unwrap();
    assert_eq!(saved.duration, Duration::from_secs(90));
    assert_eq!(saved.start_time, t0());

    assert_eq!(engine.sink().load_all().unwrap(), vec![saved]);
    assert!(
        alerts.recv_timeout(Duration::from_millis(200)).is_err(),
        "cancel must not notify"
    );
}

#[test]
fn cancel_while_paused_records_time_up_to_pause() {
    let (_dir, store) = temp_store();

    let mut engine = TimerEngine::start("email", Duration::from_secs(600), store, None, t0());
    engine.handle(TimerEvent::Pause, at(45)).unwrap();
    engine.handle(TimerEvent::Cancel, at(400)).unwrap();

    let sessions = engine.sink().load_all().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration, Duration::from_secs(45));
}

#[test]
fn terminal_timer_rejects_further_events_and_records_once() {
    let (_dir, store) = temp_store();

    let mut engine = TimerEngine::start("email", Duration::from_secs(600), store, None, t0());
    engine.handle(TimerEvent::Cancel, at(10)).unwrap();

    for event in [
        TimerEvent::Tick,
        TimerEvent::Pause,
        TimerEvent::Resume,
        TimerEvent::Cancel,
    ] {
        assert!(engine.handle(event, at(20)).is_err(), "{event} accepted");
    }
    assert_eq!(engine.sink().load_all().unwrap().len(), 1);
}

// ============================================================================
// Store behaviour across runs
// ============================================================================

#[test]
fn consecutive_runs_append_in_order() {
    let (dir, store) = temp_store();
    let path = store.path().to_path_buf();

    let mut first = TimerEngine::start("A", Duration::from_secs(5), store, None, t0());
    tick_until_done(&mut first, 1, 10);

    let mut second = TimerEngine::start(
        "B",
        Duration::from_secs(600),
        SessionStore::new(&path),
        None,
        at(100),
    );
    second.handle(TimerEvent::Cancel, at(130)).unwrap();

    let mut third =
        TimerEngine::start("A", Duration::from_secs(5), SessionStore::new(&path), None, at(200));
    tick_until_done(&mut third, 201, 210);

    let store = SessionStore::new(dir.path().join("sessions.json"));
    let tasks: Vec<String> = store.load_all().unwrap().into_iter().map(|s| s.task).collect();
    assert_eq!(tasks, ["A", "B", "A"]);
    assert_eq!(store.recent_tasks().unwrap(), ["A", "B"]);
}

#[test]
fn save_failure_is_reported_and_timer_still_ends() {
    let (dir, store) = temp_store();
    std::fs::write(store.path(), "{ not json").unwrap();

    let mut engine = TimerEngine::start("A", Duration::from_secs(600), store, None, t0());
    let handled = engine.handle(TimerEvent::Cancel, at(30)).unwrap();

    assert!(engine.state().is_terminal());
    assert!(matches!(handled.saved, Some(Err(StoreError::Parse { .. }))));

    // The corrupted content is left as it was.
    let content = std::fs::read_to_string(dir.path().join("sessions.json")).unwrap();
    assert_eq!(content, "{ not json");
}

#[test]
fn session_file_uses_nanosecond_durations_and_rfc3339_start() {
    let (_dir, store) = temp_store();

    let mut engine = TimerEngine::start("A", Duration::from_secs(600), store, None, t0());
    engine.handle(TimerEvent::Cancel, at(2)).unwrap();

    let raw = std::fs::read_to_string(engine.sink().path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["task"], "A");
    assert_eq!(value[0]["duration"], 2_000_000_000u64);
    assert_eq!(value[0]["start_time"], "2024-03-05T09:00:00+01:00");
}
