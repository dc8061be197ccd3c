//! Completion alerts.
//!
//! When a countdown finishes naturally the user gets a desktop notification
//! and, optionally, a sound. Delivery is best effort: it runs on a detached
//! task whose handle is dropped, and failures are only logged.

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use notify_rust::Notification;
use tracing::{debug, warn};

/// Title of the completion notification.
const NOTIFICATION_TITLE: &str = "Work Timer";

/// Application name reported to the notification daemon.
const APP_NAME: &str = "tasktimer";

/// Sound players and files tried in order; the first existing file is used.
#[cfg(target_os = "macos")]
const SOUND_COMMANDS: &[(&str, &str)] = &[("afplay", "/System/Library/Sounds/Crystal.aiff")];

#[cfg(not(target_os = "macos"))]
const SOUND_COMMANDS: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
];

/// Something that can tell the user a task's countdown is over.
pub trait Notifier: Send + Sync {
    /// Delivers the alert for `task`. Must not panic on delivery failure.
    fn notify(&self, task: &str);
}

/// Desktop notification plus an optional completion sound.
#[derive(Debug, Clone, Copy)]
pub struct DesktopNotifier {
    desktop: bool,
    sound: bool,
}

impl DesktopNotifier {
    #[must_use]
    pub fn new(desktop: bool, sound: bool) -> Self {
        Self { desktop, sound }
    }

    fn play_sound() {
        let Some(&(cmd, file)) = SOUND_COMMANDS
            .iter()
            .find(|(_, file)| Path::new(file).exists())
        else {
            debug!("No completion sound available");
            return;
        };

        let status = Command::new(cmd)
            .arg(file)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if !status.success() => {
                warn!(command = cmd, %status, "Sound player exited with failure");
            }
            Err(e) => warn!(command = cmd, error = %e, "Failed to run sound player"),
            Ok(_) => {}
        }
    }
}

/// Body text of the completion notification.
pub fn notification_body(task: &str) -> String {
    format!("Finished working on: {task}")
}

impl Notifier for DesktopNotifier {
    fn notify(&self, task: &str) {
        if self.desktop {
            if let Err(e) = Notification::new()
                .summary(NOTIFICATION_TITLE)
                .body(&notification_body(task))
                .appname(APP_NAME)
                .show()
            {
                warn!(task, error = %e, "Failed to show desktop notification");
            }
        }

        if self.sound {
            Self::play_sound();
        }
    }
}

/// Runs `notifier` for `task` in the background without keeping a handle.
///
/// Uses the blocking pool of the current tokio runtime when there is one and
/// a plain thread otherwise. The caller never waits on the outcome.
pub fn spawn_notification(notifier: Arc<dyn Notifier>, task: String) {
    let job = move || notifier.notify(&task);

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(job);
        }
        Err(_) => {
            std::thread::spawn(job);
        }
    }
}
