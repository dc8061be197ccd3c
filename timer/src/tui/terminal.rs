//! Terminal setup and RAII restoration.
//!
//! [`Tui`] enters raw mode and the alternate screen on creation and restores
//! the terminal when dropped. [`install_panic_hook`] restores it before a
//! panic message is printed, so the message stays readable.
//!
//! # Example
//!
//! ```ignore
//! use tasktimer::tui::{install_panic_hook, Tui};
//!
//! install_panic_hook();
//! let mut tui = Tui::new()?;
//! tui.draw(|frame| { /* render */ })?;
//! tui.restore()?;
//! ```

use std::io::{self, Stdout};
use std::panic;

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

/// Installs a panic hook that restores terminal state before displaying panic messages.
///
/// Call once at startup, before creating a [`Tui`]. Restoration errors are
/// ignored because the terminal may already be in an inconsistent state.
pub fn install_panic_hook() {
    let previous_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
        previous_hook(panic_info);
    }));
}

/// A ratatui terminal that restores the user's terminal on drop.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Set once restored so drop does not clean up twice.
    restored: bool,
}

impl Tui {
    /// Enables raw mode, enters the alternate screen and hides the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. Steps already taken are undone
    /// before returning.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(t) => t,
            Err(e) => {
                let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(e);
            }
        };

        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Draws a frame to the terminal using the provided closure.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }

    /// Restores the terminal. Later calls, and the drop, are no-ops.
    ///
    /// # Errors
    ///
    /// Unlike the [`Drop`] implementation, errors are propagated.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        execute!(io::stdout(), Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if self.restored {
            return;
        }

        // Errors are ignored: we may be unwinding and the terminal may
        // already be unusable.
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Creating a Tui needs a real terminal, so these tests only cover the
    // parts that do not.

    #[test]
    fn tui_struct_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Tui>();
    }

    #[test]
    fn install_panic_hook_can_be_called_repeatedly() {
        install_panic_hook();
        install_panic_hook();
        let _ = panic::take_hook();
    }
}
