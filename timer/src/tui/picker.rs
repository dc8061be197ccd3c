//! Task picker state.
//!
//! The picker offers `New Task` followed by previously recorded task names.
//! Choosing `New Task` switches to a text input for a fresh name.
//!
//! | Mode  | Key              | Effect                               |
//! |-------|------------------|--------------------------------------|
//! | List  | Up/Down, k/j     | Move the selection                   |
//! | List  | Enter            | Pick the task, or open the text input |
//! | List  | Esc, q, Ctrl+C   | Cancel the selection                 |
//! | Input | Enter            | Pick the trimmed text if non-empty   |
//! | Input | Backspace        | Delete the last character            |
//! | Input | Esc              | Back to the list                     |
//! | Input | Ctrl+C           | Cancel the selection                 |

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Label of the entry that opens the text input.
pub const NEW_TASK: &str = "New Task";

/// Which part of the picker has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerMode {
    #[default]
    List,
    Input,
}

/// Outcome of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    /// Keep going.
    None,
    /// The user chose a task.
    Selected(String),
    /// The user aborted.
    Cancelled,
}

/// State of the task picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    items: Vec<String>,
    selected: usize,
    mode: PickerMode,
    input: String,
}

impl PickerState {
    /// Builds a picker over `recent` task names, with `New Task` first.
    pub fn new(recent: Vec<String>) -> Self {
        let mut items = Vec::with_capacity(recent.len() + 1);
        items.push(NEW_TASK.to_string());
        items.extend(recent.into_iter().filter(|t| t != NEW_TASK));

        Self {
            items,
            selected: 0,
            mode: PickerMode::List,
            input: String::new(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn mode(&self) -> PickerMode {
        self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Applies one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return PickerAction::Cancelled;
        }

        match self.mode {
            PickerMode::List => self.handle_list_key(key.code),
            PickerMode::Input => self.handle_input_key(key.code),
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) -> PickerAction {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(self.items.len() - 1);
            }
            KeyCode::Enter => {
                if self.selected == 0 {
                    self.mode = PickerMode::Input;
                } else {
                    return PickerAction::Selected(self.items[self.selected].clone());
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => return PickerAction::Cancelled,
            _ => {}
        }
        PickerAction::None
    }

    fn handle_input_key(&mut self, code: KeyCode) -> PickerAction {
        match code {
            KeyCode::Enter => {
                let task = self.input.trim();
                if !task.is_empty() {
                    return PickerAction::Selected(task.to_string());
                }
            }
            KeyCode::Esc => {
                self.mode = PickerMode::List;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        PickerAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(picker: &mut PickerState, text: &str) {
        for c in text.chars() {
            assert_eq!(picker.handle_key(key(KeyCode::Char(c))), PickerAction::None);
        }
    }

    #[test]
    fn new_task_is_first_and_not_duplicated() {
        let picker = PickerState::new(vec!["review".to_string(), NEW_TASK.to_string()]);
        assert_eq!(picker.items(), &[NEW_TASK.to_string(), "review".to_string()]);
        assert_eq!(picker.selected(), 0);
    }

    #[test]
    fn selecting_recent_task() {
        let mut picker = PickerState::new(vec!["review".to_string(), "email".to_string()]);

        picker.handle_key(key(KeyCode::Down));
        picker.handle_key(key(KeyCode::Down));
        picker.handle_key(key(KeyCode::Down));

        assert_eq!(picker.selected(), 2);
        assert_eq!(
            picker.handle_key(key(KeyCode::Enter)),
            PickerAction::Selected("email".to_string())
        );
    }

    #[test]
    fn up_stops_at_first_item() {
        let mut picker = PickerState::new(vec!["review".to_string()]);
        picker.handle_key(key(KeyCode::Up));
        assert_eq!(picker.selected(), 0);
    }

    #[test]
    fn new_task_opens_text_input() {
        let mut picker = PickerState::new(Vec::new());

        assert_eq!(picker.handle_key(key(KeyCode::Enter)), PickerAction::None);
        assert_eq!(picker.mode(), PickerMode::Input);

        type_text(&mut picker, "  draft plan ");
        assert_eq!(
            picker.handle_key(key(KeyCode::Enter)),
            PickerAction::Selected("draft plan".to_string())
        );
    }

    #[test]
    fn blank_input_is_not_accepted() {
        let mut picker = PickerState::new(Vec::new());
        picker.handle_key(key(KeyCode::Enter));

        type_text(&mut picker, "   ");
        assert_eq!(picker.handle_key(key(KeyCode::Enter)), PickerAction::None);
    }

    #[test]
    fn backspace_and_escape_in_input() {
        let mut picker = PickerState::new(Vec::new());
        picker.handle_key(key(KeyCode::Enter));
        type_text(&mut picker, "abc");

        picker.handle_key(key(KeyCode::Backspace));
        assert_eq!(picker.input(), "ab");

        picker.handle_key(key(KeyCode::Esc));
        assert_eq!(picker.mode(), PickerMode::List);
    }

    #[test]
    fn q_types_in_input_but_cancels_in_list() {
        let mut picker = PickerState::new(Vec::new());
        assert_eq!(
            picker.clone().handle_key(key(KeyCode::Char('q'))),
            PickerAction::Cancelled
        );

        picker.handle_key(key(KeyCode::Enter));
        type_text(&mut picker, "q");
        assert_eq!(picker.input(), "q");
    }

    #[test]
    fn ctrl_c_cancels_in_any_mode() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let mut picker = PickerState::new(Vec::new());
        assert_eq!(picker.clone().handle_key(ctrl_c), PickerAction::Cancelled);

        picker.handle_key(key(KeyCode::Enter));
        assert_eq!(picker.handle_key(ctrl_c), PickerAction::Cancelled);
    }
}
