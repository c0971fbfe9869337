//! Script input form
//!
//! Owns the text being typed. Enter submits; Shift+Enter and Enter during a
//! paste insert a newline instead.

use super::scripts::MAX_SCRIPT_CHARS;
use crate::input::KeyEvent;

/// Outcome of feeding a key to the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    /// Input text changed (or was already at the cap)
    Edited,
    /// User asked to add the current text
    Submit,
    /// Key is not for the form
    Ignored,
}

#[derive(Debug, Default)]
pub struct ScriptForm {
    input: String,
}

impl ScriptForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> FormAction {
        match key {
            KeyEvent::Enter {
                shift: false,
                composing: false,
            } => FormAction::Submit,
            KeyEvent::Enter { .. } => {
                self.insert_str("\n");
                FormAction::Edited
            }
            KeyEvent::Char(ch) => {
                self.insert_str(ch.encode_utf8(&mut [0; 4]));
                FormAction::Edited
            }
            KeyEvent::Backspace => {
                self.input.pop();
                FormAction::Edited
            }
            KeyEvent::Sequence(_) => FormAction::Ignored,
        }
    }

    /// Append text, dropping control characters other than newline and
    /// anything past the length cap
    pub fn insert_str(&mut self, text: &str) {
        let room = MAX_SCRIPT_CHARS.saturating_sub(self.input.chars().count());
        self.input.extend(
            text.chars()
                .filter(|&c| c == '\n' || !c.is_control())
                .take(room),
        );
    }

    pub fn text(&self) -> &str {
        &self.input
    }

    /// Whether submitting now would add a script
    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }
}
