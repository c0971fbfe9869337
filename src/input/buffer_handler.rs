//! Buffer handler for collecting a short numeric value
//!
//! Used when a command needs a value from the user (e.g. the interval after
//! alt+i). Keystrokes are collected until Enter; Escape abandons the input.

use super::{HandlerAction, KeyEvent, KeyHandler};
use crate::state::State;
use crate::Result;
use log::debug;

/// Callback function type for when input is complete
type OnAcceptFn = Box<dyn FnOnce(String, &mut State) -> Result<()>>;

/// Handler that collects digits until Enter is pressed
pub struct BufferHandler {
    /// Label shown before the typed value
    label: String,

    /// Accumulated input buffer
    buffer: String,

    /// Longest accepted input, in digits
    max_len: usize,

    /// Callback to execute when Enter is pressed
    on_accept: Option<OnAcceptFn>,
}

impl BufferHandler {
    /// Create a new buffer handler
    ///
    /// Non-digit keys are dropped and at most `max_len` digits are kept. The
    /// callback receives the collected digits when the user presses Enter.
    pub fn numeric(label: &str, initial: &str, max_len: usize, on_accept: OnAcceptFn) -> Self {
        Self {
            label: label.to_string(),
            buffer: initial.chars().filter(char::is_ascii_digit).take(max_len).collect(),
            max_len,
            on_accept: Some(on_accept),
        }
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }
}

impl KeyHandler for BufferHandler {
    fn process(&mut self, key: &KeyEvent, state: &mut State) -> Result<HandlerAction> {
        match key {
            // Enter - accept input and invoke callback
            KeyEvent::Enter { .. } => {
                debug!("BufferHandler: accepting input '{}'", self.buffer);

                if let Some(callback) = self.on_accept.take() {
                    callback(self.buffer.clone(), state)?;
                }

                Ok(HandlerAction::Remove)
            }

            KeyEvent::Backspace => {
                self.buffer.pop();
                Ok(HandlerAction::Handled)
            }

            KeyEvent::Char(ch) => {
                if ch.is_ascii_digit() && self.buffer.len() < self.max_len {
                    self.buffer.push(*ch);
                    debug!("BufferHandler: buffer now '{}'", self.buffer);
                }
                Ok(HandlerAction::Handled)
            }

            // Escape or ctrl+c - abandon without calling back
            KeyEvent::Sequence(seq) if seq.as_slice() == b"\x1b" || seq.as_slice() == b"\x03" => {
                debug!("BufferHandler: cancelled");
                Ok(HandlerAction::Remove)
            }

            KeyEvent::Sequence(_) => Ok(HandlerAction::Handled),
        }
    }

    fn prompt(&self) -> Option<String> {
        Some(format!("{}: {}", self.label, self.contents()))
    }
}
