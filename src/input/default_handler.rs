//! Default key handler
//!
//! Runs keymap commands for Alt/control sequences and sends every other key
//! to the script form.

use super::{BufferHandler, HandlerAction, KeyAction, KeyEvent};
use crate::state::{State, MAX_INTERVAL_DIGITS};
use crate::Result;
use log::{debug, warn};
use std::collections::HashMap;

/// Handler for keys when no modal handler is active
pub struct DefaultKeyHandler {
    keymap: HashMap<Vec<u8>, KeyAction>,
}

impl DefaultKeyHandler {
    /// Create a new default key handler
    pub fn new(keymap: HashMap<Vec<u8>, KeyAction>) -> Self {
        Self { keymap }
    }

    /// Process a key
    pub fn process_key(&mut self, key: &KeyEvent, state: &mut State) -> Result<HandlerAction> {
        match key {
            KeyEvent::Sequence(seq) => match self.keymap.get(seq).copied() {
                Some(action) => {
                    debug!("Key action: {:?}", action);
                    self.execute_action(action, state)?;
                    Ok(HandlerAction::Handled)
                }
                None => {
                    debug!("Unbound sequence {:?}", seq);
                    Ok(HandlerAction::Passthrough)
                }
            },
            _ => {
                state.form_key(key);
                Ok(HandlerAction::Handled)
            }
        }
    }

    /// Execute a key action
    fn execute_action(&mut self, action: KeyAction, state: &mut State) -> Result<()> {
        match action {
            KeyAction::NextVoice => {
                state.next_voice();
            }
            KeyAction::PrevVoice => {
                state.previous_voice();
            }
            KeyAction::SetInterval => {
                if state.is_speaking() {
                    return Ok(());
                }
                let current = state.interval().to_string();
                state.handlers.push(Box::new(BufferHandler::numeric(
                    "Interval (seconds)",
                    &current,
                    MAX_INTERVAL_DIGITS,
                    Box::new(|input: String, state: &mut State| {
                        state.set_interval(&input);
                        Ok(())
                    }),
                )));
            }
            KeyAction::Start => match state.start() {
                Ok(true) => {}
                Ok(false) => debug!("Nothing to start"),
                Err(e) => {
                    warn!("Failed to start playback: {}", e);
                    state.status = Some(e.to_string());
                }
            },
            KeyAction::Stop => {
                if state.stop()? {
                    state.status = Some("Stopped".to_string());
                }
            }
            KeyAction::CursorUp => state.scripts.cursor_up(),
            KeyAction::CursorDown => state.scripts.cursor_down(),
            KeyAction::DeleteScript => {
                state.remove_selected();
            }
            KeyAction::PasteClipboard => {
                if let Err(e) = state.paste_clipboard() {
                    warn!("Paste failed: {}", e);
                    state.status = Some(e.to_string());
                }
            }
            KeyAction::ClearInput => state.form.clear(),
            KeyAction::Quit => {
                if let Err(e) = state.stop() {
                    warn!("Failed to stop playback: {}", e);
                }
                state.quit = true;
            }
        }
        Ok(())
    }
}

/// Route a key through the modal handler stack, falling back to `default_handler`
pub fn dispatch_key(
    key: &KeyEvent,
    state: &mut State,
    default_handler: &mut DefaultKeyHandler,
) -> Result<()> {
    // Pop the top handler so it can borrow the state mutably
    if let Some(mut handler) = state.handlers.pop() {
        match handler.process(key, state)? {
            HandlerAction::Passthrough => {
                state.handlers.push(handler);
                default_handler.process_key(key, state)?;
            }
            HandlerAction::Remove => {}
            HandlerAction::Handled => state.handlers.push(handler),
        }
        return Ok(());
    }

    default_handler.process_key(key, state)?;
    Ok(())
}
