//! Default key bindings for recite
//!
//! Commands use Alt so that plain typing always goes to the script input.

use std::collections::HashMap;

/// Key sequence type
pub type KeySequence = Vec<u8>;

/// Action identifier for key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Voice selection
    NextVoice,
    PrevVoice,

    // Playback
    SetInterval,
    Start,
    Stop,

    // Script list
    CursorUp,
    CursorDown,
    DeleteScript,

    // Input
    PasteClipboard,
    ClearInput,

    Quit,
}

/// Create the default keymap
pub fn create_default_keymap() -> HashMap<KeySequence, KeyAction> {
    let mut map = HashMap::new();

    // Voice (alt+v / alt+V)
    map.insert(b"\x1bv".to_vec(), KeyAction::NextVoice);
    map.insert(b"\x1bV".to_vec(), KeyAction::PrevVoice);

    // Playback (alt+i / alt+s / alt+x)
    map.insert(b"\x1bi".to_vec(), KeyAction::SetInterval);
    map.insert(b"\x1bs".to_vec(), KeyAction::Start);
    map.insert(b"\x1bx".to_vec(), KeyAction::Stop);

    // Script list
    map.insert(b"\x1b[A".to_vec(), KeyAction::CursorUp);
    map.insert(b"\x1b[B".to_vec(), KeyAction::CursorDown);
    map.insert(b"\x1bOA".to_vec(), KeyAction::CursorUp);
    map.insert(b"\x1bOB".to_vec(), KeyAction::CursorDown);
    map.insert(b"\x1bd".to_vec(), KeyAction::DeleteScript);
    map.insert(b"\x1b[3~".to_vec(), KeyAction::DeleteScript);

    // Input (alt+p / ctrl+u)
    map.insert(b"\x1bp".to_vec(), KeyAction::PasteClipboard);
    map.insert(b"\x15".to_vec(), KeyAction::ClearInput);

    // Quit (alt+q / ctrl+c)
    map.insert(b"\x1bq".to_vec(), KeyAction::Quit);
    map.insert(b"\x03".to_vec(), KeyAction::Quit);

    map
}
