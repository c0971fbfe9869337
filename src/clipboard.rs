//! Clipboard integration
//!
//! Lets the user paste text from the system clipboard into the script input.

use crate::{ReciteError, Result};
use arboard::Clipboard;
use log::debug;

/// Get text from system clipboard
pub fn get_from_clipboard() -> Result<String> {
    debug!("Getting text from clipboard");

    let mut clipboard = Clipboard::new()
        .map_err(|e| ReciteError::Clipboard(format!("Failed to open clipboard: {}", e)))?;

    clipboard
        .get_text()
        .map_err(|e| ReciteError::Clipboard(format!("Failed to get from clipboard: {}", e)))
}
