//! recite - read a queue of scripts aloud
//!
//! A terminal utility that collects short text scripts and speaks them one
//! after another through the system text-to-speech engine, pausing a
//! configurable number of seconds between entries.

pub mod clipboard;
pub mod error;
pub mod input;
pub mod playback;
pub mod speech;
pub mod state;
pub mod terminal;

pub use error::{ReciteError, Result};

use log::info;
use speech::SpeechService;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "recite";

/// Message shown instead of the interactive surface when no speech engine is available
pub const UNSUPPORTED_MESSAGE: &str = "Speech synthesis is not supported on this system.";

/// Check that a speech engine came up
///
/// On failure the caller shows [`UNSUPPORTED_MESSAGE`] and exits without
/// building any state.
pub fn require_speech(
    speech: Result<Box<dyn SpeechService>>,
) -> std::result::Result<Box<dyn SpeechService>, &'static str> {
    speech.map_err(|e| {
        info!("Speech unavailable: {}", e);
        UNSUPPORTED_MESSAGE
    })
}
