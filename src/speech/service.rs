//! Speech service abstraction
//!
//! The playback controller and voice selector talk to the platform speech
//! engine only through [`SpeechService`], so both can be driven by a
//! recording fake in tests.

use crate::Result;
use log::info;
use std::fmt;

/// Identifies one submitted utterance
///
/// Ids are handed out by the service in submission order and are never reused
/// within a service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A synthesis voice reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Backend-specific identifier, stable across refreshes
    pub id: String,
    pub name: String,
    pub language: String,
    /// Whether the platform flags this voice as its default
    pub default: bool,
}

impl Voice {
    /// Display label, e.g. `Samantha (en-US) [Default]`
    pub fn label(&self) -> String {
        if self.default {
            format!("{} ({}) [Default]", self.name, self.language)
        } else {
            format!("{} ({})", self.name, self.language)
        }
    }
}

/// Notifications raised by the speech service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// The engine finished speaking the given utterance
    UtteranceEnded(UtteranceId),
    /// The set of available voices changed
    VoicesChanged,
}

/// Speech capability consumed by the application
///
/// Implementations queue utterances in submission order. Completion is
/// reported asynchronously through [`SpeechService::poll_events`], which the
/// event loop drains on every iteration.
pub trait SpeechService: Send {
    /// List the currently available voices (may be empty)
    fn voices(&mut self) -> Result<Vec<Voice>>;

    /// Queue `text` for speech with `voice`, or the engine default when `None`
    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<UtteranceId>;

    /// Silence current speech and drop anything queued
    fn cancel(&mut self) -> Result<()>;

    /// Set speech rate (0-100, where 50 is normal)
    fn set_rate(&mut self, rate: u8) -> Result<()>;

    /// Set speech volume (0-100)
    fn set_volume(&mut self, volume: u8) -> Result<()>;

    /// Drain pending notifications
    fn poll_events(&mut self) -> Vec<SpeechEvent>;
}

/// Create the platform speech service
///
/// Fails when the host offers no usable speech engine. Callers treat that as
/// the unsupported-platform condition.
pub fn create_speech_service() -> Result<Box<dyn SpeechService>> {
    info!(
        "Creating native speech service for platform: {}",
        std::env::consts::OS
    );
    let service = super::backends::native::NativeSpeech::new()?;
    info!("✓ Successfully initialized native TTS backend");
    Ok(Box::new(service))
}
