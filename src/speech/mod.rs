//! Speech synthesis system

pub mod backends;
pub mod service;

pub use service::{create_speech_service, SpeechEvent, SpeechService, UtteranceId, Voice};
