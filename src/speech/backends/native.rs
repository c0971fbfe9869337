//! Native Rust TTS backend using the tts crate
//!
//! This backend uses the `tts` crate which provides a unified interface to:
//! - Speech Dispatcher on Linux (via native bindings)
//! - AVFoundation on macOS/iOS (via native bindings)
//! - Various other platforms
//!
//! Completion is reported through the crate's utterance callbacks where the
//! platform has them, otherwise by polling `is_speaking`, and as a last
//! resort by a word-count estimate.

use crate::speech::{SpeechEvent, SpeechService, UtteranceId, Voice};
use crate::{ReciteError, Result};
use log::{debug, error, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tts::{Features, Tts as TtsCrate, UtteranceId as UtteranceIdCrate};

/// How often the voice list is re-queried for changes
const VOICE_CHECK_INTERVAL: Duration = Duration::from_secs(2);

/// Time an utterance gets to start before `is_speaking() == false` counts as finished
const SPEAKING_GRACE: Duration = Duration::from_millis(300);

/// Words per minute assumed when the engine cannot report completion
const ESTIMATE_WPM: u64 = 150;

/// Engine utterance id in comparable form
///
/// Crate ids are neither comparable nor `Send` on every platform, so the
/// debug rendering stands in for them.
type EngineKey = String;

fn engine_key(id: &UtteranceIdCrate) -> EngineKey {
    format!("{:?}", id)
}

/// An utterance handed to the engine that has not finished yet
struct Pending {
    id: UtteranceId,
    /// Id the engine gave the utterance, if it hands them out
    engine: Option<EngineKey>,
    submitted: Instant,
    estimate: Duration,
}

impl Pending {
    fn new(id: UtteranceId, engine: Option<EngineKey>, text: &str) -> Self {
        Self {
            id,
            engine,
            submitted: Instant::now(),
            estimate: estimate_duration(text),
        }
    }
}

/// Submitted utterances in engine order
#[derive(Default)]
struct PendingQueue {
    entries: VecDeque<Pending>,
}

impl PendingQueue {
    fn push(&mut self, pending: Pending) {
        self.entries.push_back(pending);
    }

    fn front(&self) -> Option<&Pending> {
        self.entries.front()
    }

    fn pop_front(&mut self) -> Option<UtteranceId> {
        self.entries.pop_front().map(|p| p.id)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    /// Finish the utterance the engine reported as ended
    ///
    /// Ends of utterances that were cancelled or never submitted here are
    /// dropped, so a late callback cannot finish a newer utterance.
    fn finish(&mut self, key: &str) -> Option<UtteranceId> {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|p| p.engine.as_deref() == Some(key))
        {
            return self.entries.remove(pos).map(|p| p.id);
        }
        // Without engine ids the only thing to go on is order
        if self.entries.front().is_some_and(|p| p.engine.is_none()) {
            return self.pop_front();
        }
        debug!("Ignoring end of unknown utterance {}", key);
        None
    }
}

/// Native TTS backend using the tts crate
pub struct NativeSpeech {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    /// Capabilities reported by the platform backend
    features: Features,

    /// Utterance-end signals from the platform callback
    ended_rx: Option<Receiver<EngineKey>>,

    pending: PendingQueue,

    next_id: u64,

    /// Id of the voice the engine reported as current at startup
    default_voice_id: Option<String>,

    /// Voice ids seen at the last check, used to detect changes
    known_voice_ids: Vec<String>,

    last_voice_check: Instant,
}

impl NativeSpeech {
    /// Create a new native TTS service
    ///
    /// Initializes the platform-appropriate TTS backend and hooks up the
    /// utterance-end callback when the platform supports it.
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = TtsCrate::default()
            .map_err(|e| ReciteError::Speech(format!("Failed to initialize TTS: {}", e)))?;
        let features = tts.supported_features();
        debug!("TTS features: {:?}", features);

        let ended_rx = if features.utterance_callbacks {
            let (tx, rx) = mpsc::channel();
            tts.on_utterance_end(Some(Box::new(move |utterance: UtteranceIdCrate| {
                // Receiver gone means the service was dropped
                let _ = tx.send(engine_key(&utterance));
            })))
            .map_err(|e| ReciteError::Speech(format!("Failed to register callback: {}", e)))?;
            Some(rx)
        } else {
            warn!("Utterance callbacks not supported, falling back to polling");
            None
        };

        let default_voice_id = if features.get_voice {
            match tts.voice() {
                Ok(voice) => voice.map(|v| v.id()),
                Err(e) => {
                    warn!("Failed to query current voice: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut service = Self {
            tts,
            features,
            ended_rx,
            pending: PendingQueue::default(),
            next_id: 0,
            default_voice_id,
            known_voice_ids: Vec::new(),
            last_voice_check: Instant::now(),
        };
        service.known_voice_ids = service.voice_ids();

        debug!("Native TTS backend created successfully");
        Ok(service)
    }

    fn voice_ids(&self) -> Vec<String> {
        if !self.features.voice {
            return Vec::new();
        }
        self.tts
            .voices()
            .map(|voices| voices.iter().map(|v| v.id()).collect())
            .unwrap_or_default()
    }

    /// Map a 0-100 rate onto the engine range, with 50 at the engine's normal rate
    fn convert_rate(&self, rate: u8) -> f32 {
        scale_around_normal(
            rate,
            self.tts.min_rate(),
            self.tts.normal_rate(),
            self.tts.max_rate(),
        )
    }

    /// Map a 0-100 volume onto the engine range
    fn convert_volume(&self, volume: u8) -> f32 {
        let min = self.tts.min_volume();
        let max = self.tts.max_volume();
        min + (max - min) * f32::from(volume.min(100)) / 100.0
    }

    fn check_voices(&mut self, events: &mut Vec<SpeechEvent>) {
        if self.last_voice_check.elapsed() < VOICE_CHECK_INTERVAL {
            return;
        }
        self.last_voice_check = Instant::now();

        let ids = self.voice_ids();
        if ids != self.known_voice_ids {
            debug!(
                "Voice list changed ({} -> {} voices)",
                self.known_voice_ids.len(),
                ids.len()
            );
            self.known_voice_ids = ids;
            events.push(SpeechEvent::VoicesChanged);
        }
    }
}

impl SpeechService for NativeSpeech {
    fn voices(&mut self) -> Result<Vec<Voice>> {
        if !self.features.voice {
            warn!("Voice selection not supported on this platform");
            return Ok(Vec::new());
        }

        let voices = self
            .tts
            .voices()
            .map_err(|e| ReciteError::Speech(format!("Failed to get voices: {}", e)))?;

        Ok(voices
            .iter()
            .map(|v| {
                let id = v.id();
                Voice {
                    default: self.default_voice_id.as_deref() == Some(id.as_str()),
                    id,
                    name: v.name(),
                    language: v.language().to_string(),
                }
            })
            .collect())
    }

    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<UtteranceId> {
        if let Some(wanted) = voice.filter(|_| self.features.voice) {
            let voices = self
                .tts
                .voices()
                .map_err(|e| ReciteError::Speech(format!("Failed to get voices: {}", e)))?;
            match voices.iter().find(|v| v.id() == wanted.id) {
                Some(v) => self
                    .tts
                    .set_voice(v)
                    .map_err(|e| ReciteError::Speech(format!("Failed to set voice: {}", e)))?,
                None => warn!("Voice {} is no longer available", wanted.name),
            }
        }

        debug!("Speaking: {}", text);
        let engine = self
            .tts
            .speak(text, false)
            .map_err(|e| {
                error!("Failed to speak: {}", e);
                ReciteError::Speech(format!("Speak failed: {}", e))
            })?
            .as_ref()
            .map(engine_key);

        let id = UtteranceId(self.next_id);
        self.next_id += 1;
        debug!("Utterance {} submitted as {:?}", id, engine);
        self.pending.push(Pending::new(id, engine, text));
        Ok(id)
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.pending.clear();

        if self.features.stop {
            self.tts.stop().map_err(|e| {
                error!("Failed to cancel speech: {}", e);
                ReciteError::Speech(format!("Cancel failed: {}", e))
            })?;
        }

        if let Some(rx) = &self.ended_rx {
            while rx.try_recv().is_ok() {}
        }
        Ok(())
    }

    fn set_rate(&mut self, rate: u8) -> Result<()> {
        debug!("Setting rate to {}", rate);

        if !self.features.rate {
            warn!("Rate control not supported on this platform");
            return Ok(());
        }

        let converted_rate = self.convert_rate(rate);
        self.tts
            .set_rate(converted_rate)
            .map_err(|e| ReciteError::Speech(format!("Failed to set rate: {}", e)))?;

        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<()> {
        debug!("Setting volume to {}", volume);

        if !self.features.volume {
            warn!("Volume control not supported on this platform");
            return Ok(());
        }

        let converted_volume = self.convert_volume(volume);
        self.tts
            .set_volume(converted_volume)
            .map_err(|e| ReciteError::Speech(format!("Failed to set volume: {}", e)))?;

        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SpeechEvent> {
        let mut events = Vec::new();

        if let Some(rx) = &self.ended_rx {
            let ended: Vec<EngineKey> = rx.try_iter().collect();
            for key in ended {
                if let Some(id) = self.pending.finish(&key) {
                    debug!("Utterance {} finished", id);
                    events.push(SpeechEvent::UtteranceEnded(id));
                }
            }
        } else if let Some(front) = self.pending.front() {
            let done = if self.features.is_speaking {
                front.submitted.elapsed() >= SPEAKING_GRACE
                    && !self.tts.is_speaking().unwrap_or(false)
            } else {
                front.submitted.elapsed() >= front.estimate
            };
            if done {
                if let Some(id) = self.pending.pop_front() {
                    debug!("Utterance {} finished", id);
                    events.push(SpeechEvent::UtteranceEnded(id));
                }
            }
        }

        self.check_voices(&mut events);
        events
    }
}

/// Piecewise-linear map of 0..=100 onto `min..=max` with 50 landing on `normal`
fn scale_around_normal(value: u8, min: f32, normal: f32, max: f32) -> f32 {
    let value = f32::from(value.min(100));
    if value <= 50.0 {
        min + (normal - min) * value / 50.0
    } else {
        normal + (max - normal) * (value - 50.0) / 50.0
    }
}

/// Rough speaking time for engines that cannot report completion
fn estimate_duration(text: &str) -> Duration {
    let words = text.split_whitespace().count().max(1) as u64;
    Duration::from_millis(words * 60_000 / ESTIMATE_WPM + 500)
}
