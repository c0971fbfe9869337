//! Recording speech service shared by the integration tests

#![allow(dead_code)]

use recite::speech::{SpeechEvent, SpeechService, UtteranceId, Voice};
use recite::state::config::Config;
use recite::state::State;
use recite::Result;
use std::sync::{Arc, Mutex};

/// One call to `speak`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spoken {
    pub id: UtteranceId,
    pub text: String,
    pub voice: Option<String>,
}

#[derive(Debug, Default)]
pub struct Log {
    pub spoken: Vec<Spoken>,
    pub cancels: usize,
    pub rate: Option<u8>,
    pub volume: Option<u8>,
    pub voices: Vec<Voice>,
    /// Events waiting to be returned from `poll_events`
    pub queued: Vec<SpeechEvent>,
}

/// Speech service that records every call and emits only what the test queues
#[derive(Clone, Default)]
pub struct MockSpeech {
    pub log: Arc<Mutex<Log>>,
}

impl MockSpeech {
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let mock = Self::default();
        mock.log.lock().unwrap().voices = voices;
        mock
    }

    pub fn spoken(&self) -> Vec<Spoken> {
        self.log.lock().unwrap().spoken.clone()
    }

    pub fn cancels(&self) -> usize {
        self.log.lock().unwrap().cancels
    }

    /// Report that the most recent utterance finished
    pub fn finish_last(&self) {
        let mut log = self.log.lock().unwrap();
        let id = log.spoken.last().expect("nothing spoken").id;
        log.queued.push(SpeechEvent::UtteranceEnded(id));
    }

    pub fn set_voices(&self, voices: Vec<Voice>) {
        let mut log = self.log.lock().unwrap();
        log.voices = voices;
        log.queued.push(SpeechEvent::VoicesChanged);
    }
}

impl SpeechService for MockSpeech {
    fn voices(&mut self) -> Result<Vec<Voice>> {
        Ok(self.log.lock().unwrap().voices.clone())
    }

    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<UtteranceId> {
        let mut log = self.log.lock().unwrap();
        let id = UtteranceId(log.spoken.len() as u64);
        log.spoken.push(Spoken {
            id,
            text: text.to_string(),
            voice: voice.map(|v| v.id.clone()),
        });
        Ok(id)
    }

    fn cancel(&mut self) -> Result<()> {
        self.log.lock().unwrap().cancels += 1;
        Ok(())
    }

    fn set_rate(&mut self, rate: u8) -> Result<()> {
        self.log.lock().unwrap().rate = Some(rate);
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<()> {
        self.log.lock().unwrap().volume = Some(volume);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SpeechEvent> {
        std::mem::take(&mut self.log.lock().unwrap().queued)
    }
}

pub fn voice(id: &str, default: bool) -> Voice {
    Voice {
        id: id.to_string(),
        name: format!("Voice {}", id),
        language: "en-US".to_string(),
        default,
    }
}

/// State with two voices (the first flagged default) and the given scripts
pub fn state_with(scripts: &[&str], interval: &str) -> (State, MockSpeech) {
    let mock = MockSpeech::with_voices(vec![voice("v0", true), voice("v1", false)]);
    let mut state = State::new(Config::in_memory(), Box::new(mock.clone())).unwrap();
    state.set_interval(interval);
    for text in scripts {
        state.form.insert_str(text);
        assert!(state.submit());
    }
    (state, mock)
}
