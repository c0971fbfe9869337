//! Sequential playback of the script list
//!
//! The controller is a two-state machine (Idle / Speaking) driven by the main
//! event loop. Each entry is spoken, then the controller waits for the
//! engine's utterance-ended signal, then for the configured interval, before
//! moving to the next entry. Time is passed in by the caller so the whole
//! sequence can be exercised without sleeping.

use crate::speech::{SpeechEvent, SpeechService, UtteranceId, Voice};
use crate::Result;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Whether a read-aloud run is in progress
///
/// Every mutating control checks this single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Speaking,
}

impl PlaybackState {
    pub fn is_speaking(self) -> bool {
        self == PlaybackState::Speaking
    }
}

/// Where the current entry is in its speak / pause cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the engine to finish this utterance
    Speaking(UtteranceId),
    /// Utterance done, waiting out the interval
    Pausing { until: Instant },
}

/// One playback run, captured when it starts
#[derive(Debug)]
struct Run {
    texts: Vec<String>,
    voice: Option<Voice>,
    interval: Duration,
    index: usize,
    phase: Phase,
}

/// What a call to [`PlaybackController::tick`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Moved on and submitted the entry at this index
    Advanced(usize),
    /// Last entry done; back to Idle
    Finished,
}

/// Drives sequential read-aloud of a list of texts
#[derive(Debug, Default)]
pub struct PlaybackController {
    run: Option<Run>,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        if self.run.is_some() {
            PlaybackState::Speaking
        } else {
            PlaybackState::Idle
        }
    }

    /// Index of the entry currently being spoken or paused after
    pub fn current_index(&self) -> Option<usize> {
        self.run.as_ref().map(|run| run.index)
    }

    /// Total entries in the current run
    pub fn run_len(&self) -> Option<usize> {
        self.run.as_ref().map(|run| run.texts.len())
    }

    /// Begin reading `texts` aloud
    ///
    /// Returns `Ok(false)` without touching anything when the list is empty or
    /// a run is already active. If the first utterance cannot be submitted the
    /// controller stays Idle and the error is returned.
    pub fn start(
        &mut self,
        texts: Vec<String>,
        voice: Option<Voice>,
        interval: Duration,
        speech: &mut dyn SpeechService,
    ) -> Result<bool> {
        if self.run.is_some() {
            debug!("Start ignored: already speaking");
            return Ok(false);
        }
        if texts.is_empty() {
            debug!("Start ignored: no scripts");
            return Ok(false);
        }

        info!(
            "Starting playback of {} scripts (interval {:?})",
            texts.len(),
            interval
        );
        let utterance = speech.speak(&texts[0], voice.as_ref())?;
        self.run = Some(Run {
            texts,
            voice,
            interval,
            index: 0,
            phase: Phase::Speaking(utterance),
        });
        Ok(true)
    }

    /// Feed a speech service notification into the state machine
    pub fn handle_event(&mut self, event: &SpeechEvent, now: Instant) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if let SpeechEvent::UtteranceEnded(ended) = event {
            match run.phase {
                Phase::Speaking(current) if current == *ended => {
                    debug!("Entry {} finished, pausing {:?}", run.index, run.interval);
                    run.phase = Phase::Pausing {
                        until: now + run.interval,
                    };
                }
                _ => debug!("Ignoring end of stale utterance {}", ended),
            }
        }
    }

    /// Advance past an expired pause
    ///
    /// Submits the next entry, or returns to Idle after the last one. The run
    /// is taken out of the controller before the Idle transition is reported,
    /// so it happens exactly once per run.
    pub fn tick(&mut self, now: Instant, speech: &mut dyn SpeechService) -> Result<Option<Progress>> {
        let Some(run) = self.run.as_mut() else {
            return Ok(None);
        };
        let Phase::Pausing { until } = run.phase else {
            return Ok(None);
        };
        if now < until {
            return Ok(None);
        }

        let next = run.index + 1;
        if next >= run.texts.len() {
            self.run = None;
            info!("Playback finished");
            return Ok(Some(Progress::Finished));
        }

        match speech.speak(&run.texts[next], run.voice.as_ref()) {
            Ok(utterance) => {
                run.index = next;
                run.phase = Phase::Speaking(utterance);
                Ok(Some(Progress::Advanced(next)))
            }
            Err(e) => {
                warn!("Aborting playback at entry {}: {}", next, e);
                self.run = None;
                Err(e)
            }
        }
    }

    /// Cancel the run, if any, and return to Idle
    ///
    /// Returns whether a run was active.
    pub fn stop(&mut self, speech: &mut dyn SpeechService) -> Result<bool> {
        if self.run.take().is_none() {
            return Ok(false);
        }
        info!("Playback stopped");
        speech.cancel()?;
        Ok(true)
    }

    /// Time left in the current pause, for sizing the poll timeout
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        match self.run.as_ref()?.phase {
            Phase::Pausing { until } => Some(until.saturating_duration_since(now)),
            Phase::Speaking(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReciteError;

    /// Minimal service that hands out ids and can be told to fail
    #[derive(Default)]
    struct Counter {
        spoken: Vec<String>,
        cancelled: usize,
        fail: bool,
    }

    impl SpeechService for Counter {
        fn voices(&mut self) -> Result<Vec<Voice>> {
            Ok(Vec::new())
        }

        fn speak(&mut self, text: &str, _voice: Option<&Voice>) -> Result<UtteranceId> {
            if self.fail {
                return Err(ReciteError::Speech("engine gone".to_string()));
            }
            self.spoken.push(text.to_string());
            Ok(UtteranceId(self.spoken.len() as u64 - 1))
        }

        fn cancel(&mut self) -> Result<()> {
            self.cancelled += 1;
            Ok(())
        }

        fn set_rate(&mut self, _rate: u8) -> Result<()> {
            Ok(())
        }

        fn set_volume(&mut self, _volume: u8) -> Result<()> {
            Ok(())
        }

        fn poll_events(&mut self) -> Vec<SpeechEvent> {
            Vec::new()
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_start_empty_is_noop() {
        let mut speech = Counter::default();
        let mut playback = PlaybackController::new();
        let started = playback
            .start(Vec::new(), None, Duration::ZERO, &mut speech)
            .unwrap();
        assert!(!started);
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(speech.spoken.is_empty());
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut speech = Counter::default();
        let mut playback = PlaybackController::new();
        assert!(playback
            .start(texts(&["a"]), None, Duration::ZERO, &mut speech)
            .unwrap());
        assert!(!playback
            .start(texts(&["b"]), None, Duration::ZERO, &mut speech)
            .unwrap());
        assert_eq!(speech.spoken, vec!["a"]);
    }

    #[test]
    fn test_stale_end_is_ignored() {
        let mut speech = Counter::default();
        let mut playback = PlaybackController::new();
        let now = Instant::now();
        playback
            .start(texts(&["a", "b"]), None, Duration::ZERO, &mut speech)
            .unwrap();

        playback.handle_event(&SpeechEvent::UtteranceEnded(UtteranceId(42)), now);
        assert_eq!(playback.next_deadline(now), None);
        assert_eq!(playback.tick(now, &mut speech).unwrap(), None);
        assert_eq!(speech.spoken, vec!["a"]);
    }

    #[test]
    fn test_pause_deadline() {
        let mut speech = Counter::default();
        let mut playback = PlaybackController::new();
        let now = Instant::now();
        playback
            .start(texts(&["a", "b"]), None, Duration::from_secs(3), &mut speech)
            .unwrap();
        playback.handle_event(&SpeechEvent::UtteranceEnded(UtteranceId(0)), now);

        let later = now + Duration::from_secs(1);
        assert_eq!(playback.next_deadline(later), Some(Duration::from_secs(2)));
        assert_eq!(playback.tick(later, &mut speech).unwrap(), None);
    }

    #[test]
    fn test_finish_fires_once() {
        let mut speech = Counter::default();
        let mut playback = PlaybackController::new();
        let now = Instant::now();
        playback
            .start(texts(&["only"]), None, Duration::ZERO, &mut speech)
            .unwrap();
        playback.handle_event(&SpeechEvent::UtteranceEnded(UtteranceId(0)), now);

        assert_eq!(
            playback.tick(now, &mut speech).unwrap(),
            Some(Progress::Finished)
        );
        assert_eq!(playback.tick(now, &mut speech).unwrap(), None);
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_stop_cancels_speech() {
        let mut speech = Counter::default();
        let mut playback = PlaybackController::new();
        playback
            .start(texts(&["a", "b"]), None, Duration::ZERO, &mut speech)
            .unwrap();

        assert!(playback.stop(&mut speech).unwrap());
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(speech.cancelled, 1);

        // Nothing to stop the second time
        assert!(!playback.stop(&mut speech).unwrap());
        assert_eq!(speech.cancelled, 1);
    }

    #[test]
    fn test_speak_failure_returns_to_idle() {
        let mut speech = Counter::default();
        let mut playback = PlaybackController::new();
        let now = Instant::now();
        playback
            .start(texts(&["a", "b"]), None, Duration::ZERO, &mut speech)
            .unwrap();
        playback.handle_event(&SpeechEvent::UtteranceEnded(UtteranceId(0)), now);

        speech.fail = true;
        assert!(playback.tick(now, &mut speech).is_err());
        assert_eq!(playback.state(), PlaybackState::Idle);
    }
}
