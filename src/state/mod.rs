//! Application state management
//!
//! The State struct is the central data structure for recite, holding the
//! script list, voice selection, interval, input form and playback controller.
//! Every mutating operation checks the playback state first and silently does
//! nothing while a run is speaking.

pub mod config;
pub mod form;
pub mod scripts;
pub mod voices;

use crate::input::{HandlerStack, KeyEvent};
use crate::playback::{PlaybackController, PlaybackState, Progress};
use crate::speech::{SpeechEvent, SpeechService};
use crate::Result;
use config::{Config, MAX_INTERVAL_SECS};
use form::{FormAction, ScriptForm};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use scripts::ScriptList;
use std::time::{Duration, Instant};
use voices::VoiceSelector;

/// Digits the interval input may hold
pub const MAX_INTERVAL_DIGITS: usize = 3;

/// Event loop wake-up when nothing is scheduled
const IDLE_POLL: Duration = Duration::from_millis(100);

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").expect("valid regex"));

/// Parse interval input the forgiving way: non-digits are stripped, at most
/// three digits are kept, and an empty result means zero
pub fn parse_interval(input: &str) -> u32 {
    let digits = NON_DIGITS.replace_all(input, "");
    digits
        .chars()
        .take(MAX_INTERVAL_DIGITS)
        .collect::<String>()
        .parse()
        .map_or(0, |secs: u32| secs.min(MAX_INTERVAL_SECS))
}

/// Main application state
pub struct State {
    /// Startup settings
    pub config: Config,

    /// Scripts waiting to be read
    pub scripts: ScriptList,

    /// Available voices and the current choice
    pub voices: VoiceSelector,

    /// Text being typed
    pub form: ScriptForm,

    /// Pause after each script, in seconds
    interval: u32,

    /// Sequential read-aloud state machine
    playback: PlaybackController,

    /// Speech engine (injected so tests can record calls)
    speech: Box<dyn SpeechService>,

    /// Key handler stack for modal input
    pub handlers: HandlerStack,

    /// One-line message shown at the bottom of the screen
    pub status: Option<String>,

    /// Set when the user asks to exit
    pub quit: bool,
}

impl State {
    /// Create application state around a speech service
    ///
    /// Applies the configured rate and volume and loads the initial voice list.
    pub fn new(config: Config, mut speech: Box<dyn SpeechService>) -> Result<Self> {
        if let Some(rate) = config.rate() {
            speech.set_rate(rate)?;
            info!("Speech rate set to {}", rate);
        }
        if let Some(volume) = config.volume() {
            speech.set_volume(volume)?;
            info!("Speech volume set to {}", volume);
        }

        let mut state = Self {
            voices: VoiceSelector::new(config.voice()),
            interval: config.interval(),
            config,
            scripts: ScriptList::new(),
            form: ScriptForm::new(),
            playback: PlaybackController::new(),
            speech,
            handlers: HandlerStack::new(),
            status: None,
            quit: false,
        };
        state.refresh_voices();
        info!(
            "State initialized: {} voices, interval {}s",
            state.voices.voices().len(),
            state.interval
        );
        Ok(state)
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn is_speaking(&self) -> bool {
        self.playback_state().is_speaking()
    }

    /// Entry being read and run length, while speaking
    pub fn progress(&self) -> Option<(usize, usize)> {
        Some((self.playback.current_index()?, self.playback.run_len()?))
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Re-read the voice list from the speech service
    pub fn refresh_voices(&mut self) {
        match self.speech.voices() {
            Ok(voices) => self.voices.refresh(voices),
            Err(e) => {
                warn!("Failed to list voices: {}", e);
                self.voices.refresh(Vec::new());
            }
        }
    }

    // ========== Mutating controls (ignored while speaking) ==========

    /// Add the form's text as a new script and clear the form
    pub fn submit(&mut self) -> bool {
        if self.is_speaking() {
            debug!("Submit ignored while speaking");
            return false;
        }
        if !self.form.can_submit() || !self.scripts.push(self.form.text()) {
            return false;
        }
        self.form.clear();
        true
    }

    /// Feed a key to the script form, submitting on a plain Enter
    pub fn form_key(&mut self, key: &KeyEvent) -> FormAction {
        let action = self.form.handle_key(key);
        if action == FormAction::Submit {
            self.submit();
        }
        action
    }

    /// Remove the script at `index`
    pub fn remove_script(&mut self, index: usize) -> bool {
        if self.is_speaking() {
            debug!("Delete ignored while speaking");
            return false;
        }
        self.scripts.remove(index).is_some()
    }

    /// Remove the highlighted script
    pub fn remove_selected(&mut self) -> bool {
        self.remove_script(self.scripts.cursor())
    }

    pub fn select_voice(&mut self, index: usize) -> bool {
        !self.is_speaking() && self.voices.select(index)
    }

    pub fn next_voice(&mut self) -> bool {
        !self.is_speaking() && self.voices.next()
    }

    pub fn previous_voice(&mut self) -> bool {
        !self.is_speaking() && self.voices.previous()
    }

    /// Set the interval from raw user input (see [`parse_interval`])
    pub fn set_interval(&mut self, input: &str) -> bool {
        if self.is_speaking() {
            debug!("Interval change ignored while speaking");
            return false;
        }
        self.interval = parse_interval(input);
        info!("Interval set to {}s", self.interval);
        true
    }

    /// Append clipboard text to the form
    pub fn paste_clipboard(&mut self) -> Result<()> {
        let text = crate::clipboard::get_from_clipboard()?;
        self.form.insert_str(&text);
        Ok(())
    }

    // ========== Playback ==========

    /// Start reading the scripts aloud
    ///
    /// No-op when there are no scripts or a run is already active.
    pub fn start(&mut self) -> Result<bool> {
        let voice = self.voices.selected_voice().cloned();
        let started = self.playback.start(
            self.scripts.texts(),
            voice,
            Duration::from_secs(u64::from(self.interval)),
            self.speech.as_mut(),
        )?;
        if started {
            self.status = None;
        }
        Ok(started)
    }

    /// Cancel the current run, if any
    pub fn stop(&mut self) -> Result<bool> {
        self.playback.stop(self.speech.as_mut())
    }

    /// Process speech notifications and expired pauses
    ///
    /// Called on every pass of the event loop. Returns whether anything
    /// visible may have changed.
    pub fn pump(&mut self, now: Instant) -> bool {
        let events = self.speech.poll_events();
        let mut changed = !events.is_empty();
        for event in events {
            if event == SpeechEvent::VoicesChanged {
                self.refresh_voices();
            }
            self.playback.handle_event(&event, now);
        }

        match self.playback.tick(now, self.speech.as_mut()) {
            Ok(Some(Progress::Advanced(index))) => {
                debug!("Reading script {}", index + 1);
                changed = true;
            }
            Ok(Some(Progress::Finished)) => {
                self.status = Some("Finished".to_string());
                changed = true;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Playback aborted: {}", e);
                self.status = Some(format!("Playback aborted: {}", e));
                changed = true;
            }
        }
        changed
    }

    /// How long the event loop may block before the next pump is due
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.playback
            .next_deadline(now)
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL))
    }
}

impl Drop for State {
    fn drop(&mut self) {
        // Tearing down mid-run silences the engine
        if let Err(e) = self.playback.stop(self.speech.as_mut()) {
            warn!("Failed to stop playback on exit: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("30"), 30);
        assert_eq!(parse_interval("1a2"), 12);
        assert_eq!(parse_interval(""), 0);
        assert_eq!(parse_interval("abc"), 0);
        assert_eq!(parse_interval("12345"), 123);
        assert_eq!(parse_interval(" 007 "), 7);
    }
}
