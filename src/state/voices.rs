//! Voice selection
//!
//! Holds the voices the speech service reported and which one is selected.
//! The list is replaced wholesale on every refresh.

use crate::speech::Voice;
use log::debug;

#[derive(Debug, Default)]
pub struct VoiceSelector {
    voices: Vec<Voice>,
    selected: Option<usize>,
    /// Configured voice name to prefer over the platform default
    preferred: Option<String>,
}

impl VoiceSelector {
    pub fn new(preferred: Option<String>) -> Self {
        Self {
            voices: Vec::new(),
            selected: None,
            preferred,
        }
    }

    /// Replace the voice list
    ///
    /// Keeps the current voice selected if it is still offered, otherwise picks
    /// the default: the preferred name, then the platform default, then the first voice.
    pub fn refresh(&mut self, voices: Vec<Voice>) {
        let previous = self.selected_voice().map(|v| v.id.clone());
        self.voices = voices;

        self.selected = previous
            .and_then(|id| self.voices.iter().position(|v| v.id == id))
            .or_else(|| self.default_index());
        debug!(
            "Voice list refreshed: {} voices, selected {:?}",
            self.voices.len(),
            self.selected
        );
    }

    fn default_index(&self) -> Option<usize> {
        if self.voices.is_empty() {
            return None;
        }
        let by_name = self.preferred.as_ref().and_then(|name| {
            let name = name.to_lowercase();
            self.voices
                .iter()
                .position(|v| v.name.to_lowercase().contains(&name))
        });
        by_name
            .or_else(|| self.voices.iter().position(|v| v.default))
            .or(Some(0))
    }

    /// Select the voice at `index`; returns false if out of range
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.voices.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    /// Select the following voice, wrapping at the end
    pub fn next(&mut self) -> bool {
        let len = self.voices.len();
        if len == 0 {
            return false;
        }
        self.selected = Some(self.selected.map_or(0, |i| (i + 1) % len));
        true
    }

    /// Select the preceding voice, wrapping at the start
    pub fn previous(&mut self) -> bool {
        let len = self.voices.len();
        if len == 0 {
            return false;
        }
        self.selected = Some(self.selected.map_or(0, |i| (i + len - 1) % len));
        true
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_voice(&self) -> Option<&Voice> {
        self.selected.and_then(|i| self.voices.get(i))
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn label(&self, index: usize) -> Option<String> {
        self.voices.get(index).map(Voice::label)
    }
}
