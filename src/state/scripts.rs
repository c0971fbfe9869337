//! The ordered list of scripts waiting to be read aloud

use log::debug;
use std::time::SystemTime;

/// Longest script accepted, in characters
pub const MAX_SCRIPT_CHARS: usize = 500;

/// A unit of text queued for playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    text: String,
    created_at: SystemTime,
}

impl Script {
    /// Create a script, truncating `text` to [`MAX_SCRIPT_CHARS`]
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().take(MAX_SCRIPT_CHARS).collect(),
            created_at: SystemTime::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// When the script was added
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

/// Scripts in insertion order with a cursor marking the delete target
///
/// This type does not know about playback; callers gate mutation on the
/// playback state.
#[derive(Debug, Default)]
pub struct ScriptList {
    scripts: Vec<Script>,
    cursor: usize,
}

impl ScriptList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a script built from `text`
    ///
    /// Empty or whitespace-only text is ignored. Returns whether a script was added.
    pub fn push(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.scripts.push(Script::new(text));
        debug!("Added script {} ({} chars)", self.scripts.len(), text.chars().count());
        true
    }

    /// Remove the script at `index`, keeping the order of the rest
    pub fn remove(&mut self, index: usize) -> Option<Script> {
        if index >= self.scripts.len() {
            return None;
        }
        let removed = self.scripts.remove(index);
        self.clamp_cursor();
        debug!(
            "Removed script {} (added {:?} ago)",
            index + 1,
            removed.created_at().elapsed().unwrap_or_default()
        );
        Some(removed)
    }

    pub fn get(&self, index: usize) -> Option<&Script> {
        self.scripts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Script> {
        self.scripts.iter()
    }

    /// Texts in order, as handed to playback
    pub fn texts(&self) -> Vec<String> {
        self.scripts.iter().map(|s| s.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Index of the highlighted script
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.scripts.len() {
            self.cursor += 1;
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.scripts.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(list: &ScriptList) -> Vec<&str> {
        list.iter().map(Script::text).collect()
    }

    #[test]
    fn test_push_preserves_order() {
        let mut list = ScriptList::new();
        assert!(list.push("one"));
        assert!(list.push("two"));
        assert!(list.push("three"));
        assert_eq!(texts(&list), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_push_blank_ignored() {
        let mut list = ScriptList::new();
        assert!(!list.push(""));
        assert!(!list.push("   \n\t"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_truncates_long_text() {
        let mut list = ScriptList::new();
        let long = "é".repeat(MAX_SCRIPT_CHARS + 20);
        list.push(&long);
        assert_eq!(list.get(0).unwrap().text().chars().count(), MAX_SCRIPT_CHARS);
    }

    #[test]
    fn test_remove_middle() {
        let mut list = ScriptList::new();
        for t in ["a", "b", "c", "d"] {
            list.push(t);
        }
        let removed = list.remove(1).unwrap();
        assert_eq!(removed.text(), "b");
        assert!(removed.created_at() <= SystemTime::now());
        assert_eq!(texts(&list), vec!["a", "c", "d"]);
        assert!(list.remove(3).is_none());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_cursor_clamped_after_remove() {
        let mut list = ScriptList::new();
        for t in ["a", "b", "c"] {
            list.push(t);
        }
        list.cursor_down();
        list.cursor_down();
        list.cursor_down();
        assert_eq!(list.cursor(), 2);

        list.remove(2);
        assert_eq!(list.cursor(), 1);
        list.remove(0);
        list.remove(0);
        assert_eq!(list.cursor(), 0);
        list.cursor_up();
        assert_eq!(list.cursor(), 0);
    }
}
