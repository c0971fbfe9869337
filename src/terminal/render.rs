//! Screen drawing
//!
//! The whole screen is redrawn from [`State`] after every input or playback
//! step. Lines are cut to the terminal width by display width so wide
//! characters never wrap.

use crate::state::State;
use std::io::{self, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Input lines shown before older ones scroll off
const INPUT_LINES: usize = 4;

const HELP: &str =
    "alt+s start  alt+x stop  alt+v/V voice  alt+i interval  up/down+alt+d delete  alt+p paste  alt+q quit";

/// Cut `text` to at most `width` display columns
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    if width > 0 {
        out.push('…');
    }
    out
}

/// Build the screen contents, one string per row
pub fn render_lines(state: &State, cols: u16, rows: u16) -> Vec<String> {
    let width = cols as usize;
    let speaking = state.is_speaking();
    let locked = if speaking { "  [locked]" } else { "" };

    let mut top = Vec::new();
    let status = match state.progress() {
        Some((index, len)) => format!("[Speaking {}/{}]", index + 1, len),
        None => "[Idle]".to_string(),
    };
    top.push(format!("{} {}  {}", crate::APP_NAME, crate::VERSION, status));

    let voice = match state.voices.selected() {
        Some(i) => format!(
            "Voice: {} ({}/{}){}",
            state.voices.label(i).unwrap_or_default(),
            i + 1,
            state.voices.voices().len(),
            locked
        ),
        None => "Voice: (none available)".to_string(),
    };
    top.push(voice);
    top.push(format!("Interval: {}s{}", state.interval(), locked));
    top.push(String::new());

    match state.handlers.prompt() {
        Some(prompt) => top.push(prompt),
        None => {
            let hint = if state.form.can_submit() {
                "enter adds, shift+enter for a new line"
            } else {
                "type some text to add"
            };
            top.push(format!("Script ({}):", hint));
            let lines: Vec<&str> = state.form.text().split('\n').collect();
            let skip = lines.len().saturating_sub(INPUT_LINES);
            for line in &lines[skip..] {
                top.push(format!("> {}", line));
            }
        }
    }
    top.push(String::new());

    let mut bottom = vec![HELP.to_string()];
    if let Some(message) = &state.status {
        bottom.push(message.clone());
    }

    // Script list gets whatever rows remain
    let room = (rows as usize).saturating_sub(top.len() + bottom.len() + 2);
    let mut list = Vec::new();
    if !state.scripts.is_empty() {
        list.push(format!("Scripts ({}):", state.scripts.len()));
        let focus = state
            .progress()
            .map_or(state.scripts.cursor(), |(index, _)| index);
        let first = (focus + 1).saturating_sub(room.max(1));
        for (i, script) in state.scripts.iter().enumerate().skip(first).take(room) {
            let marker = match (speaking, i == focus) {
                (true, true) => '*',
                (false, true) => '>',
                _ => ' ',
            };
            let text = script.text().replace('\n', " ");
            list.push(format!("{} {}. {}", marker, i + 1, text));
        }
    }

    top.into_iter()
        .chain(list)
        .chain(std::iter::once(String::new()))
        .chain(bottom)
        .take(rows as usize)
        .map(|line| fit(&line, width))
        .collect()
}

/// Redraw the whole screen
pub fn draw(out: &mut impl Write, state: &State, cols: u16, rows: u16) -> io::Result<()> {
    let lines = render_lines(state, cols, rows);
    out.write_all(b"\x1b[H\x1b[2J")?;
    out.write_all(lines.join("\r\n").as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_short_text() {
        assert_eq!(fit("hello", 10), "hello");
    }

    #[test]
    fn test_fit_truncates_by_width() {
        assert_eq!(fit("hello world", 6), "hello…");
        // Each CJK character is two columns wide
        assert_eq!(fit("世界世界", 5), "世界…");
    }
}
