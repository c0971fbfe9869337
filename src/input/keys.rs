//! Terminal input decoding
//!
//! Turns raw bytes from a raw-mode terminal into key events. Text keys become
//! characters for the script form; escape and control sequences are passed on
//! whole so the keymap can resolve them. Bracketed paste is tracked so that a
//! newline inside pasted text is reported as part of a composition and does
//! not submit the form.

use log::debug;
use std::time::{Duration, Instant};

const ESC: u8 = 0x1b;

/// How long a trailing ESC waits for the rest of its sequence before it
/// counts as the Escape key
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(50);

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

/// Shift+Enter as sent with the kitty keyboard protocol
const SHIFT_ENTER_KITTY: &[u8] = b"\x1b[13;2u";
/// Shift+Enter as sent with xterm modifyOtherKeys
const SHIFT_ENTER_XTERM: &[u8] = b"\x1b[27;2;13~";

/// A decoded key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// Printable text
    Char(char),
    /// Enter, with Shift held and/or arriving inside a paste
    Enter { shift: bool, composing: bool },
    Backspace,
    /// Escape, control or Alt sequence, resolved through the keymap
    Sequence(Vec<u8>),
}

/// Stateful decoder for raw terminal input
#[derive(Debug, Default)]
pub struct KeyDecoder {
    /// Inside a bracketed paste
    pasting: bool,
    /// Incomplete sequence carried over from the previous read
    pending: Vec<u8>,
    /// When the carried-over bytes first arrived
    pending_since: Option<Instant>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a bracketed paste is in progress
    pub fn is_pasting(&self) -> bool {
        self.pasting
    }

    /// Whether bytes are held back waiting for the rest of a sequence
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Give up on a held-back sequence once [`ESCAPE_TIMEOUT`] has passed
    ///
    /// A lone ESC becomes the Escape key. A partial escape sequence is
    /// reported as is and left for the keymap to ignore. Partial UTF-8 is
    /// dropped.
    pub fn flush_expired(&mut self, now: Instant) -> Vec<KeyEvent> {
        match self.pending_since {
            Some(since) if now.duration_since(since) >= ESCAPE_TIMEOUT => {}
            _ => return Vec::new(),
        }
        self.pending_since = None;
        let stale = std::mem::take(&mut self.pending);
        if stale.first() == Some(&ESC) && !self.pasting {
            vec![KeyEvent::Sequence(stale)]
        } else {
            debug!("Dropping incomplete input {:?}", stale);
            Vec::new()
        }
    }

    /// Decode one read's worth of bytes
    pub fn feed(&mut self, input: &[u8]) -> Vec<KeyEvent> {
        let mut buf = std::mem::take(&mut self.pending);
        let carried = !buf.is_empty();
        buf.extend_from_slice(input);

        let mut events = Vec::new();
        let mut i = 0;
        while i < buf.len() {
            let b = buf[i];
            let consumed = match b {
                ESC => match self.decode_escape(&buf[i..], &mut events) {
                    Some(n) => n,
                    None => {
                        self.pending = buf[i..].to_vec();
                        break;
                    }
                },
                b'\r' | b'\n' => {
                    events.push(KeyEvent::Enter {
                        shift: false,
                        composing: self.pasting,
                    });
                    if b == b'\r' && buf.get(i + 1) == Some(&b'\n') {
                        2
                    } else {
                        1
                    }
                }
                0x08 | 0x7f => {
                    if !self.pasting {
                        events.push(KeyEvent::Backspace);
                    }
                    1
                }
                0x00..=0x1f => {
                    if !self.pasting {
                        events.push(KeyEvent::Sequence(vec![b]));
                    }
                    1
                }
                _ => match decode_utf8(&buf[i..]) {
                    Utf8::Char(ch, n) => {
                        events.push(KeyEvent::Char(ch));
                        n
                    }
                    Utf8::Incomplete => {
                        self.pending = buf[i..].to_vec();
                        break;
                    }
                    Utf8::Invalid => {
                        debug!("Skipping invalid UTF-8 byte {:#04x}", b);
                        1
                    }
                },
            };
            i += consumed;
        }

        if self.pending.is_empty() {
            self.pending_since = None;
        } else if !carried || self.pending_since.is_none() {
            self.pending_since = Some(Instant::now());
        }
        events
    }

    /// Decode an escape sequence at the start of `buf`
    ///
    /// Returns the number of bytes consumed, or `None` if the sequence is
    /// still incomplete.
    fn decode_escape(&mut self, buf: &[u8], events: &mut Vec<KeyEvent>) -> Option<usize> {
        // ESC may be the start of a sequence split across reads
        let &next = buf.get(1)?;

        match next {
            b'[' => {
                let len = csi_len(buf)?;
                let seq = &buf[..len];
                if seq == PASTE_START {
                    debug!("Paste started");
                    self.pasting = true;
                } else if seq == PASTE_END {
                    debug!("Paste ended");
                    self.pasting = false;
                } else if seq == SHIFT_ENTER_KITTY || seq == SHIFT_ENTER_XTERM {
                    events.push(KeyEvent::Enter {
                        shift: true,
                        composing: self.pasting,
                    });
                } else if !self.pasting {
                    events.push(KeyEvent::Sequence(seq.to_vec()));
                }
                Some(len)
            }
            b'O' => {
                let seq = buf.get(..3)?;
                if !self.pasting {
                    events.push(KeyEvent::Sequence(seq.to_vec()));
                }
                Some(3)
            }
            ESC => {
                if !self.pasting {
                    events.push(KeyEvent::Sequence(vec![ESC]));
                }
                Some(1)
            }
            _ => {
                // Alt+key, where the key may be a multi-byte character
                let len = match decode_utf8(&buf[1..]) {
                    Utf8::Char(_, n) => 1 + n,
                    Utf8::Incomplete => return None,
                    Utf8::Invalid => 2,
                };
                if !self.pasting {
                    events.push(KeyEvent::Sequence(buf[..len].to_vec()));
                }
                Some(len)
            }
        }
    }
}

/// Length of the CSI sequence at the start of `buf`, if complete
fn csi_len(buf: &[u8]) -> Option<usize> {
    buf.get(2..)?
        .iter()
        .position(|b| (0x40..=0x7e).contains(b))
        .map(|pos| pos + 3)
}

enum Utf8 {
    Char(char, usize),
    Incomplete,
    Invalid,
}

fn decode_utf8(buf: &[u8]) -> Utf8 {
    let len = match buf[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Utf8::Invalid,
    };
    if buf.len() < len {
        return Utf8::Incomplete;
    }
    match std::str::from_utf8(&buf[..len]) {
        Ok(s) => s.chars().next().map_or(Utf8::Invalid, |ch| Utf8::Char(ch, len)),
        Err(_) => Utf8::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_enter() -> KeyEvent {
        KeyEvent::Enter {
            shift: false,
            composing: false,
        }
    }

    #[test]
    fn test_text_and_enter() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(b"hi\r");
        assert_eq!(
            events,
            vec![KeyEvent::Char('h'), KeyEvent::Char('i'), plain_enter()]
        );
    }

    #[test]
    fn test_shift_enter_encodings() {
        let mut decoder = KeyDecoder::new();
        let shifted = KeyEvent::Enter {
            shift: true,
            composing: false,
        };
        assert_eq!(decoder.feed(SHIFT_ENTER_KITTY), vec![shifted.clone()]);
        assert_eq!(decoder.feed(SHIFT_ENTER_XTERM), vec![shifted]);
    }

    #[test]
    fn test_paste_is_composing() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(b"\x1b[200~a\r\nb\x1b[201~\r");
        assert_eq!(
            events,
            vec![
                KeyEvent::Char('a'),
                KeyEvent::Enter {
                    shift: false,
                    composing: true
                },
                KeyEvent::Char('b'),
                plain_enter(),
            ]
        );
        assert!(!decoder.is_pasting());
    }

    #[test]
    fn test_split_utf8() {
        let mut decoder = KeyDecoder::new();
        let bytes = "é".as_bytes();
        assert!(decoder.feed(&bytes[..1]).is_empty());
        assert_eq!(decoder.feed(&bytes[1..]), vec![KeyEvent::Char('é')]);
    }

    #[test]
    fn test_split_csi() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed(b"\x1b[2").is_empty());
        assert_eq!(
            decoder.feed(b"00~x\x1b[201~"),
            vec![KeyEvent::Char('x')]
        );
    }

    #[test]
    fn test_alt_and_control() {
        let mut decoder = KeyDecoder::new();
        assert_eq!(
            decoder.feed(b"\x1bs"),
            vec![KeyEvent::Sequence(b"\x1bs".to_vec())]
        );
        assert_eq!(decoder.feed(b"\x03"), vec![KeyEvent::Sequence(vec![3])]);
        assert_eq!(decoder.feed(b"\x7f"), vec![KeyEvent::Backspace]);
        assert_eq!(
            decoder.feed(b"\x1b[A"),
            vec![KeyEvent::Sequence(b"\x1b[A".to_vec())]
        );
        assert_eq!(
            decoder.feed("\x1bé".as_bytes()),
            vec![KeyEvent::Sequence("\x1bé".as_bytes().to_vec())]
        );
    }

    #[test]
    fn test_escape_split_from_its_sequence() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert!(decoder.has_pending());
        assert_eq!(
            decoder.feed(b"[A"),
            vec![KeyEvent::Sequence(b"\x1b[A".to_vec())]
        );

        assert!(decoder.feed(b"\x1bO").is_empty());
        assert_eq!(
            decoder.feed(b"A"),
            vec![KeyEvent::Sequence(b"\x1bOA".to_vec())]
        );
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_lone_escape_after_timeout() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert!(decoder.flush_expired(Instant::now()).is_empty());
        assert_eq!(
            decoder.flush_expired(Instant::now() + ESCAPE_TIMEOUT),
            vec![KeyEvent::Sequence(vec![ESC])]
        );
        assert!(!decoder.has_pending());
        assert_eq!(decoder.feed(b"a"), vec![KeyEvent::Char('a')]);
    }

    #[test]
    fn test_alt_with_split_multibyte_char() {
        let mut decoder = KeyDecoder::new();
        let bytes = "\x1bé".as_bytes();
        assert!(decoder.feed(&bytes[..2]).is_empty());
        assert_eq!(
            decoder.feed(&bytes[2..]),
            vec![KeyEvent::Sequence(bytes.to_vec())]
        );
    }
}
