// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into logical key events. Handles:
//
// - C0 control bytes (Enter, Tab, Backspace, Ctrl-letter)
// - Legacy CSI sequences (arrows, Home/End, Delete, PageUp/PageDown)
// - SS3 sequences (ESC O H/F and application-mode arrows)
// - Lone Escape (distinguished from sequences by a read timeout)
//
// # Design
//
// The parser maintains a small internal byte buffer because escape
// sequences can span multiple `read()` calls. Feed bytes with
// [`Parser::advance`], retrieve keys from the returned `Vec`. After a
// read timeout with no new bytes, call [`Parser::flush`] to emit any
// pending lone ESC as a real Escape keypress.
//
// CSI parameters are parsed directly on `&[u8]` — no intermediate
// `String` allocation.
//
// Everything beyond this vocabulary (mouse, function keys, modifier
// reporting) is deliberately out: the editor core consumes exactly the
// keys below and nothing else.

// ─── Key ────────────────────────────────────────────────────────────────────

/// A logical key event.
///
/// Printable input is delivered as the raw byte — the editor's column
/// arithmetic is byte-indexed, so bytes stay opaque all the way through.
/// Ctrl-modified letters carry the lowercase letter byte (`Ctrl(b'q')`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable (or opaque high-bit) byte to insert.
    Char(u8),
    /// Ctrl plus a letter, identified by the lowercase letter byte.
    Ctrl(u8),
    Enter,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Escape byte (`0x1b`) — the start of every sequence and a key by itself.
const ESC: u8 = 0x1b;

/// Incremental key parser over raw terminal bytes.
///
/// ```
/// use leaf_term::input::{Key, Parser};
///
/// let mut parser = Parser::new();
/// assert_eq!(parser.advance(b"a"), vec![Key::Char(b'a')]);
/// assert_eq!(parser.advance(b"\x1b[A"), vec![Key::Up]);
///
/// // A lone ESC stays pending until the read timeout...
/// assert!(parser.advance(b"\x1b").is_empty());
/// // ...at which point flush() resolves it.
/// assert_eq!(parser.flush(), Some(Key::Escape));
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    /// Bytes received but not yet parsed into a complete key.
    buf: Vec<u8>,
}

impl Parser {
    /// Create an empty parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed raw bytes, returning every key completed by them.
    ///
    /// An escape sequence split across reads stays buffered until its
    /// final byte arrives.
    pub fn advance(&mut self, bytes: &[u8]) -> Vec<Key> {
        self.buf.extend_from_slice(bytes);

        let mut keys = Vec::new();
        loop {
            match self.parse_one() {
                Parsed::Key(key, consumed) => {
                    self.buf.drain(..consumed);
                    keys.push(key);
                }
                Parsed::Skip(consumed) => {
                    self.buf.drain(..consumed);
                }
                Parsed::Incomplete => break,
            }
        }
        keys
    }

    /// Resolve a pending lone ESC after a read timeout.
    ///
    /// If the buffer holds an unfinished escape sequence, it is discarded —
    /// the terminal stopped mid-sequence, and replaying its prefix as typed
    /// characters would corrupt the buffer being edited.
    pub fn flush(&mut self) -> Option<Key> {
        if self.buf.is_empty() {
            return None;
        }
        let was_escape = self.buf[0] == ESC;
        self.buf.clear();
        was_escape.then_some(Key::Escape)
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    // ── Decoding ────────────────────────────────────────────────────

    /// Try to decode one key from the front of the buffer.
    fn parse_one(&self) -> Parsed {
        let Some(&first) = self.buf.first() else {
            return Parsed::Incomplete;
        };

        if first != ESC {
            return Self::parse_plain(first);
        }

        match self.buf.get(1) {
            // Lone ESC so far — wait for the timeout to tell us whether
            // more sequence bytes are coming.
            None => Parsed::Incomplete,
            Some(b'[') => self.parse_csi(),
            Some(b'O') => self.parse_ss3(),
            // ESC followed by an unrelated byte: emit Escape, leave the
            // byte for the next round.
            Some(_) => Parsed::Key(Key::Escape, 1),
        }
    }

    /// Decode a single non-escape byte.
    fn parse_plain(byte: u8) -> Parsed {
        let key = match byte {
            b'\r' | b'\n' => Key::Enter,
            0x7f => Key::Backspace,
            b'\t' => Key::Char(b'\t'),
            // Remaining C0 controls are Ctrl-letter chords.
            1..=26 => Key::Ctrl(byte - 1 + b'a'),
            0 | 28..=31 => return Parsed::Skip(1),
            // Printable ASCII and opaque high-bit bytes both insert as-is.
            _ => Key::Char(byte),
        };
        Parsed::Key(key, 1)
    }

    /// Decode a CSI sequence: `ESC [ params final`.
    fn parse_csi(&self) -> Parsed {
        // Find the final byte (0x40..=0x7e ends a CSI sequence).
        let Some(rel) = self.buf[2..].iter().position(|b| (0x40..=0x7e).contains(b)) else {
            return Parsed::Incomplete;
        };
        let final_idx = 2 + rel;
        let final_byte = self.buf[final_idx];
        let consumed = final_idx + 1;

        let key = match final_byte {
            b'A' => Some(Key::Up),
            b'B' => Some(Key::Down),
            b'C' => Some(Key::Right),
            b'D' => Some(Key::Left),
            b'H' => Some(Key::Home),
            b'F' => Some(Key::End),
            b'~' => match parse_number(&self.buf[2..final_idx]) {
                Some(1 | 7) => Some(Key::Home),
                Some(3) => Some(Key::Delete),
                Some(4 | 8) => Some(Key::End),
                Some(5) => Some(Key::PageUp),
                Some(6) => Some(Key::PageDown),
                _ => None,
            },
            _ => None,
        };

        match key {
            Some(key) => Parsed::Key(key, consumed),
            None => Parsed::Skip(consumed),
        }
    }

    /// Decode an SS3 sequence: `ESC O final` (application cursor mode,
    /// and Home/End from some terminals).
    fn parse_ss3(&self) -> Parsed {
        let Some(&final_byte) = self.buf.get(2) else {
            return Parsed::Incomplete;
        };

        let key = match final_byte {
            b'A' => Some(Key::Up),
            b'B' => Some(Key::Down),
            b'C' => Some(Key::Right),
            b'D' => Some(Key::Left),
            b'H' => Some(Key::Home),
            b'F' => Some(Key::End),
            _ => None,
        };

        match key {
            Some(key) => Parsed::Key(key, 3),
            None => Parsed::Skip(3),
        }
    }
}

/// Outcome of one decoding attempt.
enum Parsed {
    /// A complete key, consuming this many buffered bytes.
    Key(Key, usize),
    /// A recognized but unsupported sequence — consume and drop it.
    Skip(usize),
    /// Not enough bytes yet.
    Incomplete,
}

/// Parse the leading decimal number of a CSI parameter slice.
///
/// Stops at the first non-digit (`;` starts a modifier parameter we don't
/// use). Returns `None` for an empty or non-numeric prefix.
fn parse_number(bytes: &[u8]) -> Option<u16> {
    let mut value: u16 = 0;
    let mut any = false;
    for &b in bytes {
        if b.is_ascii_digit() {
            value = value.wrapping_mul(10).wrapping_add(u16::from(b - b'0'));
            any = true;
        } else {
            break;
        }
    }
    any.then_some(value)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(bytes: &[u8]) -> Vec<Key> {
        Parser::new().advance(bytes)
    }

    // ── Plain bytes ──────────────────────────────────────────────────

    #[test]
    fn printable_ascii() {
        assert_eq!(keys(b"a"), vec![Key::Char(b'a')]);
        assert_eq!(keys(b"Z"), vec![Key::Char(b'Z')]);
        assert_eq!(keys(b" "), vec![Key::Char(b' ')]);
        assert_eq!(keys(b"~"), vec![Key::Char(b'~')]);
    }

    #[test]
    fn multiple_printables_in_one_read() {
        assert_eq!(
            keys(b"hi!"),
            vec![Key::Char(b'h'), Key::Char(b'i'), Key::Char(b'!')]
        );
    }

    #[test]
    fn high_bit_bytes_stay_opaque() {
        assert_eq!(keys(&[0xc3, 0xa9]), vec![Key::Char(0xc3), Key::Char(0xa9)]);
    }

    #[test]
    fn enter_from_cr_and_lf() {
        assert_eq!(keys(b"\r"), vec![Key::Enter]);
        assert_eq!(keys(b"\n"), vec![Key::Enter]);
    }

    #[test]
    fn backspace_is_del_byte() {
        assert_eq!(keys(&[0x7f]), vec![Key::Backspace]);
    }

    #[test]
    fn tab_is_a_character() {
        assert_eq!(keys(b"\t"), vec![Key::Char(b'\t')]);
    }

    #[test]
    fn ctrl_letters() {
        assert_eq!(keys(&[0x11]), vec![Key::Ctrl(b'q')]); // Ctrl-Q
        assert_eq!(keys(&[0x13]), vec![Key::Ctrl(b's')]); // Ctrl-S
        assert_eq!(keys(&[0x06]), vec![Key::Ctrl(b'f')]); // Ctrl-F
        assert_eq!(keys(&[0x08]), vec![Key::Ctrl(b'h')]); // Ctrl-H
    }

    #[test]
    fn nul_and_fs_range_dropped() {
        assert_eq!(keys(&[0x00, 0x1c, 0x1f]), vec![]);
    }

    // ── CSI sequences ────────────────────────────────────────────────

    #[test]
    fn arrow_keys() {
        assert_eq!(keys(b"\x1b[A"), vec![Key::Up]);
        assert_eq!(keys(b"\x1b[B"), vec![Key::Down]);
        assert_eq!(keys(b"\x1b[C"), vec![Key::Right]);
        assert_eq!(keys(b"\x1b[D"), vec![Key::Left]);
    }

    #[test]
    fn home_end_letter_finals() {
        assert_eq!(keys(b"\x1b[H"), vec![Key::Home]);
        assert_eq!(keys(b"\x1b[F"), vec![Key::End]);
    }

    #[test]
    fn tilde_finals() {
        assert_eq!(keys(b"\x1b[1~"), vec![Key::Home]);
        assert_eq!(keys(b"\x1b[3~"), vec![Key::Delete]);
        assert_eq!(keys(b"\x1b[4~"), vec![Key::End]);
        assert_eq!(keys(b"\x1b[5~"), vec![Key::PageUp]);
        assert_eq!(keys(b"\x1b[6~"), vec![Key::PageDown]);
        assert_eq!(keys(b"\x1b[7~"), vec![Key::Home]);
        assert_eq!(keys(b"\x1b[8~"), vec![Key::End]);
    }

    #[test]
    fn unknown_tilde_number_dropped() {
        assert_eq!(keys(b"\x1b[19~"), vec![]);
    }

    #[test]
    fn unknown_csi_final_dropped() {
        assert_eq!(keys(b"\x1b[5Z"), vec![]);
    }

    #[test]
    fn modifier_params_ignored() {
        // "\x1b[1;5A" is Ctrl+Up on many terminals — we keep the base key.
        assert_eq!(keys(b"\x1b[1;5A"), vec![Key::Up]);
    }

    // ── SS3 sequences ────────────────────────────────────────────────

    #[test]
    fn ss3_home_end() {
        assert_eq!(keys(b"\x1bOH"), vec![Key::Home]);
        assert_eq!(keys(b"\x1bOF"), vec![Key::End]);
    }

    #[test]
    fn ss3_application_arrows() {
        assert_eq!(keys(b"\x1bOA"), vec![Key::Up]);
        assert_eq!(keys(b"\x1bOD"), vec![Key::Left]);
    }

    #[test]
    fn ss3_unknown_dropped() {
        assert_eq!(keys(b"\x1bOP"), vec![]); // F1 — not in our vocabulary
    }

    // ── Split sequences ──────────────────────────────────────────────

    #[test]
    fn sequence_split_across_reads() {
        let mut parser = Parser::new();
        assert_eq!(parser.advance(b"\x1b"), vec![]);
        assert!(parser.has_pending());
        assert_eq!(parser.advance(b"["), vec![]);
        assert_eq!(parser.advance(b"A"), vec![Key::Up]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn keys_after_sequence_in_same_read() {
        assert_eq!(keys(b"\x1b[Ax"), vec![Key::Up, Key::Char(b'x')]);
    }

    // ── Escape handling ──────────────────────────────────────────────

    #[test]
    fn lone_esc_waits_for_flush() {
        let mut parser = Parser::new();
        assert_eq!(parser.advance(b"\x1b"), vec![]);
        assert_eq!(parser.flush(), Some(Key::Escape));
        assert!(!parser.has_pending());
    }

    #[test]
    fn flush_on_empty_is_none() {
        let mut parser = Parser::new();
        assert_eq!(parser.flush(), None);
    }

    #[test]
    fn flush_discards_incomplete_sequence() {
        let mut parser = Parser::new();
        assert_eq!(parser.advance(b"\x1b["), vec![]);
        // The prefix was an escape, so the user sees Escape, not garbage.
        assert_eq!(parser.flush(), Some(Key::Escape));
        assert!(!parser.has_pending());
    }

    #[test]
    fn esc_before_unrelated_byte() {
        // ESC then 'q' (no [ or O): Escape fires, 'q' parses normally.
        assert_eq!(keys(b"\x1bq"), vec![Key::Escape, Key::Char(b'q')]);
    }

    #[test]
    fn double_escape() {
        let mut parser = Parser::new();
        // First ESC resolves once the second proves it wasn't a sequence;
        // the second stays pending.
        assert_eq!(parser.advance(b"\x1b\x1b"), vec![Key::Escape]);
        assert_eq!(parser.flush(), Some(Key::Escape));
    }

    // ── Parameter parsing ────────────────────────────────────────────

    #[test]
    fn number_parsing() {
        assert_eq!(parse_number(b"5"), Some(5));
        assert_eq!(parse_number(b"15"), Some(15));
        assert_eq!(parse_number(b"1;5"), Some(1));
        assert_eq!(parse_number(b""), None);
        assert_eq!(parse_number(b";5"), None);
    }
}
