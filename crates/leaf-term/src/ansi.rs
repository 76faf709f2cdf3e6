// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — that's the compositor's job. This module
// just knows the byte-level encoding of every terminal command we need.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).

use std::io::{self, Write};

// ─── Color ──────────────────────────────────────────────────────────────────

/// A foreground color for rendered text.
///
/// `Default` is the terminal's configured foreground. `Ansi(n)` is one of
/// the 16 standard SGR colors (0–7 normal, 8–15 bright), which adapt to the
/// user's terminal palette instead of imposing our own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Terminal default foreground (SGR 39).
    Default,
    /// Standard palette index 0–15 (SGR 30–37 / 90–97).
    Ansi(u8),
}

// ─── Cursor ─────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ─────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear from the cursor to the end of the current line (EL 0).
///
/// The compositor ends every frame row with this instead of padding with
/// spaces, so stale cells from the previous frame never survive.
#[inline]
pub fn clear_line_right(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
///
/// This clears **everything**: colors, inverse video, the lot. Callers
/// tracking a "current color" must invalidate it after this.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[m")
}

// ─── Foreground Color ───────────────────────────────────────────────────────

/// Set the foreground (text) color.
///
/// Uses compact SGR codes for the standard palette (30–37, 90–97). Indices
/// above 15 are not produced by the highlighter and fall back to default.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[39m"),
        Color::Ansi(idx) if idx < 8 => write!(w, "\x1b[{}m", 30 + u16::from(idx)),
        Color::Ansi(idx) if idx < 16 => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
        Color::Ansi(_) => w.write_all(b"\x1b[39m"),
    }
}

// ─── Inverse Video ──────────────────────────────────────────────────────────

/// Enable inverse video (SGR 7). Used for the status line, control-byte
/// glyphs, and search-match overlays.
#[inline]
pub fn inverse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[7m")
}

// ─── Tests ──────────────────────────────────────────────────────────────────
