//! Frame composition: one complete screen repaint as a single byte run.
//!
//! Every frame is rebuilt from scratch into an [`OutputBuffer`] and
//! flushed with one `write` to stdout, so a slow terminal never shows a
//! half-painted screen. The layout is fixed: `rows - 2` text rows, one
//! inverse-video status line, one message line.
//!
//! Flicker is avoided without clearing the whole screen: the cursor is
//! hidden during the repaint, each line is erased to the right after its
//! content, and the cursor is shown again at its final position.

use std::io;
use std::time::{Duration, Instant};

use leaf_term::ansi::{self, Color};
use leaf_term::{OutputBuffer, Size};

use crate::cursor::Cursor;
use crate::document::Document;
use crate::viewport::Viewport;

/// Rows reserved below the text area (status + message).
pub const CHROME_ROWS: usize = 2;

/// How long a status message stays on screen.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Status message
// ---------------------------------------------------------------------------

/// A transient one-line message with its posting time.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    posted: Instant,
}

impl StatusMessage {
    #[must_use]
    pub fn new(text: String) -> Self {
        Self { text, posted: Instant::now() }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the message should still be drawn.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.text.is_empty() && self.posted.elapsed() < MESSAGE_TIMEOUT
    }
}

/// The status-line label for a dirty counter, coarser as edits pile up.
#[must_use]
pub const fn dirty_label(dirty: u64) -> &'static str {
    match dirty {
        0 => "",
        1..=9 => "(modified)",
        10..=99 => "(modified+)",
        100..=999 => "(modified++)",
        _ => "(modified!!)",
    }
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Compositor {
    out: OutputBuffer,
}

impl Compositor {
    #[must_use]
    pub fn new() -> Self {
        Self { out: OutputBuffer::new() }
    }

    /// The last composed frame.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.out.as_bytes()
    }

    /// Flush the composed frame to stdout in a single write.
    pub fn present(&mut self) -> io::Result<()> {
        self.out.flush_stdout()
    }

    /// Rebuild the frame. The viewport must already be scrolled for this
    /// cursor (see [`Viewport::scroll`]).
    pub fn compose(
        &mut self,
        doc: &Document,
        cursor: &Cursor,
        view: &Viewport,
        size: Size,
        message: Option<&StatusMessage>,
    ) -> io::Result<()> {
        self.out.clear();
        let cols = size.cols as usize;
        let text_rows = (size.rows as usize).saturating_sub(CHROME_ROWS);

        ansi::cursor_hide(&mut self.out)?;
        ansi::cursor_to(&mut self.out, 0, 0)?;

        for y in 0..text_rows {
            self.draw_text_row(doc, view, y, text_rows, cols)?;
            ansi::clear_line_right(&mut self.out)?;
            self.out.push(b"\r\n");
        }
        self.draw_status_line(doc, cursor, cols)?;
        self.draw_message_line(message, cols)?;

        // Park the cursor at its window-relative position.
        let render_col = Viewport::cursor_render_col(cursor, doc);
        ansi::cursor_to(
            &mut self.out,
            render_col.saturating_sub(view.col_offset()) as u16,
            cursor.row().saturating_sub(view.row_offset()) as u16,
        )?;
        ansi::cursor_show(&mut self.out)?;
        Ok(())
    }

    fn draw_text_row(
        &mut self,
        doc: &Document,
        view: &Viewport,
        y: usize,
        text_rows: usize,
        cols: usize,
    ) -> io::Result<()> {
        let file_row = y + view.row_offset();
        let Some(row) = doc.row(file_row) else {
            if doc.row_count() == 0 && y == text_rows / 2 {
                self.draw_banner(cols)?;
            } else {
                self.out.push(b"~");
            }
            return Ok(());
        };

        let render = row.render();
        let tags = row.tags();
        let start = view.col_offset().min(render.len());
        let end = (start + cols).min(render.len());

        let mut current = Color::Default;
        for idx in start..end {
            let byte = render[idx];
            if byte.is_ascii_control() {
                // Control bytes print as inverse-video placeholders.
                let sym = if byte < 27 { b'@' + byte } else { b'?' };
                ansi::inverse(&mut self.out)?;
                self.out.push(&[sym]);
                ansi::reset(&mut self.out)?;
                // Reset cancels the color too; restore it.
                if current != Color::Default {
                    ansi::fg(&mut self.out, current)?;
                }
                continue;
            }
            let color = tags[idx].color();
            if color != current {
                ansi::fg(&mut self.out, color)?;
                current = color;
            }
            self.out.push(&[byte]);
        }
        if current != Color::Default {
            ansi::fg(&mut self.out, Color::Default)?;
        }
        Ok(())
    }

    fn draw_banner(&mut self, cols: usize) -> io::Result<()> {
        let banner = concat!("leaf editor -- version ", env!("CARGO_PKG_VERSION"));
        let shown = &banner[..banner.len().min(cols)];
        let padding = (cols - shown.len()) / 2;
        if padding > 0 {
            self.out.push(b"~");
            for _ in 1..padding {
                self.out.push(b" ");
            }
        }
        self.out.push(shown.as_bytes());
        Ok(())
    }

    fn draw_status_line(&mut self, doc: &Document, cursor: &Cursor, cols: usize) -> io::Result<()> {
        let name = doc
            .filename()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("[No Name]");
        let left = format!(
            "{} - {} lines {}",
            truncate(name, 20),
            doc.row_count(),
            dirty_label(doc.dirty()),
        );
        let right = format!(
            "{} | {}/{}",
            doc.profile().map_or("no ft", |p| p.name),
            cursor.row() + 1,
            doc.row_count(),
        );

        ansi::inverse(&mut self.out)?;
        let mut written = left.len().min(cols);
        self.out.push(&left.as_bytes()[..written]);
        while written < cols {
            if cols - written == right.len() {
                self.out.push(right.as_bytes());
                written = cols;
            } else {
                self.out.push(b" ");
                written += 1;
            }
        }
        ansi::reset(&mut self.out)?;
        self.out.push(b"\r\n");
        Ok(())
    }

    fn draw_message_line(&mut self, message: Option<&StatusMessage>, cols: usize) -> io::Result<()> {
        ansi::clear_line_right(&mut self.out)?;
        if let Some(msg) = message {
            if msg.is_live() {
                self.out.push(truncate(msg.text(), cols).as_bytes());
            }
        }
        Ok(())
    }
}

/// Truncate to at most `max` bytes, backing off to the nearest char
/// boundary so a multibyte filename or message never splits a character.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn size(cols: u16, rows: u16) -> Size {
        Size { cols, rows }
    }

    fn frame(doc: &Document, cursor: &Cursor, view: &Viewport, sz: Size) -> Vec<u8> {
        let mut comp = Compositor::new();
        comp.compose(doc, cursor, view, sz, None).unwrap();
        comp.bytes().to_vec()
    }

    fn doc(lines: &[&str]) -> Document {
        Document::from_bytes(lines.join("\n").into_bytes())
    }

    #[test]
    fn frame_brackets_with_cursor_hide_show() {
        let d = doc(&["hi"]);
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(20, 5));
        assert!(bytes.starts_with(b"\x1b[?25l"));
        assert!(bytes.ends_with(b"\x1b[?25h"));
    }

    #[test]
    fn text_rows_use_remaining_height() {
        let d = doc(&["a", "b", "c", "d", "e"]);
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(20, 5));
        // 3 text rows end in EL + CRLF; chrome rows differ.
        let crlf_count = bytes.windows(2).filter(|w| w == b"\r\n").count();
        assert_eq!(crlf_count, 4); // 3 text rows + status line
    }

    #[test]
    fn rows_past_document_show_tilde() {
        let d = doc(&["only"]);
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(20, 6));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("only"));
        assert_eq!(text.matches('~').count(), 3);
    }

    #[test]
    fn empty_document_shows_banner() {
        let d = Document::from_bytes(Vec::new());
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(60, 10));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("leaf editor"));
    }

    #[test]
    fn nonempty_document_has_no_banner() {
        let d = doc(&["x"]);
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(60, 10));
        assert!(!String::from_utf8_lossy(&bytes).contains("leaf editor"));
    }

    #[test]
    fn row_clips_to_column_window() {
        let d = doc(&["0123456789"]);
        let mut v = Viewport::new();
        v.set_col_offset(3);
        let bytes = frame(&d, &Cursor::new(), &v, size(4, 5));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("3456"));
        assert!(!text.contains("34567"));
    }

    #[test]
    fn highlight_colors_are_emitted_and_reset() {
        let mut d = doc(&["int x = 42;"]);
        d.set_filename(PathBuf::from("t.c"));
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(40, 5));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("\x1b[32m")); // keyword tier B
        assert!(text.contains("\x1b[31m")); // number
        assert!(text.contains("\x1b[39m")); // back to default
    }

    #[test]
    fn adjacent_same_color_bytes_share_one_escape() {
        let mut d = doc(&["int"]);
        d.set_filename(PathBuf::from("t.c"));
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(40, 5));
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("\x1b[32m").count(), 1);
    }

    #[test]
    fn control_byte_renders_as_placeholder() {
        let d = Document::from_bytes(vec![b'a', 0x01, b'b', b'\n']);
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(40, 5));
        let text = String::from_utf8_lossy(&bytes);
        // 0x01 prints as inverse 'A'.
        assert!(text.contains("\x1b[7mA\x1b[m"));
    }

    #[test]
    fn status_line_is_exactly_terminal_width() {
        let d = doc(&["a"]);
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(30, 5));
        let text = String::from_utf8_lossy(&bytes);
        // Between the inverse toggle and the reset sits the padded line.
        let start = text.find("\x1b[7m").unwrap() + 4;
        let end = start + text[start..].find("\x1b[m").unwrap();
        assert_eq!(end - start, 30);
    }

    #[test]
    fn status_line_shows_placeholder_and_counts() {
        let d = doc(&["a", "b"]);
        let mut c = Cursor::new();
        c.set(&d, 1, 0);
        let bytes = frame(&d, &c, &Viewport::new(), size(40, 5));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("[No Name]"));
        assert!(text.contains("2 lines"));
        assert!(text.contains("no ft | 2/2"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 1), "h");
        assert_eq!(truncate("héllo", 2), "h"); // cut inside 'é' backs off
        assert_eq!(truncate("héllo", 3), "hé");
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn multibyte_filename_renders_without_panicking() {
        // 19 ASCII bytes then a two-byte char straddling the 20-byte
        // filename cut.
        let mut d = doc(&["x"]);
        d.set_filename(PathBuf::from("aaaaaaaaaaaaaaaaaaaé.txt"));
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(40, 5));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("aaaaaaaaaaaaaaaaaaa"));
        assert!(!text.contains('é'));
    }

    #[test]
    fn dirty_label_tiers() {
        assert_eq!(dirty_label(0), "");
        assert_eq!(dirty_label(1), "(modified)");
        assert_eq!(dirty_label(9), "(modified)");
        assert_eq!(dirty_label(10), "(modified+)");
        assert_eq!(dirty_label(100), "(modified++)");
        assert_eq!(dirty_label(1000), "(modified!!)");
        assert_eq!(dirty_label(u64::MAX), "(modified!!)");
    }

    #[test]
    fn dirty_label_appears_after_edit() {
        let mut d = doc(&["a"]);
        d.insert_char(0, 0, b'x');
        let bytes = frame(&d, &Cursor::new(), &Viewport::new(), size(40, 5));
        assert!(String::from_utf8_lossy(&bytes).contains("(modified)"));
    }

    #[test]
    fn live_message_is_drawn_and_truncated() {
        let d = doc(&["a"]);
        let msg = StatusMessage::new("hello there".into());
        let mut comp = Compositor::new();
        comp.compose(&d, &Cursor::new(), &Viewport::new(), size(5, 5), Some(&msg))
            .unwrap();
        let text = String::from_utf8_lossy(comp.bytes()).into_owned();
        assert!(text.contains("hello"));
        assert!(!text.contains("hello "));
    }

    #[test]
    fn empty_message_is_not_drawn() {
        let msg = StatusMessage::new(String::new());
        assert!(!msg.is_live());
    }

    #[test]
    fn cursor_parked_window_relative() {
        let lines: Vec<String> = (0..30).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let d = doc(&refs);
        let mut c = Cursor::new();
        c.set(&d, 10, 1);
        let mut v = Viewport::new();
        v.scroll(&c, &d, 8, 20);
        let bytes = frame(&d, &c, &v, size(20, 10));
        let text = String::from_utf8_lossy(&bytes);
        // Row 10 with offset 3 is screen row 7 (1-based 8), col 1 -> 2.
        assert_eq!(v.row_offset(), 3);
        assert!(text.ends_with("\x1b[8;2H\x1b[?25h"));
    }

    #[test]
    fn tab_cursor_parks_at_render_column() {
        let d = doc(&["\tx"]);
        let mut c = Cursor::new();
        c.set(&d, 0, 1);
        let bytes = frame(&d, &c, &Viewport::new(), size(40, 5));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.ends_with("\x1b[1;9H\x1b[?25h"));
    }
}
