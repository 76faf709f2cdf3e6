//! Scroll state: which document rectangle the text area shows.
//!
//! Offsets are in render coordinates. [`Viewport::scroll`] is called once
//! per frame, before composition, and moves each offset the minimum
//! distance needed to bring the cursor back inside the visible rectangle.

use crate::cursor::Cursor;
use crate::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    row_offset: usize,
    col_offset: usize,
}

impl Viewport {
    #[must_use]
    pub const fn new() -> Self {
        Self { row_offset: 0, col_offset: 0 }
    }

    /// First visible document row.
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// First visible render column.
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    pub const fn set_row_offset(&mut self, offset: usize) {
        self.row_offset = offset;
    }

    pub const fn set_col_offset(&mut self, offset: usize) {
        self.col_offset = offset;
    }

    /// Render column of the cursor within its row (0 on the append row).
    #[must_use]
    pub fn cursor_render_col(cursor: &Cursor, doc: &Document) -> usize {
        doc.row(cursor.row())
            .map_or(0, |row| row.logical_to_render(cursor.col()))
    }

    /// Bring the cursor back inside a `text_rows` x `cols` window, moving
    /// each offset only as far as needed.
    pub fn scroll(&mut self, cursor: &Cursor, doc: &Document, text_rows: usize, cols: usize) {
        let render_col = Self::cursor_render_col(cursor, doc);

        if cursor.row() < self.row_offset {
            self.row_offset = cursor.row();
        }
        if text_rows > 0 && cursor.row() >= self.row_offset + text_rows {
            self.row_offset = cursor.row() + 1 - text_rows;
        }
        if render_col < self.col_offset {
            self.col_offset = render_col;
        }
        if cols > 0 && render_col >= self.col_offset + cols {
            self.col_offset = render_col + 1 - cols;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> Document {
        Document::from_bytes(lines.join("\n").into_bytes())
    }

    #[test]
    fn cursor_inside_window_leaves_offsets() {
        let d = doc(&["a", "b", "c"]);
        let mut c = Cursor::new();
        c.set(&d, 1, 0);
        let mut v = Viewport::new();
        v.scroll(&c, &d, 10, 80);
        assert_eq!((v.row_offset(), v.col_offset()), (0, 0));
    }

    #[test]
    fn cursor_below_window_scrolls_down_minimally() {
        let lines: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let d = doc(&refs);
        let mut c = Cursor::new();
        c.set(&d, 9, 0);
        let mut v = Viewport::new();
        v.scroll(&c, &d, 5, 80);
        // Row 9 becomes the last visible row.
        assert_eq!(v.row_offset(), 5);
    }

    #[test]
    fn cursor_above_window_scrolls_up() {
        let d = doc(&["a", "b", "c", "d"]);
        let mut c = Cursor::new();
        c.set(&d, 1, 0);
        let mut v = Viewport::new();
        v.set_row_offset(3);
        v.scroll(&c, &d, 2, 80);
        assert_eq!(v.row_offset(), 1);
    }

    #[test]
    fn horizontal_scroll_tracks_render_column() {
        let d = doc(&["\twide"]);
        let mut c = Cursor::new();
        c.set(&d, 0, 2); // render column 9
        let mut v = Viewport::new();
        v.scroll(&c, &d, 5, 5);
        assert_eq!(v.col_offset(), 5);
        c.set(&d, 0, 0); // render column 0
        v.scroll(&c, &d, 5, 5);
        assert_eq!(v.col_offset(), 0);
    }

    #[test]
    fn append_row_scrolls_like_a_row() {
        let d = doc(&["a", "b", "c"]);
        let mut c = Cursor::new();
        c.set(&d, 3, 0); // append row
        let mut v = Viewport::new();
        v.scroll(&c, &d, 2, 80);
        assert_eq!(v.row_offset(), 2);
    }

    #[test]
    fn forced_offset_snaps_back_next_scroll() {
        let d = doc(&["a", "b"]);
        let c = Cursor::new();
        let mut v = Viewport::new();
        v.set_row_offset(50);
        v.scroll(&c, &d, 10, 80);
        assert_eq!(v.row_offset(), 0);
    }
}
