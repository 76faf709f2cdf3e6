//! Cursor position and movement over a document.
//!
//! The cursor lives in logical coordinates: `row` may sit one past the
//! last row (the append position), `col` may sit one past the last byte
//! of its row. Every movement clamps rather than errors; there is no
//! out-of-bounds state to reach.

use crate::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    row: usize,
    col: usize,
}

impl Cursor {
    #[must_use]
    pub const fn new() -> Self {
        Self { row: 0, col: 0 }
    }

    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub const fn col(&self) -> usize {
        self.col
    }

    /// Place the cursor, clamping into the document's valid range.
    pub fn set(&mut self, doc: &Document, row: usize, col: usize) {
        self.row = row.min(doc.row_count());
        self.col = col;
        self.clamp_col(doc);
    }

    /// Length of the row under the cursor (zero on the append row).
    fn row_len(&self, doc: &Document) -> usize {
        doc.row(self.row).map_or(0, crate::row::Row::len)
    }

    /// Snap `col` back into the current row after a vertical move or an
    /// external edit.
    pub fn clamp_col(&mut self, doc: &Document) {
        self.col = self.col.min(self.row_len(doc));
    }

    // -- Movement -----------------------------------------------------------

    /// One column left; at column 0, wrap to the end of the previous row.
    pub fn move_left(&mut self, doc: &Document) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.row_len(doc);
        }
    }

    /// One column right; past the last byte, wrap to the start of the
    /// next row (including onto the append row).
    pub fn move_right(&mut self, doc: &Document) {
        if self.col < self.row_len(doc) {
            self.col += 1;
        } else if self.row < doc.row_count() {
            self.row += 1;
            self.col = 0;
        }
    }

    /// One row up, column snapped to the new row's length.
    pub fn move_up(&mut self, doc: &Document) {
        if self.row > 0 {
            self.row -= 1;
            self.clamp_col(doc);
        }
    }

    /// One row down, at most to the append row, column snapped.
    pub fn move_down(&mut self, doc: &Document) {
        if self.row < doc.row_count() {
            self.row += 1;
            self.clamp_col(doc);
        }
    }

    /// Start of the current row.
    pub const fn move_home(&mut self) {
        self.col = 0;
    }

    /// End of the current row.
    pub fn move_end(&mut self, doc: &Document) {
        self.col = self.row_len(doc);
    }
}
