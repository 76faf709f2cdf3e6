//! A single document row: logical bytes, render bytes, and highlight tags.
//!
//! The logical buffer is exactly what was typed (and what gets saved); the
//! render buffer is the screen projection with every tab expanded to the
//! next multiple-of-[`TAB_STOP`] column. Tags are per render byte and are
//! kept in lockstep with the render buffer at all times.
//!
//! Columns and positions are byte indices throughout. Mutations rebuild
//! the render projection eagerly and reset tags to normal; classification
//! is re-applied afterwards by the document (see
//! `Document::rehighlight_from`).

use crate::syntax::Highlight;

/// Render columns per tab stop.
pub const TAB_STOP: usize = 8;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of text, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    index: usize,
    logical: Vec<u8>,
    render: Vec<u8>,
    tags: Vec<Highlight>,
    open_comment: bool,
}

impl Row {
    /// Build a row from logical bytes. Tags start all-normal; the caller
    /// re-classifies once the row is placed in a document.
    #[must_use]
    pub fn new(index: usize, logical: Vec<u8>) -> Self {
        let mut row = Self {
            index,
            logical,
            render: Vec::new(),
            tags: Vec::new(),
            open_comment: false,
        };
        row.rebuild_render();
        row
    }

    // -- Accessors ----------------------------------------------------------

    /// Position of this row in the document.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    pub(crate) const fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// The authoritative text, without tabs expanded.
    #[must_use]
    pub fn logical(&self) -> &[u8] {
        &self.logical
    }

    /// Logical length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.logical.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.logical.is_empty()
    }

    /// The screen projection, tabs expanded to spaces.
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// One highlight tag per render byte.
    #[must_use]
    pub fn tags(&self) -> &[Highlight] {
        &self.tags
    }

    /// Whether this row ends inside an unterminated block comment.
    #[must_use]
    pub const fn open_comment(&self) -> bool {
        self.open_comment
    }

    // -- Classification plumbing --------------------------------------------

    /// Seed the open-comment flag of a freshly created row from its
    /// predecessor, so the first classification's change detection
    /// compares against what downstream rows already assumed.
    pub(crate) const fn seed_open_comment(&mut self, open: bool) {
        self.open_comment = open;
    }

    /// Install freshly computed tags and the trailing open-comment flag.
    /// Returns whether the flag changed, which drives forward propagation.
    pub(crate) fn apply_classification(&mut self, tags: Vec<Highlight>, open: bool) -> bool {
        debug_assert_eq!(tags.len(), self.render.len());
        self.tags = tags;
        let changed = self.open_comment != open;
        self.open_comment = open;
        changed
    }

    /// Overwrite a tag span (used for the search match overlay). The span
    /// is clamped to the render length.
    pub(crate) fn set_tag_span(&mut self, start: usize, len: usize, tag: Highlight) {
        let start = start.min(self.tags.len());
        let end = (start + len).min(self.tags.len());
        for t in &mut self.tags[start..end] {
            *t = tag;
        }
    }

    /// Restore a previously snapshotted tag span, clamped the same way.
    pub(crate) fn restore_tag_span(&mut self, start: usize, saved: &[Highlight]) {
        let start = start.min(self.tags.len());
        let end = (start + saved.len()).min(self.tags.len());
        self.tags[start..end].copy_from_slice(&saved[..end - start]);
    }

    // -- Position mapping ---------------------------------------------------

    /// Map a logical column to its render column.
    ///
    /// Walks the logical prefix, advancing tabs to the next multiple of
    /// [`TAB_STOP`]. `col` is clamped to the row length.
    #[must_use]
    pub fn logical_to_render(&self, col: usize) -> usize {
        let col = col.min(self.logical.len());
        let mut render_col = 0;
        for &byte in &self.logical[..col] {
            if byte == b'\t' {
                render_col += (TAB_STOP - 1) - (render_col % TAB_STOP);
            }
            render_col += 1;
        }
        render_col
    }

    /// Map a render column back to a logical column.
    ///
    /// Returns the first logical index whose rendering passes `render_col`;
    /// columns inside a tab's padding resolve to the tab itself. Saturates
    /// to the row length past the end, so the two maps compose to the
    /// identity on valid logical columns.
    #[must_use]
    pub fn render_to_logical(&self, render_col: usize) -> usize {
        let mut cur = 0;
        for (col, &byte) in self.logical.iter().enumerate() {
            if byte == b'\t' {
                cur += (TAB_STOP - 1) - (cur % TAB_STOP);
            }
            cur += 1;
            if cur > render_col {
                return col;
            }
        }
        self.logical.len()
    }

    // -- Mutations ----------------------------------------------------------

    /// Insert one byte at `at` (clamped to the row length).
    pub(crate) fn insert_byte(&mut self, at: usize, byte: u8) {
        let at = at.min(self.logical.len());
        self.logical.insert(at, byte);
        self.rebuild_render();
    }

    /// Delete the byte at `at`. No-op past the end; returns whether a byte
    /// was removed.
    pub(crate) fn delete_byte(&mut self, at: usize) -> bool {
        if at >= self.logical.len() {
            return false;
        }
        self.logical.remove(at);
        self.rebuild_render();
        true
    }

    /// Append another row's bytes (line join).
    pub(crate) fn append_bytes(&mut self, bytes: &[u8]) {
        self.logical.extend_from_slice(bytes);
        self.rebuild_render();
    }

    /// Split at `at` (clamped), keeping the prefix here and returning the
    /// tail's logical bytes.
    pub(crate) fn split_off(&mut self, at: usize) -> Vec<u8> {
        let at = at.min(self.logical.len());
        let tail = self.logical.split_off(at);
        self.rebuild_render();
        tail
    }

    /// Recompute the render projection and reset tags to normal.
    fn rebuild_render(&mut self) {
        self.render.clear();
        for &byte in &self.logical {
            if byte == b'\t' {
                self.render.push(b' ');
                while self.render.len() % TAB_STOP != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(byte);
            }
        }
        self.tags.clear();
        self.tags.resize(self.render.len(), Highlight::Normal);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
