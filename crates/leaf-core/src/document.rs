//! The document: an ordered list of rows plus file identity, dirty
//! tracking, and the active syntax profile.
//!
//! Every mutation goes through here so that three invariants hold after
//! each public call: row indices are contiguous from zero, each mutated
//! region has been re-classified, and the dirty counter reflects whether
//! an actual change happened. Out-of-range mutations are no-ops that
//! leave the document untouched, dirty counter included.
//!
//! Re-classification after an edit is a bounded forward walk: a row's
//! highlighting depends on its predecessor only through the trailing
//! open-comment flag, so the walk stops at the first row whose flag
//! settles unchanged.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::row::Row;
use crate::syntax::{self, SyntaxProfile};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Document {
    rows: Vec<Row>,
    dirty: u64,
    filename: Option<PathBuf>,
    profile: Option<&'static SyntaxProfile>,
}

impl Document {
    /// An empty, unnamed document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from raw bytes, splitting on `\n` and stripping a
    /// trailing `\r` from each line. A final newline does not produce an
    /// extra empty row. The result is unnamed and clean.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mut doc = Self::new();
        // split() on empty input yields one empty slice, which would
        // become a phantom row.
        if bytes.is_empty() {
            return doc;
        }
        for line in bytes.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            let index = doc.rows.len();
            doc.rows.push(Row::new(index, line.to_vec()));
        }
        // split() yields one trailing empty slice for a final newline.
        if bytes.last() == Some(&b'\n') {
            doc.rows.pop();
        }
        doc
    }

    /// Read a file into a new document. The filename is recorded and the
    /// matching syntax profile (if any) applied.
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;
        let mut doc = Self::from_bytes(bytes);
        doc.set_filename(path.to_path_buf());
        Ok(doc)
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Count of mutations since the last load or save.
    #[must_use]
    pub const fn dirty(&self) -> u64 {
        self.dirty
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&'static SyntaxProfile> {
        self.profile
    }

    /// Record a filename, re-select the syntax profile from it, and
    /// re-classify every row under the new profile.
    pub fn set_filename(&mut self, path: PathBuf) {
        self.profile = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(syntax::select_profile);
        self.filename = Some(path);
        self.rehighlight_all();
    }

    // -- Mutations ----------------------------------------------------------

    /// Insert a row at `at`, shifting the rest down. No-op past the
    /// one-past-the-end position.
    pub fn insert_row(&mut self, at: usize, bytes: Vec<u8>) {
        if at > self.rows.len() {
            return;
        }
        let seed = at.checked_sub(1).is_some_and(|p| self.rows[p].open_comment());
        self.rows.insert(at, Row::new(at, bytes));
        self.rows[at].seed_open_comment(seed);
        self.renumber_from(at + 1);
        self.dirty += 1;
        self.rehighlight_from(at);
    }

    /// Delete the row at `at`. No-op past the end.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.renumber_from(at);
        self.dirty += 1;
        self.rehighlight_from(at);
    }

    /// Insert one byte into the row at `(row, at)`. Inserting on the
    /// append row (one past the last) grows the document first; `at` is
    /// clamped to the row length.
    pub fn insert_char(&mut self, row: usize, at: usize, byte: u8) {
        if row > self.rows.len() {
            return;
        }
        if row == self.rows.len() {
            let seed = row.checked_sub(1).is_some_and(|p| self.rows[p].open_comment());
            self.rows.push(Row::new(row, Vec::new()));
            self.rows[row].seed_open_comment(seed);
        }
        self.rows[row].insert_byte(at, byte);
        self.dirty += 1;
        self.rehighlight_from(row);
    }

    /// Delete the byte at `(row, at)`. Deleting past the row's end, or on
    /// a nonexistent row, changes nothing (dirty included).
    pub fn delete_char(&mut self, row: usize, at: usize) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        if r.delete_byte(at) {
            self.dirty += 1;
            self.rehighlight_from(row);
        }
    }

    /// Split the row at `(row, at)` into two, the cursor's natural Enter.
    /// Pressing Enter on the append row inserts an empty row instead.
    pub fn split_line(&mut self, row: usize, at: usize) {
        if row >= self.rows.len() {
            self.insert_row(row, Vec::new());
            return;
        }
        let tail = self.rows[row].split_off(at);
        let seed = self.rows[row].open_comment();
        self.rows.insert(row + 1, Row::new(row + 1, tail));
        self.rows[row + 1].seed_open_comment(seed);
        self.renumber_from(row + 2);
        self.dirty += 1;
        // The prefix's flag may settle unchanged, which would stop the
        // walk before the tail; classify both halves.
        self.rehighlight_from(row);
        self.rehighlight_from(row + 1);
    }

    /// Join the row at `at` onto the end of its predecessor, returning
    /// the column where the seam landed (the predecessor's old length).
    /// Returns `None` for row 0 or a nonexistent row.
    pub fn join_with_previous(&mut self, at: usize) -> Option<usize> {
        if at == 0 || at >= self.rows.len() {
            return None;
        }
        let removed = self.rows.remove(at);
        let seam = self.rows[at - 1].len();
        self.rows[at - 1].append_bytes(removed.logical());
        self.renumber_from(at);
        self.dirty += 1;
        self.rehighlight_from(at - 1);
        Some(seam)
    }

    // -- Persistence --------------------------------------------------------

    /// The on-disk form: every row followed by `\n`.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let total: usize = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(row.logical());
            out.push(b'\n');
        }
        out
    }

    /// Write the document to its filename, truncating. Returns the byte
    /// count written and resets the dirty counter. Fails without touching
    /// state when no filename is set.
    pub fn save(&mut self) -> io::Result<usize> {
        let Some(path) = self.filename.clone() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "no filename"));
        };
        let bytes = self.serialize();
        let mut file = File::create(&path)?;
        file.write_all(&bytes)?;
        self.dirty = 0;
        Ok(bytes.len())
    }

    // -- Highlighting -------------------------------------------------------

    /// Re-classify from `at` forward, stopping at the first row whose
    /// trailing open-comment flag comes out unchanged. The row at `at`
    /// itself is always re-classified.
    pub fn rehighlight_from(&mut self, at: usize) {
        let mut idx = at;
        while idx < self.rows.len() {
            let prev_open = idx
                .checked_sub(1)
                .is_some_and(|p| self.rows[p].open_comment());
            let (tags, open) = syntax::classify(self.rows[idx].render(), self.profile, prev_open);
            let flag_changed = self.rows[idx].apply_classification(tags, open);
            idx += 1;
            if !flag_changed {
                break;
            }
        }
    }

    /// Re-classify every row in order (profile changes, file loads).
    fn rehighlight_all(&mut self) {
        for idx in 0..self.rows.len() {
            let prev_open = idx
                .checked_sub(1)
                .is_some_and(|p| self.rows[p].open_comment());
            let (tags, open) = syntax::classify(self.rows[idx].render(), self.profile, prev_open);
            self.rows[idx].apply_classification(tags, open);
        }
    }

    /// Overlay a search match tag span on one row.
    pub(crate) fn overlay_match(&mut self, row: usize, start: usize, len: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            r.set_tag_span(start, len, crate::syntax::Highlight::Match);
        }
    }

    /// Undo a match overlay with its snapshot.
    pub(crate) fn restore_tags(&mut self, row: usize, start: usize, saved: &[crate::syntax::Highlight]) {
        if let Some(r) = self.rows.get_mut(row) {
            r.restore_tag_span(start, saved);
        }
    }

    fn renumber_from(&mut self, at: usize) {
        for idx in at..self.rows.len() {
            self.rows[idx].set_index(idx);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
