//! Incremental search: match stepping, direction, and the highlight
//! overlay for the current match.
//!
//! The search prompt feeds every keystroke through [`SearchState::on_key`]
//! after updating the query text. Each call first undoes the previous
//! match overlay, then decides direction (arrows) or resets the scan (any
//! query edit), then scans. The scan visits every row at most once, so an
//! absent query terminates after one full wrap.
//!
//! Matching is byte-exact and case-sensitive, over render bytes, so a
//! query containing spaces finds tab-expanded cells too.

use crate::cursor::Cursor;
use crate::document::Document;
use crate::syntax::Highlight;
use crate::viewport::Viewport;
use leaf_term::Key;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The saved tags under the current match overlay.
#[derive(Debug, Clone)]
struct Overlay {
    row: usize,
    start: usize,
    saved: Vec<Highlight>,
}

#[derive(Debug, Default)]
pub struct SearchState {
    /// Row of the last match, the anchor for the next step.
    last_match: Option<usize>,
    /// Scan direction: true steps down, false steps up.
    forward: bool,
    overlay: Option<Overlay>,
}

impl SearchState {
    #[must_use]
    pub fn new() -> Self {
        Self { last_match: None, forward: true, overlay: None }
    }

    /// Undo the current match overlay, if any.
    pub fn restore_overlay(&mut self, doc: &mut Document) {
        if let Some(overlay) = self.overlay.take() {
            doc.restore_tags(overlay.row, overlay.start, &overlay.saved);
        }
    }

    /// Process one prompt keystroke. The caller has already applied the
    /// key to the query text; Enter and Escape terminate the prompt and
    /// must not reach here.
    pub fn on_key(
        &mut self,
        doc: &mut Document,
        cursor: &mut Cursor,
        view: &mut Viewport,
        query: &[u8],
        key: Key,
    ) {
        self.restore_overlay(doc);

        match key {
            Key::Right | Key::Down => self.forward = true,
            Key::Left | Key::Up => self.forward = false,
            _ => {
                // The query changed: restart the scan, downward.
                self.last_match = None;
                self.forward = true;
            }
        }

        self.scan(doc, cursor, view, query);
    }

    /// Find the next matching row from the anchor and land on it: cursor
    /// to the match, viewport forced so the row surfaces at the top, and
    /// the match span overlaid.
    fn scan(&mut self, doc: &mut Document, cursor: &mut Cursor, view: &mut Viewport, query: &[u8]) {
        if query.is_empty() || doc.row_count() == 0 {
            return;
        }

        // Without an anchor there is nothing to step back from; the
        // first scan always runs downward from the top.
        if self.last_match.is_none() {
            self.forward = true;
        }

        let count = doc.row_count();
        let mut current = self.last_match;
        for _ in 0..count {
            let row_idx = match current {
                // Step from the anchor, wrapping at either end.
                Some(at) if self.forward => (at + 1) % count,
                Some(at) => at.checked_sub(1).unwrap_or(count - 1),
                None => 0,
            };
            current = Some(row_idx);

            let Some(row) = doc.row(row_idx) else { break };
            if let Some(pos) = find(row.render(), query) {
                self.last_match = Some(row_idx);
                cursor.set(doc, row_idx, row.render_to_logical(pos));
                // Force the next scroll to surface the match at the top
                // of the window.
                view.set_row_offset(doc.row_count());

                let saved = row.tags()[pos..(pos + query.len()).min(row.tags().len())].to_vec();
                self.overlay = Some(Overlay { row: row_idx, start: pos, saved });
                doc.overlay_match(row_idx, pos, query.len());
                return;
            }
        }
    }
}

/// First occurrence of `needle` in `haystack`, byte-exact.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
