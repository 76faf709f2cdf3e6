// SPDX-License-Identifier: MIT
//
// leaf — a small terminal text editor.
//
// This binary wires the two crates together:
//
//   leaf-term → raw mode, input parsing, escape codes, output buffering
//   leaf-core → document, cursor, viewport, syntax, search, compositing
//
// The event loop is deliberately synchronous: read() blocks for at most a
// tenth of a second (VMIN=0, VTIME=1), so each iteration either delivers
// key bytes or a timeout that flushes a pending lone Escape. Each keypress
// flows through:
//
//   stdin → parser → key dispatch → document/cursor mutation
//   → viewport scroll → compositor → one write to stdout
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← rows - 2
//   ├──────────────────────────────┤
//   │ status line (INVERSE)        │  ← 1 row
//   ├──────────────────────────────┤
//   │ message / prompt line        │  ← 1 row
//   └──────────────────────────────┘

use std::env;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use leaf_core::compose::{Compositor, StatusMessage, CHROME_ROWS};
use leaf_core::cursor::Cursor;
use leaf_core::document::Document;
use leaf_core::search::SearchState;
use leaf_core::viewport::Viewport;
use leaf_term::{Key, Parser, Terminal};

/// Ctrl-Q presses required to abandon unsaved changes.
const QUIT_CONFIRMATIONS: u8 = 3;

const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

// ─── Prompt ─────────────────────────────────────────────────────────────────

/// An active bottom-line prompt. While one is open, all keys are routed
/// here instead of the normal dispatch.
enum Prompt {
    /// Ctrl-S on an unnamed document: collecting the filename.
    SaveAs { input: String },
    /// Ctrl-F: incremental search. The entry position is saved so Escape
    /// can put everything back.
    Search {
        input: String,
        search: SearchState,
        saved_cursor: Cursor,
        saved_row_offset: usize,
        saved_col_offset: usize,
    },
}

// ─── Editor ─────────────────────────────────────────────────────────────────

/// Everything the session owns: the document and its view state, the
/// input parser, and the transient bottom-line state.
struct Editor {
    doc: Document,
    cursor: Cursor,
    view: Viewport,
    compositor: Compositor,
    parser: Parser,
    message: Option<StatusMessage>,
    prompt: Option<Prompt>,

    /// Remaining Ctrl-Q presses before a dirty quit goes through.
    quit_presses: u8,

    /// Text-area height from the last frame, for page movement.
    last_text_rows: usize,
}

impl Editor {
    fn new(doc: Document) -> Self {
        Self {
            doc,
            cursor: Cursor::new(),
            view: Viewport::new(),
            compositor: Compositor::new(),
            parser: Parser::new(),
            message: Some(StatusMessage::new(HELP_MESSAGE.to_string())),
            prompt: None,
            quit_presses: QUIT_CONFIRMATIONS,
            last_text_rows: 22,
        }
    }

    fn set_message(&mut self, text: String) {
        self.message = Some(StatusMessage::new(text));
    }

    /// Scroll, compose, and flush one frame.
    fn refresh(&mut self, term: &mut Terminal) -> io::Result<()> {
        let size = term.refresh_size();
        let text_rows = (size.rows as usize).saturating_sub(CHROME_ROWS);
        self.last_text_rows = text_rows.max(1);

        self.view
            .scroll(&self.cursor, &self.doc, text_rows, size.cols as usize);
        self.compositor
            .compose(&self.doc, &self.cursor, &self.view, size, self.message.as_ref())?;
        self.compositor.present()
    }

    // ── Key dispatch ────────────────────────────────────────────────────

    /// Process one key. Returns `false` when the editor should exit.
    fn handle_key(&mut self, key: Key) -> io::Result<bool> {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return Ok(true);
        }

        match key {
            Key::Ctrl(b'q') => {
                if self.doc.is_dirty() && self.quit_presses > 0 {
                    let presses = self.quit_presses;
                    self.quit_presses -= 1;
                    self.set_message(format!(
                        "WARNING! File has unsaved changes. \
                         Press Ctrl-Q {presses} more times to quit."
                    ));
                    return Ok(true);
                }
                return Ok(false);
            }
            Key::Ctrl(b's') => self.save(),
            Key::Ctrl(b'f') => self.start_search(),

            Key::Up => self.cursor.move_up(&self.doc),
            Key::Down => self.cursor.move_down(&self.doc),
            Key::Left => self.cursor.move_left(&self.doc),
            Key::Right => self.cursor.move_right(&self.doc),
            Key::Home => self.cursor.move_home(),
            Key::End => self.cursor.move_end(&self.doc),
            Key::PageUp => {
                for _ in 0..self.last_text_rows {
                    self.cursor.move_up(&self.doc);
                }
            }
            Key::PageDown => {
                for _ in 0..self.last_text_rows {
                    self.cursor.move_down(&self.doc);
                }
            }

            Key::Enter => {
                self.doc.split_line(self.cursor.row(), self.cursor.col());
                self.cursor.set(&self.doc, self.cursor.row() + 1, 0);
            }
            Key::Backspace | Key::Ctrl(b'h') => self.backspace(),
            Key::Delete => self.delete_forward(),

            Key::Char(byte) => {
                self.doc.insert_char(self.cursor.row(), self.cursor.col(), byte);
                self.cursor
                    .set(&self.doc, self.cursor.row(), self.cursor.col() + 1);
            }

            // Escape and unbound control keys do nothing.
            Key::Escape | Key::Ctrl(_) => {}
        }

        // Any key other than Ctrl-Q rearms the quit confirmation.
        self.quit_presses = QUIT_CONFIRMATIONS;
        Ok(true)
    }

    /// Delete the byte left of the cursor, joining lines at column 0.
    fn backspace(&mut self) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        if row == self.doc.row_count() {
            return;
        }
        if col > 0 {
            self.doc.delete_char(row, col - 1);
            self.cursor.set(&self.doc, row, col - 1);
        } else if let Some(seam) = self.doc.join_with_previous(row) {
            self.cursor.set(&self.doc, row - 1, seam);
        }
    }

    /// Delete the byte under the cursor, joining the next line at row end.
    fn delete_forward(&mut self) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let Some(len) = self.doc.row(row).map(leaf_core::row::Row::len) else {
            return;
        };
        if col < len {
            self.doc.delete_char(row, col);
        } else {
            self.doc.join_with_previous(row + 1);
        }
    }

    // ── Save ────────────────────────────────────────────────────────────

    fn save(&mut self) {
        if self.doc.filename().is_none() {
            self.prompt = Some(Prompt::SaveAs { input: String::new() });
            self.set_message("Save as: ".to_string());
            return;
        }
        match self.doc.save() {
            Ok(bytes) => self.set_message(format!("{bytes} bytes written to disk")),
            Err(err) => self.set_message(format!("Can't save! I/O error: {err}")),
        }
    }

    // ── Search ──────────────────────────────────────────────────────────

    fn start_search(&mut self) {
        self.prompt = Some(Prompt::Search {
            input: String::new(),
            search: SearchState::new(),
            saved_cursor: self.cursor,
            saved_row_offset: self.view.row_offset(),
            saved_col_offset: self.view.col_offset(),
        });
        self.set_message("Search: (Use ESC/Arrows/Enter)".to_string());
    }

    // ── Prompt handling ─────────────────────────────────────────────────

    fn handle_prompt_key(&mut self, key: Key) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        match prompt {
            Prompt::SaveAs { mut input } => match key {
                Key::Escape => self.set_message("Save aborted".to_string()),
                Key::Enter => {
                    if input.is_empty() {
                        self.set_message("Save aborted".to_string());
                    } else {
                        self.doc.set_filename(PathBuf::from(&input));
                        self.save();
                    }
                }
                _ => {
                    edit_prompt_input(&mut input, key);
                    self.set_message(format!("Save as: {input}"));
                    self.prompt = Some(Prompt::SaveAs { input });
                }
            },
            Prompt::Search {
                mut input,
                mut search,
                saved_cursor,
                saved_row_offset,
                saved_col_offset,
            } => match key {
                Key::Escape => {
                    // Put everything back the way Ctrl-F found it.
                    search.restore_overlay(&mut self.doc);
                    self.cursor = saved_cursor;
                    self.view.set_row_offset(saved_row_offset);
                    self.view.set_col_offset(saved_col_offset);
                    self.message = None;
                }
                Key::Enter => {
                    // Confirmed: keep the cursor on the match.
                    search.restore_overlay(&mut self.doc);
                    self.message = None;
                }
                _ => {
                    edit_prompt_input(&mut input, key);
                    search.on_key(
                        &mut self.doc,
                        &mut self.cursor,
                        &mut self.view,
                        input.as_bytes(),
                        key,
                    );
                    self.set_message(format!("Search: {input} (Use ESC/Arrows/Enter)"));
                    self.prompt = Some(Prompt::Search {
                        input,
                        search,
                        saved_cursor,
                        saved_row_offset,
                        saved_col_offset,
                    });
                }
            },
        }
    }
}

/// Apply a key to a prompt's input line: printable ASCII appends,
/// Backspace trims, everything else leaves it alone.
fn edit_prompt_input(input: &mut String, key: Key) {
    match key {
        Key::Char(byte) if byte.is_ascii() && !byte.is_ascii_control() => {
            input.push(byte as char);
        }
        Key::Backspace | Key::Ctrl(b'h') => {
            input.pop();
        }
        _ => {}
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let doc = match env::args().nth(1) {
        Some(path) => Document::open(path.as_ref()).unwrap_or_else(|err| {
            eprintln!("leaf: {path}: {err}");
            process::exit(1);
        }),
        None => Document::new(),
    };

    if let Err(err) = run(doc) {
        eprintln!("leaf: {err}");
        process::exit(1);
    }
}

fn run(doc: Document) -> io::Result<()> {
    let mut term = Terminal::new()?;
    term.enter()?;

    let mut editor = Editor::new(doc);
    let mut stdin = io::stdin().lock();
    let mut buf = [0u8; 64];

    loop {
        editor.refresh(&mut term)?;

        let read = match stdin.read(&mut buf) {
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };

        let keys = if read == 0 {
            // Timeout: a buffered lone Escape is a real Escape keypress.
            editor.parser.flush().into_iter().collect()
        } else {
            editor.parser.advance(&buf[..read])
        };

        for key in keys {
            if !editor.handle_key(key)? {
                return term.leave();
            }
        }
    }
}
