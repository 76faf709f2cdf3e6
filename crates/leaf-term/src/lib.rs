// SPDX-License-Identifier: MIT
//
// leaf-term — Terminal layer for leaf.
//
// Raw mode via termios with RAII restore, ANSI escape generation,
// whole-frame output buffering, and key-byte decoding. This crate
// intentionally avoids external TUI frameworks (ratatui, crossterm)
// in favor of direct terminal control: the editor emits exactly one
// write per frame, and every escape code in that frame is accounted
// for.

pub mod ansi;
pub mod input;
pub mod output;
pub mod terminal;

pub use ansi::Color;
pub use input::{Key, Parser};
pub use output::OutputBuffer;
pub use terminal::{Size, Terminal};
