//! leaf-core — the editing engine behind the `leaf` binary.
//!
//! Everything here is terminal-agnostic and synchronous: a [`Document`]
//! of byte rows with tab-expanded render projections and per-byte syntax
//! tags, a clamping [`Cursor`], a minimal-movement [`Viewport`], an
//! incremental [`SearchState`], and a [`Compositor`] that turns the lot
//! into one escape-coded frame. The binary owns the event loop and the
//! terminal; this crate owns the state and the pixels-in-bytes.

pub mod compose;
pub mod cursor;
pub mod document;
pub mod row;
pub mod search;
pub mod syntax;
pub mod viewport;

pub use compose::{Compositor, StatusMessage};
pub use cursor::Cursor;
pub use document::Document;
pub use row::{Row, TAB_STOP};
pub use search::SearchState;
pub use syntax::{Highlight, SyntaxProfile, PROFILES};
pub use viewport::Viewport;
