//! Text helpers for rendering list cells in a terminal.
//!
//! Item values come from the server verbatim, so they are sanitized before
//! display and fitted to column widths using Unicode display width.

mod text;

pub use text::{display_width, fit_to_width, sanitize_cell};

/// Longest search query the input box accepts, in characters.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
