//! # Parsing Pipeline
//!
//! Turns a book's raw `(marker, text)` lines into the flat, nested-equivalent
//! entry list. Each stage runs once per book, in order.
//!
//! ## Modules
//!
//! - **`reorder`**: optional line-order fixes for markup converted from other formats
//! - **`lines`**: the per-line driver; tracks chapter and verse, splits lines,
//!   synthesises `c`, `c#`, `v~`, `p~` and `vp#` entries
//! - **`notes`**: lifts notes out of body text as extras
//! - **`quotes`**: angle-bracket and straight-quote normalisation
//! - **`clean`**: strips character formatting to give clean text
//! - **`nesting`**: inserts closing entries with the open-marker stack
//! - **`snapshot`**: rendering and invariant checks used by tests
//!
//! ## Key Invariants
//!
//! - Processing never fails on bad markup; problems become anomalies
//! - The only fatal condition is the open-marker stack overflowing
//! - Extra offsets index the owning entry's adjusted text

pub mod clean;
pub mod lines;
pub mod nesting;
pub mod notes;
pub mod quotes;
pub mod reorder;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use clean::{clean_text, strip_formatting};
pub use lines::{LineProcessor, split_verse_number};
pub use nesting::{EndMarkerInserter, MAX_OPEN_DEPTH, OpenMarkerStack, insert_end_markers};
pub use notes::{Extracted, NoteExtractor};
pub use quotes::QuoteNormalizer;
pub use reorder::normalize_line_order;
