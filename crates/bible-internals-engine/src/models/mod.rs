//! # Book Data Model
//!
//! Plain data carried through the processing pipeline.
//!
//! - **`RawLine`**: one `(marker, text)` pair as handed over by a loader
//! - **`ProcessedEntry`**: a normalised entry in a book's flat entry list
//! - **`Extra`**: a footnote, cross-reference or similar annotation lifted out of body text
//!
//! Entries are stored in one contiguous `Vec` owned by the book; nesting is
//! expressed only by the `¬`-prefixed closing entries, never by child pointers.

pub mod entry;
pub mod extra;
pub mod raw_line;

pub use entry::ProcessedEntry;
pub use extra::{Extra, ExtraKind};
pub use raw_line::RawLine;
