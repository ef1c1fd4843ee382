//! # Marker Vocabulary
//!
//! Classification of USFM markers and scanning of inline marker tokens.
//!
//! ## Modules
//!
//! - **`class`**: `MarkerClass` and the synthetic markers added during processing
//! - **`table`**: the `MarkerTable` trait and the built-in `UsfmMarkers` vocabulary
//! - **`scan`**: finds `\marker `, `\marker*` and `\+marker` tokens inside text
//! - **`cursor`**: byte cursor used by the scanner
//!
//! ## Key Invariants
//!
//! - Classification never fails: anything outside the vocabulary is `Opaque`
//! - Closing entries (`¬X`) and synthetic markers are recognised before the vocabulary

pub mod class;
pub mod cursor;
pub mod scan;
pub mod table;

pub use class::{AddedKind, END_SIGIL, MarkerClass};
pub use scan::{MarkerToken, TokenKind, scan_markers};
pub use table::{MarkerTable, UsfmMarkers};
