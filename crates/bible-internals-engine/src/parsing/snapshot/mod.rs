//! # Snapshot Testing Support
//!
//! Utilities for testing the pipeline via snapshot assertions and invariant checks.
//!
//! ## Modules
//!
//! - **`normalize`**: renders entry lists and indexes as stable text for `insta`
//!   inline snapshots
//! - **`invariants`**: panicking checks for pipeline correctness (balanced
//!   closing entries, extra offsets inside adjusted text, index covering
//!   every entry and every verse)
//!
//! Snapshots are the behavioural contract of the pipeline: they pin markers,
//! clean text and extras for each entry.

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{render, render_index};
