//! # bible-internals engine
//!
//! Turns a USFM book's raw `(marker, text)` lines into a flat, normalised
//! entry list with explicit closing entries, plus a chapter:verse index.
//!
//! ```text
//! Vec<RawLine> -> LineProcessor -> insert_end_markers -> build_index -> BibleBook
//! ```
//!
//! Problems in the markup never abort processing; they are collected as
//! [`Anomaly`] values on the book and logged through the `log` facade.

pub mod anomaly;
pub mod book;
pub mod config;
pub mod error;
pub mod index;
pub mod io;
pub mod markers;
pub mod models;
pub mod parsing;

pub use anomaly::{Anomaly, AnomalyKind, AnomalyLog, Location, Severity};
pub use book::BibleBook;
pub use config::ParserConfig;
pub use error::{LookupError, ProcessError};
pub use index::{CVIndex, IndexEntry};
pub use io::{IoError, RawBook, parse_usfm, read_usfm_file};
pub use markers::{MarkerClass, MarkerTable, UsfmMarkers};
pub use models::{Extra, ExtraKind, ProcessedEntry, RawLine};
