use crate::anomaly::Location;

/// Internal faults that abort processing of a book.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("open marker stack exceeded depth {limit} at {location}: {stack:?}")]
    StackDepthExceeded {
        limit: usize,
        location: Location,
        stack: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Reference not found: {chapter}:{verse}")]
    NotFound { chapter: String, verse: String },
}
