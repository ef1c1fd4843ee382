//! Recoverable markup problems found while processing a book.
//!
//! Nothing recorded here stops processing; each anomaly has a defined
//! fallback and is collected on the book for callers to inspect. Every
//! recorded anomaly is also emitted through the `log` facade.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn log_level(self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    TrailingSpace,
    LeadingSpace,
    UnclosedNote,
    NoteCloseBeforeOpen,
    EmptyNote,
    NoteSpacing,
    SpaceBeforeNote,
    StrayNoteClose,
    AngleBrackets,
    UnreplacedAngleBrackets,
    StraightQuotes,
    UnknownCharacterMarker,
    MarkerInsideLine,
    MisplacedMarker,
    MissingChapterNumber,
    ChapterZeroPromoted,
    ChapterZero,
    ChapterOutOfSequence,
    MissingChapterBeforeFirstVerse,
    MissingVerseNumber,
    VerseOutOfSequence,
    CrossChapterVerseRange,
    LinesReordered,
    StructuralOverlap,
    UnmatchedClose,
    DuplicateVerse,
    DuplicateChapter,
    NestingError,
    MultipleVersesInKey,
    NonNumericReference,
    MisplacedChapterDisplay,
    ConsecutiveBodyText,
    ReferenceMismatch,
}

impl AnomalyKind {
    pub fn severity(self) -> Severity {
        use AnomalyKind::*;
        match self {
            AngleBrackets | StraightQuotes | LinesReordered => Severity::Info,
            MarkerInsideLine | MissingChapterNumber | ChapterZero | MissingVerseNumber
            | UnmatchedClose | NestingError | MultipleVersesInKey | ReferenceMismatch => {
                Severity::Error
            }
            _ => Severity::Warning,
        }
    }

    pub fn description(self) -> &'static str {
        use AnomalyKind::*;
        match self {
            TrailingSpace => "trailing space",
            LeadingSpace => "leading space",
            UnclosedNote => "note has no closing marker",
            NoteCloseBeforeOpen => "note closing marker before opening marker",
            EmptyNote => "empty note",
            NoteSpacing => "note content has surrounding space",
            SpaceBeforeNote => "space before note",
            StrayNoteClose => "closing note marker without an opening marker",
            AngleBrackets => "book uses angle bracket quotes",
            UnreplacedAngleBrackets => "angle brackets in text",
            StraightQuotes => "book uses straight quotes",
            UnknownCharacterMarker => "unknown character marker",
            MarkerInsideLine => "newline marker inside line",
            MisplacedMarker => "character marker used as a line marker",
            MissingChapterNumber => "missing chapter number",
            ChapterZeroPromoted => "chapter 0 treated as chapter 1",
            ChapterZero => "invalid chapter 0",
            ChapterOutOfSequence => "chapter out of sequence",
            MissingChapterBeforeFirstVerse => "missing chapter before first verse",
            MissingVerseNumber => "missing verse number",
            VerseOutOfSequence => "verse out of sequence",
            CrossChapterVerseRange => "verse range runs into another chapter",
            LinesReordered => "source lines reordered",
            StructuralOverlap => "structural markers overlap",
            UnmatchedClose => "closing marker without an open marker",
            DuplicateVerse => "duplicate verse",
            DuplicateChapter => "duplicate chapter",
            NestingError => "nesting error",
            MultipleVersesInKey => "several verses under one index key",
            NonNumericReference => "non-numeric chapter or verse",
            MisplacedChapterDisplay => "chapter number display not followed by a verse",
            ConsecutiveBodyText => "body text follows body text without a verse",
            ReferenceMismatch => "chapter or verse number differs from its index key",
        }
    }
}

/// Chapter and verse where an anomaly was found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub chapter: String,
    pub verse: String,
}

impl Location {
    pub fn new(chapter: impl Into<String>, verse: impl Into<String>) -> Self {
        Self {
            chapter: chapter.into(),
            verse: verse.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub location: Location,
    pub marker: String,
    pub detail: String,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {} \\{}: {}",
            self.severity,
            self.location,
            self.marker,
            self.kind.description()
        )?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Per-book list of anomalies in the order they were found.
#[derive(Debug, Clone, Default)]
pub struct AnomalyLog {
    items: Vec<Anomaly>,
}

impl AnomalyLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        kind: AnomalyKind,
        location: &Location,
        marker: &str,
        detail: impl Into<String>,
    ) {
        let anomaly = Anomaly {
            kind,
            severity: kind.severity(),
            location: location.clone(),
            marker: marker.to_string(),
            detail: detail.into(),
        };
        log::log!(anomaly.severity.log_level(), "{anomaly}");
        self.items.push(anomaly);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anomaly> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Anomaly] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, kind: AnomalyKind) -> usize {
        self.items.iter().filter(|a| a.kind == kind).count()
    }

    pub fn contains(&self, kind: AnomalyKind) -> bool {
        self.count(kind) > 0
    }

    pub fn into_vec(self) -> Vec<Anomaly> {
        self.items
    }
}
