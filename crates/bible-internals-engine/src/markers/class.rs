use crate::models::ExtraKind;

/// Closing entries are named after the marker they close with this prefix.
pub const END_SIGIL: char = '¬';

/// Synthetic markers produced while processing a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddedKind {
    /// `c~`: text following the number on a chapter line.
    ChapterRemainder,
    /// `c#`: chapter number to display, emitted before the chapter's first verse.
    ChapterDisplay,
    /// `v~`: verse body text.
    VerseText,
    /// `p~`: paragraph body text.
    ParagraphText,
    /// `vp#`: published verse label, emitted before its verse.
    VerseLabel,
    /// `cl¤`: a chapter label given before the first chapter, naming every
    /// chapter of the book (e.g. "Psalm").
    BookChapterLabel,
    /// `intro`: opens the book introduction.
    Intro,
    /// `ilist`: wraps a run of introduction list items.
    IntroList,
    /// `iot`: wraps the introduction outline. A source `\iot` title opens it.
    IntroOutline,
    /// `list`: wraps a run of list paragraphs.
    List,
}

impl AddedKind {
    pub const ALL: [AddedKind; 10] = [
        AddedKind::ChapterRemainder,
        AddedKind::ChapterDisplay,
        AddedKind::VerseText,
        AddedKind::ParagraphText,
        AddedKind::VerseLabel,
        AddedKind::BookChapterLabel,
        AddedKind::Intro,
        AddedKind::IntroList,
        AddedKind::IntroOutline,
        AddedKind::List,
    ];

    /// Wrappers opened around a run of member markers.
    pub const WRAPPERS: [AddedKind; 3] = [AddedKind::IntroList, AddedKind::IntroOutline, AddedKind::List];

    pub fn marker(self) -> &'static str {
        match self {
            AddedKind::ChapterRemainder => "c~",
            AddedKind::ChapterDisplay => "c#",
            AddedKind::VerseText => "v~",
            AddedKind::ParagraphText => "p~",
            AddedKind::VerseLabel => "vp#",
            AddedKind::BookChapterLabel => "cl¤",
            AddedKind::Intro => "intro",
            AddedKind::IntroList => "ilist",
            AddedKind::IntroOutline => "iot",
            AddedKind::List => "list",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == marker)
    }

    /// Entries that carry running body text.
    pub fn is_body_text(self) -> bool {
        matches!(self, AddedKind::VerseText | AddedKind::ParagraphText)
    }

    /// Synthetic markers that open a region closed by a `¬` entry.
    pub fn opens_region(self) -> bool {
        matches!(
            self,
            AddedKind::Intro | AddedKind::IntroList | AddedKind::IntroOutline | AddedKind::List
        )
    }

    /// Regions that belong inside the book introduction.
    pub fn is_introduction(self) -> bool {
        matches!(
            self,
            AddedKind::Intro | AddedKind::IntroList | AddedKind::IntroOutline
        )
    }

    /// Whether this wrapper holds entries with the standard marker `marker`.
    pub fn wraps(self, marker: &str) -> bool {
        match self {
            AddedKind::IntroList => numbered_form(marker, "ili"),
            AddedKind::IntroOutline => numbered_form(marker, "io"),
            AddedKind::List => {
                numbered_form(marker, "li") || numbered_form(marker, "lim") || matches!(marker, "lh" | "lf")
            }
            _ => false,
        }
    }

    /// The wrapper that `marker` belongs in, if any.
    pub fn wrapper_for(marker: &str) -> Option<Self> {
        Self::WRAPPERS.into_iter().find(|kind| kind.wraps(marker))
    }
}

/// `base` followed by a level number, as in `io2`.
fn numbered_form(marker: &str, base: &str) -> bool {
    marker
        .strip_prefix(base)
        .is_some_and(|level| !level.is_empty() && level.bytes().all(|b| b.is_ascii_digit()))
}

/// What a marker means to the line processor and the end-marker pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerClass {
    Chapter,
    Verse,
    /// Bible paragraph styles, including poetry, list items and blank lines.
    Paragraph,
    /// Section headings (`s1`..`s4`, `ms1`..`ms3`).
    Heading,
    /// Book introduction paragraphs, headings and outlines.
    Introduction,
    /// Any other newline marker: identification, titles, references, remarks.
    Field,
    /// Inline character styling.
    Character,
    /// Inline notes and other spans lifted out as extras.
    Note(ExtraKind),
    Added(AddedKind),
    /// A `¬`-prefixed closing entry for the named marker.
    Closing(String),
    Opaque(String),
}

impl MarkerClass {
    /// Markers that must start a new line in well-formed input.
    pub fn is_newline(&self) -> bool {
        matches!(
            self,
            MarkerClass::Chapter
                | MarkerClass::Verse
                | MarkerClass::Paragraph
                | MarkerClass::Heading
                | MarkerClass::Introduction
                | MarkerClass::Field
                | MarkerClass::Added(AddedKind::IntroOutline)
        )
    }

    /// Markers that open a region closed by a `¬` entry.
    pub fn is_structural(&self) -> bool {
        match self {
            MarkerClass::Chapter
            | MarkerClass::Verse
            | MarkerClass::Paragraph
            | MarkerClass::Heading => true,
            MarkerClass::Added(kind) => kind.opens_region(),
            _ => false,
        }
    }

    pub fn is_body_text(&self) -> bool {
        matches!(self, MarkerClass::Added(kind) if kind.is_body_text())
    }
}
