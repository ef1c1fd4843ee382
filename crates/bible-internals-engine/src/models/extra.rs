use std::fmt;

/// The kinds of annotation that are lifted out of body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtraKind {
    Footnote,
    EndNote,
    CrossReference,
    Figure,
    StrongsNumber,
    /// A published verse label such as `1a` that differs from the verse number.
    VerseCharacter,
}

impl ExtraKind {
    pub const ALL: [ExtraKind; 6] = [
        ExtraKind::Footnote,
        ExtraKind::EndNote,
        ExtraKind::CrossReference,
        ExtraKind::Figure,
        ExtraKind::StrongsNumber,
        ExtraKind::VerseCharacter,
    ];

    /// The inline marker that delimits this kind, e.g. `f` for `\f ...\f*`.
    pub fn marker(self) -> &'static str {
        match self {
            ExtraKind::Footnote => "f",
            ExtraKind::EndNote => "fe",
            ExtraKind::CrossReference => "x",
            ExtraKind::Figure => "fig",
            ExtraKind::StrongsNumber => "str",
            ExtraKind::VerseCharacter => "vp",
        }
    }

    /// Short tag used in diagnostics and rendered dumps.
    pub fn tag(self) -> &'static str {
        match self {
            ExtraKind::Footnote => "fn",
            ExtraKind::EndNote => "en",
            ExtraKind::CrossReference => "xr",
            ExtraKind::Figure => "fig",
            ExtraKind::StrongsNumber => "str",
            ExtraKind::VerseCharacter => "vp",
        }
    }

    /// Matches an inline marker name, ignoring ASCII case.
    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.marker().eq_ignore_ascii_case(marker))
    }

    /// Footnote-like kinds start their content with a caller character.
    pub fn has_caller(self) -> bool {
        matches!(
            self,
            ExtraKind::Footnote | ExtraKind::EndNote | ExtraKind::CrossReference
        )
    }
}

impl fmt::Display for ExtraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// An annotation excised from an entry's body text.
///
/// `offset` is a byte offset into the owning entry's adjusted text marking
/// where the annotation used to sit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extra {
    pub kind: ExtraKind,
    pub offset: usize,
    pub raw_text: String,
    pub clean_text: String,
}

impl Extra {
    /// Rebuilds the inline markup this extra was extracted from.
    pub fn to_markup(&self) -> String {
        let marker = self.kind.marker();
        format!("\\{marker} {}\\{marker}*", self.raw_text)
    }
}
