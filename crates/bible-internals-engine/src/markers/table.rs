use crate::models::ExtraKind;

use super::class::{AddedKind, END_SIGIL, MarkerClass};

/// Marker vocabulary consulted by every processing stage.
pub trait MarkerTable {
    fn classify(&self, marker: &str) -> MarkerClass;

    /// Standard form of `marker`, e.g. `q` becomes `q1`. Unknown markers are
    /// returned unchanged.
    fn to_standard(&self, marker: &str) -> String;

    fn is_newline_marker(&self, marker: &str) -> bool {
        self.classify(marker).is_newline()
    }
}

/// How an un-numbered form of a numbered marker is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bare {
    /// `q` means `q1`.
    First,
    /// `h` is valid on its own and stays `h`.
    Own,
    /// `toc` without a number is not a marker.
    Invalid,
}

#[derive(Debug, Clone, Copy)]
struct Numbered {
    base: &'static str,
    max: u8,
    bare: Bare,
}

const fn numbered(base: &'static str, max: u8, bare: Bare) -> Numbered {
    Numbered { base, max, bare }
}

const FIELD: &[&str] = &[
    "id", "ide", "sts", "rem", "usfm", "restore", "lit", "cl", "cp", "cd", "d", "sp", "r", "sr",
    "mr", "qa", "periph",
];
const FIELD_NUMBERED: &[Numbered] = &[
    numbered("h", 3, Bare::Own),
    numbered("toc", 3, Bare::Invalid),
    numbered("toca", 3, Bare::Invalid),
    numbered("mt", 4, Bare::First),
    numbered("mte", 2, Bare::First),
    numbered("sd", 4, Bare::First),
];

const PARAGRAPH: &[&str] = &[
    "p", "m", "po", "pr", "cls", "pmo", "pm", "pmc", "pmr", "mi", "nb", "pc", "qr", "qc", "qd",
    "lh", "lf", "b",
];
const PARAGRAPH_NUMBERED: &[Numbered] = &[
    numbered("pi", 3, Bare::First),
    numbered("ph", 3, Bare::First),
    numbered("q", 4, Bare::First),
    numbered("qm", 3, Bare::First),
    numbered("li", 4, Bare::First),
    numbered("lim", 4, Bare::First),
];

const HEADING_NUMBERED: &[Numbered] = &[numbered("s", 4, Bare::First), numbered("ms", 3, Bare::First)];

const INTRODUCTION: &[&str] = &[
    "ip", "ipi", "im", "imi", "ipq", "imq", "ipr", "ipc", "ib", "iot", "iex", "ie",
];
const INTRODUCTION_NUMBERED: &[Numbered] = &[
    numbered("imt", 4, Bare::First),
    numbered("imte", 2, Bare::First),
    numbered("is", 2, Bare::First),
    numbered("iq", 3, Bare::First),
    numbered("ili", 2, Bare::First),
    numbered("io", 4, Bare::First),
];

const CHARACTER: &[&str] = &[
    "add", "bk", "dc", "k", "nd", "ord", "pn", "png", "addpn", "qt", "sig", "sls", "tl", "wj",
    "em", "bd", "it", "bdit", "no", "sc", "sup", "w", "wg", "wh", "wa", "rb", "pro", "qs", "qac",
    "litl", "lik", "ior", "iqt", "rq", "ca", "va", "cat", "ndx", "jmp", "fr", "fq", "fqa", "fk",
    "fl", "fw", "fp", "fv", "ft", "fdc", "fm", "xo", "xk", "xq", "xt", "xta", "xop", "xot", "xnt",
    "xdc",
];
const CHARACTER_NUMBERED: &[Numbered] = &[numbered("liv", 4, Bare::First)];

/// The USFM 3 marker vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsfmMarkers;

impl UsfmMarkers {
    /// Looks `marker` up in the numbered tables, returning its standard form.
    fn standard_numbered(table: &[Numbered], marker: &str) -> Option<String> {
        let digits_at = marker
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(marker.len());
        let (base, digits) = marker.split_at(digits_at);
        let entry = table.iter().find(|n| n.base == base)?;

        if digits.is_empty() {
            return match entry.bare {
                Bare::First => Some(format!("{base}1")),
                Bare::Own => Some(base.to_string()),
                Bare::Invalid => None,
            };
        }

        let level: u8 = digits.parse().ok()?;
        (1..=entry.max)
            .contains(&level)
            .then(|| marker.to_string())
    }

    fn lookup(exact: &[&str], numbered: &[Numbered], marker: &str) -> Option<String> {
        if exact.contains(&marker) {
            return Some(marker.to_string());
        }
        Self::standard_numbered(numbered, marker)
    }

    /// Classification plus standard form of a source marker.
    fn resolve(&self, marker: &str) -> (MarkerClass, String) {
        match marker {
            "c" => return (MarkerClass::Chapter, marker.to_string()),
            "v" => return (MarkerClass::Verse, marker.to_string()),
            _ => {}
        }

        if let Some(kind) = ExtraKind::from_marker(marker)
            && kind.marker() == marker
        {
            return (MarkerClass::Note(kind), marker.to_string());
        }

        let tables: [(&[&str], &[Numbered], MarkerClass); 5] = [
            (PARAGRAPH, PARAGRAPH_NUMBERED, MarkerClass::Paragraph),
            (&[], HEADING_NUMBERED, MarkerClass::Heading),
            (INTRODUCTION, INTRODUCTION_NUMBERED, MarkerClass::Introduction),
            (FIELD, FIELD_NUMBERED, MarkerClass::Field),
            (CHARACTER, CHARACTER_NUMBERED, MarkerClass::Character),
        ];
        for (exact, numbered, class) in tables {
            if let Some(standard) = Self::lookup(exact, numbered, marker) {
                return (class, standard);
            }
        }

        (MarkerClass::Opaque(marker.to_string()), marker.to_string())
    }
}

impl MarkerTable for UsfmMarkers {
    fn classify(&self, marker: &str) -> MarkerClass {
        if let Some(closed) = marker.strip_prefix(END_SIGIL) {
            return MarkerClass::Closing(closed.to_string());
        }
        if let Some(kind) = AddedKind::from_marker(marker) {
            return MarkerClass::Added(kind);
        }
        self.resolve(marker).0
    }

    fn to_standard(&self, marker: &str) -> String {
        self.resolve(marker).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("s", "s1")]
    #[case("s2", "s2")]
    #[case("q", "q1")]
    #[case("pi", "pi1")]
    #[case("li", "li1")]
    #[case("mt", "mt1")]
    #[case("imt", "imt1")]
    #[case("is", "is1")]
    #[case("io", "io1")]
    #[case("ms", "ms1")]
    #[case("h", "h")]
    #[case("p", "p")]
    #[case("v", "v")]
    #[case("zzz", "zzz")]
    fn standard_forms(#[case] marker: &str, #[case] expected: &str) {
        assert_eq!(UsfmMarkers.to_standard(marker), expected);
    }

    #[rstest]
    #[case("c", MarkerClass::Chapter)]
    #[case("v", MarkerClass::Verse)]
    #[case("p", MarkerClass::Paragraph)]
    #[case("q2", MarkerClass::Paragraph)]
    #[case("b", MarkerClass::Paragraph)]
    #[case("s1", MarkerClass::Heading)]
    #[case("ms", MarkerClass::Heading)]
    #[case("ip", MarkerClass::Introduction)]
    #[case("is1", MarkerClass::Introduction)]
    #[case("id", MarkerClass::Field)]
    #[case("toc1", MarkerClass::Field)]
    #[case("mt1", MarkerClass::Field)]
    #[case("cp", MarkerClass::Field)]
    #[case("nd", MarkerClass::Character)]
    #[case("ft", MarkerClass::Character)]
    #[case("f", MarkerClass::Note(ExtraKind::Footnote))]
    #[case("fig", MarkerClass::Note(ExtraKind::Figure))]
    #[case("vp", MarkerClass::Note(ExtraKind::VerseCharacter))]
    #[case("v~", MarkerClass::Added(AddedKind::VerseText))]
    #[case("intro", MarkerClass::Added(AddedKind::Intro))]
    #[case("iot", MarkerClass::Added(AddedKind::IntroOutline))]
    #[case("cl¤", MarkerClass::Added(AddedKind::BookChapterLabel))]
    #[case("¬s1", MarkerClass::Closing("s1".into()))]
    fn classification(#[case] marker: &str, #[case] expected: MarkerClass) {
        assert_eq!(UsfmMarkers.classify(marker), expected);
    }

    #[rstest]
    #[case("q5")]
    #[case("s0")]
    #[case("toc")]
    #[case("F")]
    #[case("xyz")]
    fn unknown_markers_are_opaque(#[case] marker: &str) {
        assert_eq!(
            UsfmMarkers.classify(marker),
            MarkerClass::Opaque(marker.to_string())
        );
    }

    #[test]
    fn newline_markers() {
        assert!(UsfmMarkers.is_newline_marker("p"));
        assert!(UsfmMarkers.is_newline_marker("v"));
        assert!(UsfmMarkers.is_newline_marker("rem"));
        assert!(UsfmMarkers.is_newline_marker("iot"));
        assert!(!UsfmMarkers.is_newline_marker("nd"));
        assert!(!UsfmMarkers.is_newline_marker("f"));
        assert!(!UsfmMarkers.is_newline_marker("unknown"));
    }
}
