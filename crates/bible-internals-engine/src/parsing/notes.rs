//! Lifts footnotes, cross-references and similar spans out of body text.

use std::ops::Range;

use crate::anomaly::{AnomalyKind, AnomalyLog, Location};
use crate::config::ParserConfig;
use crate::markers::{MarkerTable, MarkerToken, TokenKind, scan_markers};
use crate::models::{Extra, ExtraKind};

use super::clean::{ATTRIBUTE_SEPARATOR, clean_text, unknown_character_markers};
use super::quotes::QuoteNormalizer;

/// Result of extracting one line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extracted {
    pub adjusted: String,
    pub clean: String,
    pub extras: Vec<Extra>,
}

/// One note span located in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NoteMatch {
    kind: ExtraKind,
    /// Everything removed from the line, delimiters included.
    span: Range<usize>,
    /// The note content between the delimiters.
    body: Range<usize>,
    recovery: Option<AnomalyKind>,
}

/// Per-book extractor; remembers which once-per-book notices were given.
pub struct NoteExtractor<'t> {
    table: &'t dyn MarkerTable,
    quotes: QuoteNormalizer,
    strict: bool,
}

impl<'t> NoteExtractor<'t> {
    pub fn new(config: &ParserConfig, table: &'t dyn MarkerTable) -> Self {
        Self {
            table,
            quotes: QuoteNormalizer::new(config),
            strict: config.strict_checking,
        }
    }

    pub fn extract(
        &mut self,
        marker: &str,
        text: &str,
        location: &Location,
        anomalies: &mut AnomalyLog,
    ) -> Extracted {
        let mut adjusted = self
            .quotes
            .normalize(marker, text, location, anomalies)
            .into_owned();
        let mut extras: Vec<Extra> = vec![];

        while let Some(found) = find_note(&adjusted) {
            if let Some(kind) = found.recovery {
                anomalies.record(kind, location, marker, found.kind.marker());
            }

            let untrimmed = &adjusted[found.body.clone()];
            let raw = untrimmed.trim();
            if raw.is_empty() {
                anomalies.record(AnomalyKind::EmptyNote, location, marker, found.kind.marker());
            } else if self.strict && raw.len() != untrimmed.len() {
                anomalies.record(AnomalyKind::NoteSpacing, location, marker, raw);
            }
            if self.strict
                && found.kind == ExtraKind::Footnote
                && adjusted[..found.span.start].ends_with(' ')
            {
                anomalies.record(AnomalyKind::SpaceBeforeNote, location, marker, "");
            }

            let extra = Extra {
                kind: found.kind,
                offset: found.span.start,
                raw_text: raw.to_string(),
                clean_text: note_clean_text(found.kind, raw),
            };
            adjusted.replace_range(found.span.clone(), "");
            shift_offsets(&mut extras, found.span.start, found.span.len());
            extras.push(extra);
        }

        for stray in scan_markers(&adjusted).iter().filter(|t| is_note_close(t)) {
            anomalies.record(AnomalyKind::StrayNoteClose, location, marker, stray.name);
        }

        trim_adjusted(&mut adjusted, &mut extras, marker, location, anomalies);

        if self.strict {
            for name in unknown_character_markers(&adjusted, self.table) {
                anomalies.record(AnomalyKind::UnknownCharacterMarker, location, marker, name);
            }
        }

        extras.sort_by_key(|extra| extra.offset);
        Extracted {
            clean: clean_text(&adjusted),
            adjusted,
            extras,
        }
    }
}

fn note_kind(token: &MarkerToken<'_>) -> Option<ExtraKind> {
    if token.nested {
        return None;
    }
    ExtraKind::from_marker(token.name)
}

fn is_note_close(token: &MarkerToken<'_>) -> bool {
    token.is_close() && note_kind(token).is_some()
}

/// Finds the earliest note opener in `text` and the span it covers.
fn find_note(text: &str) -> Option<NoteMatch> {
    let tokens = scan_markers(text);
    let open_ix = tokens
        .iter()
        .position(|t| t.kind == TokenKind::Open && note_kind(t).is_some())?;
    let open = tokens[open_ix];
    let kind = note_kind(&open)?;
    let closes = |t: &&MarkerToken<'_>| is_note_close(t) && note_kind(t) == Some(kind);

    if let Some(close) = tokens[open_ix + 1..].iter().find(closes) {
        return Some(NoteMatch {
            kind,
            span: open.start..close.end,
            body: open.end..close.start,
            recovery: None,
        });
    }

    if let Some(close) = tokens[..open_ix].iter().rev().find(closes) {
        return Some(NoteMatch {
            kind,
            span: close.start..open.end,
            body: close.end..open.start,
            recovery: Some(AnomalyKind::NoteCloseBeforeOpen),
        });
    }

    Some(NoteMatch {
        kind,
        span: open.start..text.len(),
        body: open.end..text.len(),
        recovery: Some(AnomalyKind::UnclosedNote),
    })
}

/// Kind and length of a complete note at the very start of `text`.
pub fn leading_note(text: &str) -> Option<(ExtraKind, usize)> {
    let found = find_note(text)?;
    (found.span.start == 0 && found.recovery.is_none()).then_some((found.kind, found.span.end))
}

/// Keeps offsets pointing at the same text after `removed` bytes at `at` are cut.
fn shift_offsets(extras: &mut [Extra], at: usize, removed: usize) {
    for extra in extras.iter_mut().filter(|e| e.offset > at) {
        extra.offset = extra.offset.saturating_sub(removed).max(at);
    }
}

fn trim_adjusted(
    adjusted: &mut String,
    extras: &mut [Extra],
    marker: &str,
    location: &Location,
    anomalies: &mut AnomalyLog,
) {
    let leading = adjusted.len() - adjusted.trim_start().len();
    if leading > 0 {
        anomalies.record(AnomalyKind::LeadingSpace, location, marker, "");
        adjusted.drain(..leading);
        for extra in extras.iter_mut() {
            extra.offset = extra.offset.saturating_sub(leading);
        }
    }

    let kept = adjusted.trim_end().len();
    if kept < adjusted.len() {
        anomalies.record(AnomalyKind::TrailingSpace, location, marker, "");
        adjusted.truncate(kept);
        for extra in extras.iter_mut() {
            extra.offset = extra.offset.min(kept);
        }
    }
}

/// Clean text of a note body: caller and nested formatting removed.
fn note_clean_text(kind: ExtraKind, raw: &str) -> String {
    let body = match kind {
        ExtraKind::Figure => figure_caption(raw),
        _ if kind.has_caller() => strip_caller(raw),
        _ => raw,
    };
    clean_text(body).trim().to_string()
}

/// Drops a leading caller such as `+`, `-`, `*` or `a` before the note content.
fn strip_caller(raw: &str) -> &str {
    let mut chars = raw.chars();
    let (Some(caller), Some(' ')) = (chars.next(), chars.next()) else {
        return raw;
    };
    let rest = &raw[caller.len_utf8() + 1..];
    if matches!(caller, '+' | '-' | '*') || rest.starts_with('\\') {
        rest
    } else {
        raw
    }
}

/// Caption of a figure in either the USFM 3 (`caption|src="..."`) or the
/// USFM 2 (`DESC|FILE|SIZE|LOC|COPY|CAP|REF`) form.
fn figure_caption(raw: &str) -> &str {
    let fields: Vec<&str> = raw.split(ATTRIBUTE_SEPARATOR).collect();
    if fields.len() >= 6 && !fields[1].contains('=') {
        fields[5]
    } else {
        fields[0]
    }
}
