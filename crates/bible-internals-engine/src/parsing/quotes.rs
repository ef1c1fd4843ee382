use std::borrow::Cow;
use std::ops::Range;

use crate::anomaly::{AnomalyKind, AnomalyLog, Location};
use crate::config::ParserConfig;
use crate::markers::scan_markers;

use super::clean::ATTRIBUTE_SEPARATOR;

pub struct CurlyQuotes;

impl CurlyQuotes {
    pub const DOUBLE_OPEN: char = '“';
    pub const DOUBLE_CLOSE: char = '”';
    pub const SINGLE_OPEN: char = '‘';
    pub const SINGLE_CLOSE: char = '’';
    pub const STRAIGHT: char = '"';

    /// Characters after which a straight quote opens.
    const OPENS_AFTER: &'static [char] = &[' ', ';', '(', '['];
    /// Characters after which a straight quote closes.
    const CLOSES_AFTER: &'static [char] = &['.', ',', '?', '!', ')', ']', '*'];
    /// Characters before which a straight quote closes.
    const CLOSES_BEFORE: &'static [char] = &[' ', ';', '(', '[', ',', '.', '?', '!'];
}

/// Rewrites quote conventions once per line, reporting the first
/// occurrence in a book only once.
#[derive(Debug, Default)]
pub struct QuoteNormalizer {
    replace_angle_brackets: bool,
    replace_straight_quotes: bool,
    noted_angle_brackets: bool,
    noted_straight_quotes: bool,
}

impl QuoteNormalizer {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            replace_angle_brackets: config.replace_angle_brackets,
            replace_straight_quotes: config.replace_straight_quotes,
            ..Self::default()
        }
    }

    pub fn normalize<'t>(
        &mut self,
        marker: &str,
        text: &'t str,
        location: &Location,
        anomalies: &mut AnomalyLog,
    ) -> Cow<'t, str> {
        let mut out = Cow::Borrowed(text);

        if out.contains(['<', '>']) {
            if self.replace_angle_brackets {
                if !self.noted_angle_brackets {
                    anomalies.record(AnomalyKind::AngleBrackets, location, marker, "replaced");
                    self.noted_angle_brackets = true;
                }
                out = Cow::Owned(replace_angle_brackets(&out));
            } else {
                anomalies.record(AnomalyKind::UnreplacedAngleBrackets, location, marker, "");
            }
        }

        if has_prose_quote(&out) {
            if !self.noted_straight_quotes {
                let detail = if self.replace_straight_quotes {
                    "replaced"
                } else {
                    "found"
                };
                anomalies.record(AnomalyKind::StraightQuotes, location, marker, detail);
                self.noted_straight_quotes = true;
            }
            if self.replace_straight_quotes {
                out = Cow::Owned(replace_straight_quotes(&out));
            }
        }

        out
    }
}

pub fn replace_angle_brackets(text: &str) -> String {
    text.replace("<<", &CurlyQuotes::DOUBLE_OPEN.to_string())
        .replace(">>", &CurlyQuotes::DOUBLE_CLOSE.to_string())
        .replace('<', &CurlyQuotes::SINGLE_OPEN.to_string())
        .replace('>', &CurlyQuotes::SINGLE_CLOSE.to_string())
}

/// Byte ranges that are markup rather than prose: marker tokens and the
/// `|key="value"` attribute list before a closing marker.
fn markup_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut last = 0;
    for token in scan_markers(text) {
        if token.is_close()
            && let Some(bar) = text[last..token.start].find(ATTRIBUTE_SEPARATOR)
        {
            spans.push(last + bar..token.start);
        }
        spans.push(token.start..token.end);
        last = token.end;
    }
    spans
}

fn in_markup(spans: &[Range<usize>], at: usize) -> bool {
    spans.iter().any(|span| span.contains(&at))
}

/// Whether `text` has a straight double quote outside markup.
fn has_prose_quote(text: &str) -> bool {
    if !text.contains(CurlyQuotes::STRAIGHT) {
        return false;
    }
    let spans = markup_spans(text);
    text.match_indices(CurlyQuotes::STRAIGHT)
        .any(|(at, _)| !in_markup(&spans, at))
}

/// Curls straight double quotes whose direction is clear from a neighbouring
/// character. Ambiguous quotes and quotes inside markup are left alone.
pub fn replace_straight_quotes(text: &str) -> String {
    let spans = markup_spans(text);
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = String::with_capacity(text.len() + 8);

    for (i, &(at, ch)) in chars.iter().enumerate() {
        if ch != CurlyQuotes::STRAIGHT || in_markup(&spans, at) {
            out.push(ch);
            continue;
        }
        let prev = i.checked_sub(1).map(|p| chars[p].1);
        let next = chars.get(i + 1).map(|&(_, c)| c);

        let replacement = match prev {
            None => CurlyQuotes::DOUBLE_OPEN,
            Some(p) if CurlyQuotes::OPENS_AFTER.contains(&p) => CurlyQuotes::DOUBLE_OPEN,
            Some(p) if CurlyQuotes::CLOSES_AFTER.contains(&p) => CurlyQuotes::DOUBLE_CLOSE,
            _ if next.is_some_and(|n| CurlyQuotes::CLOSES_BEFORE.contains(&n)) => {
                CurlyQuotes::DOUBLE_CLOSE
            }
            _ => CurlyQuotes::STRAIGHT,
        };
        out.push(replacement);
    }

    out
}
