//! Per-line driver: turns each raw line into one or more processed entries.
//!
//! ## Key Invariants
//!
//! - A `v` entry always holds just the verse number (plus any note attached
//!   directly to it); verse text goes into a following `v~` entry
//! - A paragraph entry never carries text; its text goes into a following `p~` entry
//! - Every `v` entry is preceded somewhere by a `c` entry, synthesised if needed

use crate::anomaly::{AnomalyKind, AnomalyLog, Location};
use crate::config::ParserConfig;
use crate::markers::cursor::Cursor;
use crate::markers::{AddedKind, MarkerClass, MarkerTable, TokenKind, scan_markers};
use crate::models::{Extra, ExtraKind, ProcessedEntry, RawLine};

use super::notes::{Extracted, NoteExtractor, leading_note};

/// A `\c 0` within this many entries of the start is taken to mean chapter 1.
pub const EARLY_CHAPTER_ZERO_WINDOW: usize = 30;

/// Chapter and verse context carried across lines.
#[derive(Debug)]
struct StateTracker {
    chapter: String,
    verse: String,
    chapter_number: Option<u32>,
    last_verse_end: Option<u32>,
    waiting_chapter_display: Option<String>,
    chapter_opened: bool,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self {
            chapter: "0".to_string(),
            verse: "0".to_string(),
            chapter_number: None,
            last_verse_end: None,
            waiting_chapter_display: None,
            chapter_opened: false,
        }
    }
}

impl StateTracker {
    fn location(&self) -> Location {
        Location::new(self.chapter.as_str(), self.verse.as_str())
    }

    fn open_chapter(&mut self, chapter: &str, number: Option<u32>) {
        self.chapter = chapter.to_string();
        self.verse = "0".to_string();
        if number.is_some() {
            self.chapter_number = number;
        }
        self.last_verse_end = None;
        self.waiting_chapter_display = Some(chapter.to_string());
        self.chapter_opened = true;
    }

    fn next_chapter_number(&self) -> u32 {
        self.chapter_number.map_or(1, |n| n + 1)
    }
}

pub struct LineProcessor<'t> {
    table: &'t dyn MarkerTable,
    extractor: NoteExtractor<'t>,
    state: StateTracker,
    entries: Vec<ProcessedEntry>,
}

impl<'t> LineProcessor<'t> {
    pub fn new(config: &ParserConfig, table: &'t dyn MarkerTable) -> Self {
        Self {
            table,
            extractor: NoteExtractor::new(config, table),
            state: StateTracker::default(),
            entries: vec![],
        }
    }

    pub fn push(&mut self, line: &RawLine, anomalies: &mut AnomalyLog) {
        self.push_parts(&line.marker, &line.text, anomalies);
    }

    pub fn finish(self) -> Vec<ProcessedEntry> {
        self.entries
    }

    fn push_parts(&mut self, original_marker: &str, text: &str, anomalies: &mut AnomalyLog) {
        if let Some((head, inner, tail)) = self.split_embedded(text) {
            anomalies.record(
                AnomalyKind::MarkerInsideLine,
                &self.state.location(),
                original_marker,
                format!("\\{inner}"),
            );
            self.push_parts(original_marker, head.trim_end(), anomalies);
            self.push_parts(inner, tail, anomalies);
            return;
        }

        let marker = self.table.to_standard(original_marker);
        match self.table.classify(original_marker) {
            MarkerClass::Chapter => self.push_chapter(original_marker, text, anomalies),
            MarkerClass::Verse => self.push_verse(original_marker, text, anomalies),
            MarkerClass::Paragraph => self.push_paragraph(&marker, original_marker, text, anomalies),
            MarkerClass::Character | MarkerClass::Note(_) => {
                anomalies.record(
                    AnomalyKind::MisplacedMarker,
                    &self.state.location(),
                    original_marker,
                    "",
                );
                self.push_entry(&marker, original_marker, text, anomalies);
            }
            MarkerClass::Field if marker == "cl" && !self.state.chapter_opened => {
                let label = AddedKind::BookChapterLabel.marker();
                self.push_entry(label, original_marker, text, anomalies);
            }
            MarkerClass::Field if marker == "cp" => {
                if self.state.waiting_chapter_display.is_some() {
                    self.state.waiting_chapter_display = Some(text.trim().to_string());
                }
                self.push_entry(&marker, original_marker, text, anomalies);
            }
            MarkerClass::Heading
            | MarkerClass::Introduction
            | MarkerClass::Field
            | MarkerClass::Added(_)
            | MarkerClass::Closing(_)
            | MarkerClass::Opaque(_) => self.push_entry(&marker, original_marker, text, anomalies),
        }
    }

    /// Finds the first newline marker inside `text`, returning the text
    /// before it, its name, and the text after it.
    fn split_embedded<'a>(&self, text: &'a str) -> Option<(&'a str, &'a str, &'a str)> {
        scan_markers(text)
            .into_iter()
            .find(|t| {
                !t.nested
                    && t.kind != TokenKind::Close
                    && self.table.is_newline_marker(t.name)
            })
            .map(|t| (&text[..t.start], t.name, &text[t.end..]))
    }

    fn extract(&mut self, original_marker: &str, text: &str, anomalies: &mut AnomalyLog) -> Extracted {
        let location = self.state.location();
        self.extractor.extract(original_marker, text, &location, anomalies)
    }

    fn push_entry(
        &mut self,
        marker: &str,
        original_marker: &str,
        text: &str,
        anomalies: &mut AnomalyLog,
    ) {
        let extracted = self.extract(original_marker, text, anomalies);
        self.entries
            .push(entry_from(marker, original_marker, extracted, text));
    }

    fn push_chapter(&mut self, original_marker: &str, text: &str, anomalies: &mut AnomalyLog) {
        let text = text.trim_start();
        let mut cur = Cursor::new(text, 0);
        let digits = cur.bump_while(|b| b.is_ascii_digit());

        let (mut chapter, mut number, remainder) = match digits.parse::<u32>() {
            Ok(n) => (digits.to_string(), n, &text[digits.len()..]),
            Err(_) => {
                let n = self.state.next_chapter_number();
                anomalies.record(
                    AnomalyKind::MissingChapterNumber,
                    &self.state.location(),
                    original_marker,
                    format!("using {n}"),
                );
                (n.to_string(), n, text)
            }
        };

        if number == 0 {
            if self.entries.len() < EARLY_CHAPTER_ZERO_WINDOW {
                anomalies.record(
                    AnomalyKind::ChapterZeroPromoted,
                    &self.state.location(),
                    original_marker,
                    "",
                );
                chapter = "1".to_string();
                number = 1;
            } else {
                anomalies.record(
                    AnomalyKind::ChapterZero,
                    &self.state.location(),
                    original_marker,
                    "",
                );
            }
        }

        if let Some(previous) = self.state.chapter_number
            && number <= previous
        {
            anomalies.record(
                AnomalyKind::ChapterOutOfSequence,
                &self.state.location(),
                original_marker,
                format!("chapter {chapter} after chapter {previous}"),
            );
        }

        self.state.open_chapter(&chapter, Some(number));
        self.entries.push(ProcessedEntry {
            marker: "c".to_string(),
            original_marker: original_marker.to_string(),
            adjusted_text: chapter.clone(),
            clean_text: chapter,
            extras: vec![],
            original_text: text.to_string(),
        });

        let remainder = remainder.trim();
        if !remainder.is_empty() {
            self.push_parts(AddedKind::ChapterRemainder.marker(), remainder, anomalies);
        }
    }

    fn push_verse(&mut self, original_marker: &str, text: &str, anomalies: &mut AnomalyLog) {
        let text = text.trim_start();
        let (number, rest) = match split_verse_number(text) {
            Some(split) => split,
            None => {
                let token = text.split_whitespace().next().unwrap_or_default();
                anomalies.record(
                    AnomalyKind::MissingVerseNumber,
                    &self.state.location(),
                    original_marker,
                    text,
                );
                if token.is_empty() {
                    return;
                }
                (token, &text[token.len()..])
            }
        };

        // A note written straight after the number stays with the number.
        let (number_markup, rest) = match leading_note(rest) {
            Some((kind, len)) if kind != ExtraKind::VerseCharacter => {
                (&text[..number.len() + len], &rest[len..])
            }
            _ => (number, rest),
        };
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        let (label_markup, rest) = match leading_note(rest) {
            Some((ExtraKind::VerseCharacter, len)) => {
                let after = &rest[len..];
                (&rest[..len], after.strip_prefix(' ').unwrap_or(after))
            }
            _ => ("", rest),
        };

        if !self.state.chapter_opened {
            self.synthesize_chapter(original_marker, number, anomalies);
        }
        self.check_verse_sequence(original_marker, number, anomalies);
        self.state.verse = number.to_string();

        let body = if rest.trim().is_empty() {
            if !rest.is_empty() {
                anomalies.record(
                    AnomalyKind::TrailingSpace,
                    &self.state.location(),
                    original_marker,
                    "",
                );
            }
            None
        } else {
            Some(self.extract(original_marker, rest, anomalies))
        };
        let number_part = self.extract(original_marker, number_markup, anomalies);
        let mut labels = if label_markup.is_empty() {
            vec![]
        } else {
            self.extract(original_marker, label_markup, anomalies).extras
        };

        if let Some(display) = self.state.waiting_chapter_display.take() {
            self.entries.push(ProcessedEntry::synthetic(
                AddedKind::ChapterDisplay.marker(),
                "c",
                &display,
            ));
        }

        let body = body.map(|mut body| {
            let (body_labels, extras): (Vec<Extra>, Vec<Extra>) = body
                .extras
                .into_iter()
                .partition(|e| e.kind == ExtraKind::VerseCharacter);
            body.extras = extras;
            labels.extend(body_labels);
            body
        });
        for label in labels {
            self.entries.push(ProcessedEntry {
                marker: AddedKind::VerseLabel.marker().to_string(),
                original_marker: ExtraKind::VerseCharacter.marker().to_string(),
                adjusted_text: label.clean_text.clone(),
                clean_text: label.clean_text,
                extras: vec![],
                original_text: label.raw_text,
            });
        }

        self.entries
            .push(entry_from("v", original_marker, number_part, number_markup));
        if let Some(body) = body {
            self.entries.push(entry_from(
                AddedKind::VerseText.marker(),
                original_marker,
                body,
                rest,
            ));
        }
    }

    fn push_paragraph(
        &mut self,
        marker: &str,
        original_marker: &str,
        text: &str,
        anomalies: &mut AnomalyLog,
    ) {
        self.entries
            .push(ProcessedEntry::synthetic(marker, original_marker, ""));

        if text.trim().is_empty() {
            if !text.is_empty() {
                anomalies.record(
                    AnomalyKind::TrailingSpace,
                    &self.state.location(),
                    original_marker,
                    "",
                );
            }
            return;
        }

        let body = self.extract(original_marker, text, anomalies);
        self.entries.push(entry_from(
            AddedKind::ParagraphText.marker(),
            original_marker,
            body,
            text,
        ));
    }

    /// Opens chapter 1 for a verse that arrived before any chapter marker.
    fn synthesize_chapter(&mut self, original_marker: &str, verse: &str, anomalies: &mut AnomalyLog) {
        self.state.open_chapter("1", Some(1));
        anomalies.record(
            AnomalyKind::MissingChapterBeforeFirstVerse,
            &Location::new("1", verse),
            original_marker,
            "",
        );

        // A paragraph just before the verse belongs to the new chapter.
        let at = match self.entries.last() {
            Some(last) if self.table.classify(&last.marker) == MarkerClass::Paragraph => {
                self.entries.len() - 1
            }
            _ => self.entries.len(),
        };
        self.entries
            .insert(at, ProcessedEntry::synthetic("c", "c", "1"));
    }

    fn check_verse_sequence(&mut self, original_marker: &str, number: &str, anomalies: &mut AnomalyLog) {
        let Some(span) = VerseSpan::parse(number) else {
            return;
        };
        let location = Location::new(self.state.chapter.as_str(), number);
        if let Some(previous) = self.state.last_verse_end
            && span.first <= previous
        {
            anomalies.record(
                AnomalyKind::VerseOutOfSequence,
                &location,
                original_marker,
                format!("after verse {previous}"),
            );
        }

        match span.end_chapter {
            Some(end_chapter) => {
                anomalies.record(
                    AnomalyKind::CrossChapterVerseRange,
                    &location,
                    original_marker,
                    format!("ends at {end_chapter}:{}", span.last),
                );
                self.state.last_verse_end = Some(span.first);
            }
            None => self.state.last_verse_end = Some(span.last),
        }
    }
}

fn entry_from(marker: &str, original_marker: &str, extracted: Extracted, original_text: &str) -> ProcessedEntry {
    ProcessedEntry {
        marker: marker.to_string(),
        original_marker: original_marker.to_string(),
        adjusted_text: extracted.adjusted,
        clean_text: extracted.clean,
        extras: extracted.extras,
        original_text: original_text.to_string(),
    }
}

/// Splits the verse number token off the front of a verse line.
///
/// Accepts `7`, `7b`, `7-9`, `7–9`, `7,9`, `7b-8a` and the cross-chapter form
/// `16-4:2`. Returns the token and the untouched remainder.
pub fn split_verse_number(text: &str) -> Option<(&str, &str)> {
    const EN_DASH: &[u8] = "–".as_bytes();

    let mut cur = Cursor::new(text, 0);
    if cur.bump_while(|b| b.is_ascii_digit()).is_empty() {
        return None;
    }
    eat_verse_suffix(&mut cur);

    loop {
        let saved = cur.clone();
        if cur.starts_with(EN_DASH) {
            cur.i += EN_DASH.len();
        } else if matches!(cur.peek(), Some(b'-' | b',')) {
            cur.bump();
        } else {
            break;
        }

        if cur.bump_while(|b| b.is_ascii_digit()).is_empty() {
            cur = saved;
            break;
        }
        if cur.peek() == Some(b':') && cur.peek_nth(1).is_some_and(|b| b.is_ascii_digit()) {
            cur.bump();
            cur.bump_while(|b| b.is_ascii_digit());
        }
        eat_verse_suffix(&mut cur);
    }

    Some((&text[..cur.i], &text[cur.i..]))
}

/// A single lower-case letter directly after verse digits, as in `7b`.
fn eat_verse_suffix(cur: &mut Cursor<'_>) {
    let is_suffix = cur.peek().is_some_and(|b| b.is_ascii_lowercase())
        && !cur.peek_nth(1).is_some_and(|b| b.is_ascii_alphabetic());
    if is_suffix {
        cur.bump();
    }
}

/// Verse numbers covered by a verse token such as `7b-9` or `16-4:2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VerseSpan {
    first: u32,
    last: u32,
    /// Chapter of `last` when the range runs into a later chapter.
    end_chapter: Option<u32>,
}

impl VerseSpan {
    fn parse(number: &str) -> Option<Self> {
        let mut parts = number
            .split(['-', '–', ','])
            .map(|part| part.trim_end_matches(|c: char| c.is_ascii_lowercase()));
        let first = parts.next()?.parse().ok()?;
        let mut span = Self {
            first,
            last: first,
            end_chapter: None,
        };
        for part in parts {
            let verse = match part.split_once(':') {
                Some((chapter, verse)) => {
                    span.end_chapter = chapter.parse().ok();
                    verse
                }
                None => part,
            };
            if let Ok(verse) = verse.parse() {
                span.last = verse;
            }
        }
        Some(span)
    }
}
