//! Chapter:verse index over a processed entry list.
//!
//! The index stores offsets into the entry vector, never copies of entries.
//!
//! ## Key Invariants
//!
//! - Ranges are contiguous and cover the whole entry list, in order
//! - Every `v` entry's `(chapter, verse)` key appears exactly once
//! - Entries before the first chapter are keyed `("-1", n)`, one entry per key,
//!   so a real chapter 0 never collides with front matter

use std::collections::HashMap;
use std::ops::Range;

use crate::anomaly::{AnomalyKind, AnomalyLog, Location};
use crate::markers::{AddedKind, MarkerClass, MarkerTable};
use crate::models::ProcessedEntry;

/// Chapter and verse strings, exactly as they appear in the entries.
pub type CvKey = (String, String);

/// Chapter key of the entries before the first chapter.
pub const FRONT_MATTER_CHAPTER: &str = "-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub start: usize,
    pub length: usize,
    /// Structural markers open when the range starts, outermost first.
    /// Open verses are not listed.
    pub context: Vec<String>,
}

impl IndexEntry {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.length
    }
}

#[derive(Debug, Clone, Default)]
pub struct CVIndex {
    entries: HashMap<CvKey, IndexEntry>,
    order: Vec<CvKey>,
}

impl CVIndex {
    pub fn get(&self, chapter: &str, verse: &str) -> Option<&IndexEntry> {
        // HashMap<(String, String), _> can't be queried with borrowed pairs
        self.entries.get(&(chapter.to_string(), verse.to_string()))
    }

    pub fn contains(&self, chapter: &str, verse: &str) -> bool {
        self.get(chapter, verse).is_some()
    }

    /// Keys with their ranges, in entry order.
    pub fn iter(&self) -> impl Iterator<Item = (&CvKey, &IndexEntry)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|entry| (key, entry)))
    }

    /// Verse keys of one chapter, in entry order. Includes the `"0"` key
    /// for the chapter heading.
    pub fn verses(&self, chapter: &str) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter(move |(c, _)| c == chapter)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, key: CvKey, marker: &str, entry: IndexEntry, anomalies: &mut AnomalyLog) {
        if self.entries.contains_key(&key) {
            let kind = if marker == "c" {
                AnomalyKind::DuplicateChapter
            } else {
                AnomalyKind::DuplicateVerse
            };
            anomalies.record(
                kind,
                &Location::new(key.0.as_str(), key.1.as_str()),
                marker,
                format!("second range at entry {} ignored", entry.start),
            );
            return;
        }
        self.order.push(key.clone());
        self.entries.insert(key, entry);
    }
}

struct OpenRange {
    key: CvKey,
    /// Marker of the entry that opened the range.
    marker: String,
    start: usize,
    context: Vec<String>,
}

/// Builds the index in one forward pass over finished entries.
pub fn build_index(
    entries: &[ProcessedEntry],
    table: &dyn MarkerTable,
    anomalies: &mut AnomalyLog,
) -> CVIndex {
    let mut index = CVIndex::default();
    let mut context: Vec<String> = Vec::new();
    let mut current: Option<OpenRange> = None;
    let mut chapter: Option<String> = None;
    let mut front_matter = 0usize;

    for (position, entry) in entries.iter().enumerate() {
        let class = table.classify(&entry.marker);

        let new_key = match (&class, &chapter) {
            (MarkerClass::Chapter, _) => Some((entry.clean_text.clone(), "0".to_string())),
            (MarkerClass::Verse, Some(c)) => Some((c.clone(), entry.clean_text.clone())),
            (_, None) => {
                front_matter += 1;
                Some((FRONT_MATTER_CHAPTER.to_string(), (front_matter - 1).to_string()))
            }
            _ => None,
        };

        if let Some(key) = new_key {
            if let Some(open) = current.take() {
                close_range(&mut index, open, position, anomalies);
            }
            current = Some(OpenRange {
                key,
                marker: entry.marker.clone(),
                start: position,
                context: context.clone(),
            });
        }

        match class {
            MarkerClass::Chapter => {
                chapter = Some(entry.clean_text.clone());
                context.push(entry.marker.clone());
            }
            MarkerClass::Verse => {}
            MarkerClass::Closing(name) if name == "v" => {}
            MarkerClass::Closing(name) => match context.iter().rposition(|m| *m == name) {
                Some(at) => {
                    context.remove(at);
                }
                None => {
                    let (c, v) = current
                        .as_ref()
                        .map(|open| (open.key.0.as_str(), open.key.1.as_str()))
                        .unwrap_or((FRONT_MATTER_CHAPTER, "0"));
                    anomalies.record(
                        AnomalyKind::NestingError,
                        &Location::new(c, v),
                        &entry.marker,
                        format!("open markers: {}", context.join(", ")),
                    );
                }
            },
            class if class.is_structural() => context.push(entry.marker.clone()),
            _ => {}
        }
    }

    if let Some(open) = current {
        close_range(&mut index, open, entries.len(), anomalies);
    }

    log::debug!("indexed {} keys over {} entries", index.len(), entries.len());
    index
}

fn close_range(index: &mut CVIndex, open: OpenRange, end: usize, anomalies: &mut AnomalyLog) {
    let entry = IndexEntry {
        start: open.start,
        length: end - open.start,
        context: open.context,
    };
    index.insert(open.key, &open.marker, entry, anomalies);
}

/// Consistency checks over a finished index. Every problem found is
/// recorded; nothing here stops processing.
pub fn check_index(
    index: &CVIndex,
    entries: &[ProcessedEntry],
    table: &dyn MarkerTable,
    anomalies: &mut AnomalyLog,
) {
    let before = anomalies.len();
    for ((chapter, verse), indexed) in index.iter() {
        let location = Location::new(chapter.as_str(), verse.as_str());
        let front_matter = chapter == FRONT_MATTER_CHAPTER;

        if !(front_matter || is_number(chapter)) || !is_verse_reference(verse) {
            anomalies.record(
                AnomalyKind::NonNumericReference,
                &location,
                "",
                format!("{chapter}:{verse}"),
            );
        }

        let Some(slice) = entries.get(indexed.range()) else {
            continue;
        };
        let verses = slice
            .iter()
            .filter(|entry| table.classify(&entry.marker) == MarkerClass::Verse)
            .count();
        if verses > 1 {
            anomalies.record(
                AnomalyKind::MultipleVersesInKey,
                &location,
                "v",
                format!("{verses} verse entries"),
            );
        }
        if front_matter {
            continue;
        }

        let published = slice.iter().any(|entry| entry.marker == "cp");
        for (offset, entry) in slice.iter().enumerate() {
            let class = table.classify(&entry.marker);
            let next = next_marker(entries, indexed.start + offset + 1);

            let mismatch = match &class {
                MarkerClass::Chapter => entry.clean_text != *chapter,
                MarkerClass::Added(AddedKind::ChapterDisplay) => {
                    !published && entry.clean_text != *chapter
                }
                MarkerClass::Verse => entry.clean_text != *verse,
                _ => false,
            };
            if mismatch {
                anomalies.record(
                    AnomalyKind::ReferenceMismatch,
                    &location,
                    &entry.marker,
                    entry.clean_text.as_str(),
                );
            }

            if class == MarkerClass::Added(AddedKind::ChapterDisplay)
                && !matches!(next, Some("v" | "vp#"))
            {
                anomalies.record(
                    AnomalyKind::MisplacedChapterDisplay,
                    &location,
                    &entry.marker,
                    format!("followed by {}", next.unwrap_or("end of book")),
                );
            }

            if class.is_body_text() && next.is_some_and(|m| table.classify(m).is_body_text()) {
                anomalies.record(
                    AnomalyKind::ConsecutiveBodyText,
                    &location,
                    &entry.marker,
                    entry.clean_text.as_str(),
                );
            }
        }
    }
    log::debug!("index check found {} problems", anomalies.len() - before);
}

/// Marker of the first entry at or after `from`, skipping remarks.
fn next_marker(entries: &[ProcessedEntry], from: usize) -> Option<&str> {
    entries
        .get(from..)?
        .iter()
        .map(|entry| entry.marker.as_str())
        .find(|marker| *marker != "rem")
}

fn is_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Verse tokens start with a number and hold only numbers, part letters
/// and range separators, as in `7b-8a` or `16-4:2`.
fn is_verse_reference(verse: &str) -> bool {
    verse.starts_with(|c: char| c.is_ascii_digit())
        && verse
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase() || matches!(c, '-' | '–' | ',' | ':'))
}
