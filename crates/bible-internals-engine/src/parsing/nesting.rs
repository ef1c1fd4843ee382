//! Synthesises closing entries so the flat entry list nests properly.
//!
//! ## Key Invariants
//!
//! - Every structural marker opened is closed exactly once (`¬c`, `¬v`, `¬p`, ...)
//! - `¬c` and `¬v` echo the chapter or verse number they close
//! - Existing closing entries are honoured, so a second run adds nothing
//! - The open-marker stack never holds more than [`MAX_OPEN_DEPTH`] markers;
//!   going deeper is a logic fault and aborts the book

use crate::anomaly::{AnomalyKind, AnomalyLog, Location};
use crate::error::ProcessError;
use crate::markers::{AddedKind, MarkerClass, MarkerTable};
use crate::models::ProcessedEntry;

pub const MAX_OPEN_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMarker {
    pub marker: String,
    /// Echoed by the closing entry: the number for `c` and `v`, otherwise empty.
    pub value: String,
}

/// Structural markers currently open, in the order they were opened.
#[derive(Debug, Default)]
pub struct OpenMarkerStack {
    items: Vec<OpenMarker>,
}

impl OpenMarkerStack {
    pub fn push(&mut self, marker: &str, value: &str, location: &Location) -> Result<(), ProcessError> {
        self.items.push(OpenMarker {
            marker: marker.to_string(),
            value: value.to_string(),
        });
        if self.items.len() > MAX_OPEN_DEPTH {
            return Err(ProcessError::StackDepthExceeded {
                limit: MAX_OPEN_DEPTH,
                location: location.clone(),
                stack: self.names().into_iter().map(str::to_string).collect(),
            });
        }
        Ok(())
    }

    pub fn pop(&mut self) -> Option<OpenMarker> {
        self.items.pop()
    }

    /// Index of the most recently opened `marker`.
    pub fn position(&self, marker: &str) -> Option<usize> {
        self.items.iter().rposition(|open| open.marker == marker)
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.position(marker).is_some()
    }

    /// Index of the most recently opened marker satisfying `pred`.
    pub fn rposition(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.items.iter().rposition(|open| pred(&open.marker))
    }

    pub fn remove(&mut self, index: usize) -> OpenMarker {
        self.items.remove(index)
    }

    /// Markers opened after the one at `index`.
    pub fn above(&self, index: usize) -> impl Iterator<Item = &str> {
        self.items[index + 1..].iter().map(|open| open.marker.as_str())
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|open| open.marker.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct EndMarkerInserter<'t> {
    table: &'t dyn MarkerTable,
    stack: OpenMarkerStack,
    out: Vec<ProcessedEntry>,
    location: Location,
    seen_chapter: bool,
}

impl<'t> EndMarkerInserter<'t> {
    pub fn new(table: &'t dyn MarkerTable, capacity: usize) -> Self {
        Self {
            table,
            stack: OpenMarkerStack::default(),
            out: Vec::with_capacity(capacity),
            location: Location::new("0", "0"),
            seen_chapter: false,
        }
    }

    /// Handles `entry`; `following` is everything after it, for look-ahead.
    pub fn push(
        &mut self,
        entry: &ProcessedEntry,
        following: &[ProcessedEntry],
        anomalies: &mut AnomalyLog,
    ) -> Result<(), ProcessError> {
        let class = self.table.classify(&entry.marker);
        self.close_finished_wrappers(&class, &entry.marker, anomalies);

        match class {
            MarkerClass::Closing(name) => {
                match self.stack.position(&name) {
                    Some(index) => {
                        self.stack.remove(index);
                    }
                    None => anomalies.record(
                        AnomalyKind::UnmatchedClose,
                        &self.location,
                        &entry.marker,
                        "",
                    ),
                }
            }
            MarkerClass::Added(kind) if kind.opens_region() => {
                if kind != AddedKind::Intro && kind.is_introduction() {
                    self.open_intro()?;
                }
                if !self.stack.contains(&entry.marker) {
                    self.stack.push(&entry.marker, "", &self.location)?;
                }
            }
            MarkerClass::Introduction => {
                self.open_intro()?;
                self.open_wrapper(&entry.marker)?;
            }
            MarkerClass::Chapter => {
                self.close_intro();
                self.close_verse(anomalies);
                if !continues_into_chapter(self.table, following) {
                    self.close_blocks(&[MarkerClass::Paragraph, MarkerClass::Heading], anomalies);
                }
                if let Some(index) = self.stack.position(&entry.marker) {
                    self.close_at(index, anomalies);
                }
                self.location = Location::new(entry.clean_text.as_str(), "0");
                self.seen_chapter = true;
                self.stack
                    .push(&entry.marker, &entry.clean_text, &self.location)?;
            }
            MarkerClass::Verse => {
                self.close_verse(anomalies);
                self.location.verse = entry.clean_text.clone();
                self.stack
                    .push(&entry.marker, &entry.clean_text, &self.location)?;
            }
            MarkerClass::Heading => {
                if verse_has_ended(self.table, following) {
                    self.close_verse(anomalies);
                }
                self.close_blocks(&[MarkerClass::Paragraph, MarkerClass::Heading], anomalies);
                self.stack.push(&entry.marker, "", &self.location)?;
            }
            MarkerClass::Paragraph => {
                if verse_has_ended(self.table, following) {
                    self.close_verse(anomalies);
                }
                // a heading never holds paragraphs
                self.close_blocks(&[MarkerClass::Paragraph, MarkerClass::Heading], anomalies);
                self.open_wrapper(&entry.marker)?;
                self.stack.push(&entry.marker, "", &self.location)?;
            }
            MarkerClass::Field
            | MarkerClass::Character
            | MarkerClass::Note(_)
            | MarkerClass::Added(_)
            | MarkerClass::Opaque(_) => {}
        }

        self.out.push(entry.clone());
        Ok(())
    }

    /// Closes everything still open, most recent first.
    pub fn finish(mut self) -> Vec<ProcessedEntry> {
        while let Some(open) = self.stack.pop() {
            self.out
                .push(ProcessedEntry::end_marker(&open.marker, &open.value));
        }
        self.out
    }

    fn close_at(&mut self, index: usize, anomalies: &mut AnomalyLog) {
        let overlapped: Vec<&str> = self.stack.above(index).collect();
        let closing = self.stack.names()[index];
        if closing != "v" && overlapped.iter().any(|m| *m != "v") {
            anomalies.record(
                AnomalyKind::StructuralOverlap,
                &self.location,
                closing,
                format!("closed while {} still open", overlapped.join(", ")),
            );
        }
        let open = self.stack.remove(index);
        self.out
            .push(ProcessedEntry::end_marker(&open.marker, &open.value));
    }

    fn close_verse(&mut self, anomalies: &mut AnomalyLog) {
        if let Some(index) = self.stack.position("v") {
            self.close_at(index, anomalies);
        }
    }

    /// Opens the book introduction unless a chapter has already started.
    fn open_intro(&mut self) -> Result<(), ProcessError> {
        let intro = AddedKind::Intro.marker();
        if !self.seen_chapter && !self.stack.contains(intro) {
            self.out.push(ProcessedEntry::synthetic(intro, intro, ""));
            self.stack.push(intro, "", &self.location)?;
        }
        Ok(())
    }

    /// Opens the wrapper `marker` belongs in, if it is not already open.
    fn open_wrapper(&mut self, marker: &str) -> Result<(), ProcessError> {
        let Some(kind) = AddedKind::wrapper_for(marker) else {
            return Ok(());
        };
        let wrapper = kind.marker();
        if !self.stack.contains(wrapper) {
            self.out
                .push(ProcessedEntry::synthetic(wrapper, wrapper, ""));
            self.stack.push(wrapper, "", &self.location)?;
        }
        Ok(())
    }

    /// Closes each open wrapper that `marker` does not belong in. Only
    /// newline markers other than verses and fields end a wrapper.
    fn close_finished_wrappers(&mut self, class: &MarkerClass, marker: &str, anomalies: &mut AnomalyLog) {
        if !class.is_newline() || matches!(class, MarkerClass::Verse | MarkerClass::Field) {
            return;
        }
        for kind in AddedKind::WRAPPERS {
            if kind.wraps(marker) || kind.marker() == marker {
                continue;
            }
            if let Some(index) = self.stack.position(kind.marker()) {
                self.close_wrapper(index, anomalies);
            }
        }
    }

    /// Closes the wrapper at `index` with whatever it holds. An open verse
    /// stays open.
    fn close_wrapper(&mut self, index: usize, anomalies: &mut AnomalyLog) {
        while let Some(inner) = self
            .stack
            .rposition(|marker| marker != "v")
            .filter(|&inner| inner > index)
        {
            self.close_at(inner, anomalies);
        }
        self.close_at(index, anomalies);
    }

    /// Closes the intro and anything opened inside it.
    fn close_intro(&mut self) {
        let Some(index) = self.stack.position(AddedKind::Intro.marker()) else {
            return;
        };
        while self.stack.len() > index {
            if let Some(open) = self.stack.pop() {
                self.out
                    .push(ProcessedEntry::end_marker(&open.marker, &open.value));
            }
        }
    }

    /// Closes every open marker of the given classes, most recent first.
    fn close_blocks(&mut self, classes: &[MarkerClass], anomalies: &mut AnomalyLog) {
        let table = self.table;
        while let Some(index) = self
            .stack
            .rposition(|marker| classes.contains(&table.classify(marker)))
        {
            self.close_at(index, anomalies);
        }
    }
}

/// Whether an open paragraph or heading carries on past a chapter marker:
/// true when the next relevant entry is a verse or running text.
fn continues_into_chapter(table: &dyn MarkerTable, following: &[ProcessedEntry]) -> bool {
    for entry in following {
        match table.classify(&entry.marker) {
            MarkerClass::Verse => return true,
            class if class.is_body_text() => return true,
            MarkerClass::Paragraph | MarkerClass::Heading | MarkerClass::Chapter => return false,
            _ => {}
        }
    }
    false
}

/// Whether the open verse has no more body text before the next verse,
/// paragraph, heading or chapter.
fn verse_has_ended(table: &dyn MarkerTable, following: &[ProcessedEntry]) -> bool {
    for entry in following {
        match table.classify(&entry.marker) {
            class if class.is_body_text() => return false,
            MarkerClass::Verse
            | MarkerClass::Chapter
            | MarkerClass::Paragraph
            | MarkerClass::Heading => return true,
            _ => {}
        }
    }
    true
}

/// Returns a copy of `entries` with closing entries inserted.
pub fn insert_end_markers(
    entries: &[ProcessedEntry],
    table: &dyn MarkerTable,
    anomalies: &mut AnomalyLog,
) -> Result<Vec<ProcessedEntry>, ProcessError> {
    let mut inserter = EndMarkerInserter::new(table, entries.len() + entries.len() / 2);
    for (index, entry) in entries.iter().enumerate() {
        inserter.push(entry, &entries[index + 1..], anomalies)?;
    }
    Ok(inserter.finish())
}
