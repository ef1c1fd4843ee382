use std::fmt;

use crate::markers::END_SIGIL;

use super::Extra;

/// A single normalised entry in a processed book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEntry {
    /// Standard form of the marker, or a synthetic marker such as `v~` or `¬v`.
    pub marker: String,
    /// The marker as it appeared in the source.
    pub original_marker: String,
    /// Body text with extras removed; character formatting is kept.
    pub adjusted_text: String,
    /// Adjusted text with all character formatting stripped.
    pub clean_text: String,
    pub extras: Vec<Extra>,
    pub original_text: String,
}

impl ProcessedEntry {
    /// Builds a closing entry for `opened`, echoing `value` in its clean text.
    pub fn end_marker(opened: &str, value: &str) -> Self {
        let marker = format!("{END_SIGIL}{opened}");
        Self {
            original_marker: marker.clone(),
            marker,
            adjusted_text: String::new(),
            clean_text: value.to_string(),
            extras: Vec::new(),
            original_text: String::new(),
        }
    }

    /// Builds a text-free synthetic entry such as `intro` or `c`.
    pub fn synthetic(marker: &str, original_marker: &str, value: &str) -> Self {
        Self {
            marker: marker.to_string(),
            original_marker: original_marker.to_string(),
            adjusted_text: value.to_string(),
            clean_text: value.to_string(),
            extras: Vec::new(),
            original_text: String::new(),
        }
    }

    /// Name of the marker this entry closes, if it is a closing entry.
    pub fn closed_marker(&self) -> Option<&str> {
        self.marker.strip_prefix(END_SIGIL)
    }

    pub fn is_end_marker(&self) -> bool {
        self.closed_marker().is_some()
    }

    /// Adjusted text with every extra re-inserted at its offset.
    pub fn full_text(&self) -> String {
        if self.extras.is_empty() {
            return self.adjusted_text.clone();
        }

        let mut out = String::with_capacity(self.adjusted_text.len() + 32);
        let mut last = 0;
        for extra in &self.extras {
            let at = extra.offset.clamp(last, self.adjusted_text.len());
            out.push_str(&self.adjusted_text[last..at]);
            out.push_str(&extra.to_markup());
            last = at;
        }
        out.push_str(&self.adjusted_text[last..]);
        out
    }
}

impl fmt::Display for ProcessedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.marker, self.clean_text)?;
        for extra in &self.extras {
            write!(f, " [{}@{} {:?}]", extra.kind, extra.offset, extra.clean_text)?;
        }
        Ok(())
    }
}
