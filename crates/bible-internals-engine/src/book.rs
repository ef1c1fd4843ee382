use std::fmt;

use crate::anomaly::{Anomaly, AnomalyLog, Severity};
use crate::config::ParserConfig;
use crate::error::{LookupError, ProcessError};
use crate::index::{CVIndex, build_index, check_index};
use crate::markers::{MarkerTable, UsfmMarkers};
use crate::models::{ProcessedEntry, RawLine};
use crate::parsing::{LineProcessor, insert_end_markers, normalize_line_order};

/// One processed book: the entry list, its chapter:verse index and every
/// anomaly found on the way. Immutable once built.
#[derive(Debug, Clone)]
pub struct BibleBook {
    book_code: String,
    entries: Vec<ProcessedEntry>,
    index: CVIndex,
    anomalies: Vec<Anomaly>,
}

impl BibleBook {
    /// Processes `lines` with the built-in USFM marker table.
    pub fn process(
        book_code: &str,
        lines: Vec<RawLine>,
        config: &ParserConfig,
    ) -> Result<Self, ProcessError> {
        Self::process_with_table(book_code, lines, config, &UsfmMarkers)
    }

    pub fn process_with_table(
        book_code: &str,
        lines: Vec<RawLine>,
        config: &ParserConfig,
        table: &dyn MarkerTable,
    ) -> Result<Self, ProcessError> {
        let mut anomalies = AnomalyLog::new();

        let lines = if config.reorder_external_markup {
            normalize_line_order(lines, table, &mut anomalies)
        } else {
            lines
        };
        log::debug!("{book_code}: processing {} raw lines", lines.len());

        let mut processor = LineProcessor::new(config, table);
        for line in &lines {
            processor.push(line, &mut anomalies);
        }
        let flat = processor.finish();

        let entries = insert_end_markers(&flat, table, &mut anomalies)?;
        log::debug!(
            "{book_code}: {} entries ({} closing entries added)",
            entries.len(),
            entries.len() - flat.len()
        );

        let index = build_index(&entries, table, &mut anomalies);
        check_index(&index, &entries, table, &mut anomalies);

        Ok(Self {
            book_code: book_code.to_string(),
            entries,
            index,
            anomalies: anomalies.into_vec(),
        })
    }

    pub fn book_code(&self) -> &str {
        &self.book_code
    }

    pub fn entries(&self) -> &[ProcessedEntry] {
        &self.entries
    }

    pub fn index(&self) -> &CVIndex {
        &self.index
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn anomaly_count(&self, severity: Severity) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.severity == severity)
            .count()
    }

    /// Entries for one chapter:verse key. Chapter headings live at verse
    /// `"0"`, front matter at chapter [`FRONT_MATTER_CHAPTER`](crate::index::FRONT_MATTER_CHAPTER).
    pub fn lookup(&self, chapter: &str, verse: &str) -> Result<&[ProcessedEntry], LookupError> {
        self.lookup_with_context(chapter, verse)
            .map(|(entries, _)| entries)
    }

    /// Like [`lookup`](Self::lookup), also returning the structural markers
    /// open where the range starts.
    pub fn lookup_with_context(
        &self,
        chapter: &str,
        verse: &str,
    ) -> Result<(&[ProcessedEntry], &[String]), LookupError> {
        let entry = self
            .index
            .get(chapter, verse)
            .ok_or_else(|| LookupError::NotFound {
                chapter: chapter.to_string(),
                verse: verse.to_string(),
            })?;
        let entries = self
            .entries
            .get(entry.range())
            .ok_or_else(|| LookupError::NotFound {
                chapter: chapter.to_string(),
                verse: verse.to_string(),
            })?;
        Ok((entries, &entry.context))
    }

    /// Adjusted text of the first entry with the given marker, standardised
    /// first so `h` and `mt` find `h` and `mt1`.
    pub fn field_text(&self, marker: &str) -> Option<&str> {
        let marker = UsfmMarkers.to_standard(marker);
        self.entries
            .iter()
            .find(|entry| entry.marker == marker)
            .map(|entry| entry.adjusted_text.as_str())
    }
}

impl fmt::Display for BibleBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} entries, {} index keys, {} anomalies ({} errors, {} warnings)",
            self.book_code,
            self.entries.len(),
            self.index.len(),
            self.anomalies.len(),
            self.anomaly_count(Severity::Error),
            self.anomaly_count(Severity::Warning),
        )
    }
}
