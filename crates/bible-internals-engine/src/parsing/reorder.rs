//! Line-order normalisation for markup converted from other formats.
//!
//! Some converters emit an empty paragraph line ahead of every verse, or
//! several empty paragraph lines in a row. Two local rewrites fix this:
//!
//! - consecutive empty paragraph lines merge into one (the later marker wins)
//! - an empty paragraph line followed by a verse line with text becomes the
//!   verse number on its own, then the paragraph carrying the verse text
//!
//! Applying the rewrites to their own output changes nothing.

use crate::anomaly::{AnomalyKind, AnomalyLog, Location};
use crate::markers::{MarkerClass, MarkerTable};
use crate::models::RawLine;

use super::lines::split_verse_number;

pub fn normalize_line_order(
    lines: Vec<RawLine>,
    table: &dyn MarkerTable,
    anomalies: &mut AnomalyLog,
) -> Vec<RawLine> {
    let mut out: Vec<RawLine> = Vec::with_capacity(lines.len());

    for line in lines {
        let class = table.classify(&line.marker);
        let pending_paragraph = out
            .last()
            .filter(|prev| is_empty_paragraph(prev, table))
            .map(|prev| prev.marker.clone());

        match (class, pending_paragraph) {
            (MarkerClass::Paragraph, Some(previous)) if line.text.trim().is_empty() => {
                anomalies.record(
                    AnomalyKind::LinesReordered,
                    &Location::default(),
                    &line.marker,
                    format!("merged with preceding \\{previous}"),
                );
                out.pop();
                out.push(line);
            }
            (MarkerClass::Verse, Some(paragraph)) => {
                let Some((number, rest)) = split_verse_number(&line.text) else {
                    out.push(line);
                    continue;
                };
                let rest = rest.trim_start();
                if rest.is_empty() {
                    out.push(line);
                    continue;
                }
                anomalies.record(
                    AnomalyKind::LinesReordered,
                    &Location::default(),
                    &line.marker,
                    format!("moved \\{paragraph} after verse {number}"),
                );
                let paragraph_line = RawLine::new(paragraph, rest);
                out.pop();
                out.push(RawLine::new(line.marker.as_str(), number));
                out.push(paragraph_line);
            }
            _ => out.push(line),
        }
    }

    out
}

fn is_empty_paragraph(line: &RawLine, table: &dyn MarkerTable) -> bool {
    table.classify(&line.marker) == MarkerClass::Paragraph && line.text.trim().is_empty()
}
