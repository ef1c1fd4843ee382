use std::fmt::Write;

use crate::index::CVIndex;
use crate::models::ProcessedEntry;

/// One line per entry: marker, clean text and any extras.
pub fn render(entries: &[ProcessedEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        // writing to a String cannot fail
        let _ = writeln!(out, "{entry}");
    }
    out
}

/// One line per index key, in entry order: `c:v start+length [context]`.
pub fn render_index(index: &CVIndex) -> String {
    let mut out = String::new();
    for ((chapter, verse), entry) in index.iter() {
        let _ = writeln!(
            out,
            "{chapter}:{verse} {}+{} [{}]",
            entry.start,
            entry.length,
            entry.context.join(" ")
        );
    }
    out
}
