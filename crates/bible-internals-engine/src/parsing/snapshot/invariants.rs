use crate::index::CVIndex;
use crate::markers::{MarkerClass, MarkerTable};
use crate::models::ProcessedEntry;

/// Panics if the finished entry list or its index is inconsistent.
pub fn check(entries: &[ProcessedEntry], index: &CVIndex, table: &dyn MarkerTable) {
    check_nesting(entries, table);
    check_extras(entries);
    check_index(entries, index, table);
}

/// Every structural open has exactly one matching close, and no close
/// appears without an open.
pub fn check_nesting(entries: &[ProcessedEntry], table: &dyn MarkerTable) {
    let mut open: Vec<&str> = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match table.classify(&entry.marker) {
            MarkerClass::Closing(name) => {
                let at = open.iter().rposition(|m| *m == name);
                assert!(
                    at.is_some(),
                    "entry {i}: {} closes nothing (open: {open:?})",
                    entry.marker
                );
                if let Some(at) = at {
                    open.remove(at);
                }
                assert!(
                    entry.adjusted_text.is_empty() && entry.extras.is_empty(),
                    "entry {i}: closing entry {} carries content",
                    entry.marker
                );
            }
            class if class.is_structural() => open.push(&entry.marker),
            _ => {}
        }
    }
    assert!(open.is_empty(), "unclosed at end of book: {open:?}");
}

/// Extras sit inside their entry's adjusted text, in offset order.
pub fn check_extras(entries: &[ProcessedEntry]) {
    for (i, entry) in entries.iter().enumerate() {
        let mut last = 0;
        for extra in &entry.extras {
            assert!(
                extra.offset <= entry.adjusted_text.len(),
                "entry {i}: extra offset {} past adjusted text {:?}",
                extra.offset,
                entry.adjusted_text
            );
            assert!(
                entry.adjusted_text.is_char_boundary(extra.offset),
                "entry {i}: extra offset {} splits a character",
                extra.offset
            );
            assert!(extra.offset >= last, "entry {i}: extras out of order");
            last = extra.offset;
        }
    }
}

/// Index ranges never overlap and every verse entry has a key whose range
/// starts at a verse entry with the same number.
pub fn check_index(entries: &[ProcessedEntry], index: &CVIndex, table: &dyn MarkerTable) {
    let mut next = 0;
    for ((chapter, verse), entry) in index.iter() {
        assert!(
            entry.start >= next,
            "{chapter}:{verse} starts at {} inside the previous range",
            entry.start
        );
        next = entry.start + entry.length;
    }
    assert!(next <= entries.len(), "index runs past the entry list");

    let mut chapter = None;
    for entry in entries {
        match table.classify(&entry.marker) {
            MarkerClass::Chapter => chapter = Some(entry.clean_text.as_str()),
            MarkerClass::Verse => {
                let chapter = chapter.unwrap_or("0");
                let Some(range) = index.get(chapter, &entry.clean_text) else {
                    panic!("verse {chapter}:{} missing from index", entry.clean_text);
                };
                let first = &entries[range.start];
                assert!(
                    first.marker == entry.marker && first.clean_text == entry.clean_text,
                    "verse {chapter}:{} range starts at {} {:?}",
                    entry.clean_text,
                    first.marker,
                    first.clean_text
                );
            }
            _ => {}
        }
    }
}
