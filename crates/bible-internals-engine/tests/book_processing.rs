use std::path::PathBuf;

use bible_internals_engine::parsing::snapshot;
use bible_internals_engine::{
    AnomalyKind, BibleBook, ExtraKind, LookupError, ParserConfig, ProcessedEntry, Severity,
    UsfmMarkers, read_usfm_file,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR")))
}

fn load(name: &str, config: &ParserConfig) -> BibleBook {
    let raw = read_usfm_file(&fixture(name)).unwrap();
    BibleBook::process(&raw.book_code, raw.lines, config).unwrap()
}

fn reorder_config() -> ParserConfig {
    ParserConfig {
        reorder_external_markup: true,
        ..ParserConfig::default()
    }
}

#[rstest]
#[case("ruth.usfm", ParserConfig::default())]
#[case("malformed.usfm", ParserConfig::default())]
#[case("converted.usfm", reorder_config())]
#[case("converted.usfm", ParserConfig::default())]
#[case("lists.usfm", ParserConfig::default())]
fn fixtures_hold_invariants(#[case] name: &str, #[case] config: ParserConfig) {
    let book = load(name, &config);
    snapshot::invariants(book.entries(), book.index(), &UsfmMarkers);
}

#[test]
fn well_formed_book_has_no_warnings() {
    let book = load("ruth.usfm", &ParserConfig::default());
    assert_eq!(book.book_code(), "RUT");
    assert_eq!(book.anomaly_count(Severity::Error), 0);
    assert_eq!(book.anomaly_count(Severity::Warning), 0);
}

#[test]
fn fields_are_found_by_standard_marker() {
    let book = load("ruth.usfm", &ParserConfig::default());
    assert_eq!(book.field_text("h"), Some("Ruth"));
    assert_eq!(book.field_text("mt"), Some("Ruth"));
    assert_eq!(book.field_text("toc1"), Some("The Book of Ruth"));
    assert_eq!(book.field_text("toc3"), None);
}

#[test]
fn verses_are_looked_up_by_reference() {
    let book = load("ruth.usfm", &ParserConfig::default());

    let verse = book.lookup("1", "1").unwrap();
    assert_eq!(verse[0].marker, "v");
    assert_eq!(
        verse[1].clean_text,
        "In the days when the judges ruled there was a famine in the land."
    );
    assert_eq!(verse[1].extras[0].kind, ExtraKind::Footnote);
    assert_eq!(verse[1].extras[0].clean_text, "1:1 Traditionally, judged");

    let verse = book.lookup("1", "4").unwrap();
    assert_eq!(verse[1].extras[0].kind, ExtraKind::CrossReference);
    assert_eq!(verse[1].clean_text, "They took wives of the women of Moab.");

    assert_eq!(
        book.lookup("1", "22").unwrap_err(),
        LookupError::NotFound {
            chapter: "1".to_string(),
            verse: "22".to_string()
        }
    );
}

#[test]
fn verse_spanning_poetry_lines_keeps_both_lines() {
    let book = load("ruth.usfm", &ParserConfig::default());
    let verse = book.lookup("1", "3").unwrap();
    let text: Vec<&str> = verse
        .iter()
        .filter(|e| e.marker == "v~" || e.marker == "p~")
        .map(|e| e.clean_text.as_str())
        .collect();
    assert_eq!(text, vec!["Now Elimelech died,", "and she was left with her two sons."]);
}

#[test]
fn angle_brackets_become_curly_quotes() {
    let book = load("ruth.usfm", &ParserConfig::default());
    let verse = book.lookup("2", "2").unwrap();
    assert_eq!(
        verse[1].clean_text,
        "And Ruth the Moabitess said to Naomi, \u{201c}Let me now go to the field.\u{201d}"
    );
}

#[test]
fn full_text_puts_notes_back() {
    let book = load("ruth.usfm", &ParserConfig::default());
    let verse = book.lookup("1", "1").unwrap();
    assert_eq!(
        verse[1].full_text(),
        "In the days when the judges ruled\\f + \\fr 1:1 \\ft Traditionally, judged\\f* there was a famine in the land."
    );
}

#[test]
fn introduction_is_front_matter() {
    let book = load("ruth.usfm", &ParserConfig::default());
    let intro = book
        .entries()
        .iter()
        .position(|e| e.marker == "intro")
        .unwrap();
    let first_chapter = book.entries().iter().position(|e| e.marker == "c").unwrap();
    assert!(intro < first_chapter);
    assert_eq!(book.entries()[first_chapter - 1].marker, "¬intro");
}

#[test]
fn malformed_book_is_processed_with_anomalies() {
    let book = load("malformed.usfm", &ParserConfig::default());
    let kinds: Vec<AnomalyKind> = book.anomalies().iter().map(|a| a.kind).collect();

    for expected in [
        AnomalyKind::MissingChapterBeforeFirstVerse,
        AnomalyKind::UnclosedNote,
        AnomalyKind::VerseOutOfSequence,
        AnomalyKind::DuplicateVerse,
        AnomalyKind::NoteCloseBeforeOpen,
        AnomalyKind::MisplacedMarker,
    ] {
        assert!(kinds.contains(&expected), "missing {expected:?} in {kinds:?}");
    }

    assert!(book.lookup("1", "1").is_ok());
    assert!(book.lookup("2", "3").is_ok());
    // the duplicate keeps its first range
    let verse = book.lookup("1", "2").unwrap();
    assert_eq!(verse[1].clean_text, "A note that never closes");
}

#[test]
fn converted_book_is_reordered_when_asked() {
    let book = load("converted.usfm", &reorder_config());
    let verse = book.lookup("1", "3").unwrap();
    let markers: Vec<&str> = verse.iter().map(|e| e.marker.as_str()).collect();
    assert_eq!(markers[0], "v");
    assert!(markers.contains(&"p~"));
    assert!(
        book.anomalies()
            .iter()
            .any(|a| a.kind == AnomalyKind::LinesReordered)
    );
}

fn markers(entries: &[ProcessedEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.marker.as_str()).collect()
}

#[test]
fn outlines_and_lists_are_wrapped() {
    let book = load("lists.usfm", &ParserConfig::default());
    assert_eq!(book.anomaly_count(Severity::Error), 0);
    assert_eq!(book.anomaly_count(Severity::Warning), 0);

    let first_chapter = book.entries().iter().position(|e| e.marker == "c").unwrap();
    assert_eq!(
        markers(&book.entries()[..first_chapter]),
        vec![
            "id", "h", "cl¤", "intro", "is1", "iot", "io1", "io1", "¬iot", "ilist", "ili1",
            "ili1", "¬ilist", "ip", "¬intro",
        ]
    );

    let verse = book.lookup("1", "1").unwrap();
    assert_eq!(
        markers(verse),
        vec![
            "v", "v~", "¬p", "list", "li1", "p~", "¬li1", "li2", "p~", "¬li2", "¬list", "¬v",
            "p",
        ]
    );
    assert_eq!(verse[5].clean_text, "who does not walk with the wicked");
}

#[test]
fn chapter_label_before_first_chapter_is_book_wide() {
    let book = load("lists.usfm", &ParserConfig::default());
    let label = book
        .entries()
        .iter()
        .find(|e| e.marker == "cl¤")
        .unwrap();
    assert_eq!(label.original_marker, "cl");
    assert_eq!(label.clean_text, "Psalm");
    assert!(book.entries().iter().all(|e| e.marker != "cl"));
}
