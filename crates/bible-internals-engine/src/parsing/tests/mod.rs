//! Pipeline tests for the parsing module.
//!
//! Each test runs raw lines through the whole pipeline and pins the rendered
//! entry list with an inline snapshot.

use crate::anomaly::{AnomalyKind, AnomalyLog};
use crate::book::BibleBook;
use crate::config::ParserConfig;
use crate::markers::UsfmMarkers;
use crate::models::RawLine;
use crate::parsing::{insert_end_markers, snapshot};

fn process(lines: &[(&str, &str)]) -> BibleBook {
    process_with(lines, &ParserConfig::default())
}

fn process_with(lines: &[(&str, &str)], config: &ParserConfig) -> BibleBook {
    let raw = lines.iter().map(|(m, t)| RawLine::new(*m, *t)).collect();
    let book = BibleBook::process("TST", raw, config).unwrap_or_else(|e| panic!("{e}"));
    snapshot::invariants(book.entries(), book.index(), &UsfmMarkers);
    book
}

fn kinds(book: &BibleBook) -> Vec<AnomalyKind> {
    book.anomalies().iter().map(|a| a.kind).collect()
}

#[test]
fn chapter_with_headings_and_poetry() {
    let book = process(&[
        ("id", "TST Test book"),
        ("c", "1"),
        ("s", "The start"),
        ("p", ""),
        ("v", "1 In the beginning\\f + \\ft Note.\\f* God created."),
        ("v", "2 And the earth."),
        ("q1", ""),
        ("v", "3 Poetry line"),
        ("q2", "continued line"),
    ]);

    insta::assert_snapshot!(snapshot::render(book.entries()), @r#"
    id "TST Test book"
    c "1"
    s1 "The start"
    ¬s1 ""
    p ""
    c# "1"
    v "1"
    v~ "In the beginning God created." [fn@16 "Note."]
    ¬v "1"
    v "2"
    v~ "And the earth."
    ¬v "2"
    ¬p ""
    q1 ""
    v "3"
    v~ "Poetry line"
    ¬q1 ""
    q2 ""
    p~ "continued line"
    ¬q2 ""
    ¬v "3"
    ¬c "1"
    "#);

    insta::assert_snapshot!(snapshot::render_index(book.index()), @r"
    -1:0 0+1 []
    1:0 1+5 []
    1:1 6+3 [c p]
    1:2 9+5 [c p]
    1:3 14+8 [c q1]
    ");

    assert!(book.anomalies().is_empty());
}

#[test]
fn introduction_and_verse_labels() {
    let book = process(&[
        ("id", "TST"),
        ("is", "Introduction"),
        ("ip", "This book is about \\bk Test\\bk*."),
        ("c", "1"),
        ("p", ""),
        ("v", "1 \\vp 1a\\vp* Text one."),
        ("v", "2 Text two."),
    ]);

    insta::assert_snapshot!(snapshot::render(book.entries()), @r#"
    id "TST"
    intro ""
    is1 "Introduction"
    ip "This book is about Test."
    ¬intro ""
    c "1"
    p ""
    c# "1"
    vp# "1a"
    v "1"
    v~ "Text one."
    ¬v "1"
    v "2"
    v~ "Text two."
    ¬v "2"
    ¬p ""
    ¬c "1"
    "#);

    insta::assert_snapshot!(snapshot::render_index(book.index()), @r"
    -1:0 0+1 []
    -1:1 1+1 []
    -1:2 2+1 [intro]
    -1:3 3+1 [intro]
    -1:4 4+1 [intro]
    1:0 5+4 []
    1:1 9+3 [c p]
    1:2 12+5 [c p]
    ");
}

#[test]
fn end_markers_are_idempotent_over_real_output() {
    let book = process(&[
        ("id", "TST"),
        ("ip", "Intro"),
        ("c", "1"),
        ("p", ""),
        ("v", "1 a"),
        ("q1", "b"),
        ("c", "2"),
        ("v", "1 c"),
        ("s1", "Heading"),
        ("p", "d"),
        ("v", "2 e"),
    ]);
    let mut anomalies = AnomalyLog::new();
    let again = insert_end_markers(book.entries(), &UsfmMarkers, &mut anomalies)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(again.as_slice(), book.entries());
}

#[test]
fn broken_markup_is_reported_not_fatal() {
    let book = process(&[
        ("id", "TST"),
        ("c", "1"),
        ("p", ""),
        ("v", "1 Text with an open note\\f + \\ft never closed"),
        ("v", "1 Repeated verse"),
        ("c", "1"),
        ("v", "2 After a repeated chapter"),
    ]);

    let kinds = kinds(&book);
    assert!(kinds.contains(&AnomalyKind::UnclosedNote));
    assert!(kinds.contains(&AnomalyKind::VerseOutOfSequence));
    assert!(kinds.contains(&AnomalyKind::ChapterOutOfSequence));
    assert!(kinds.contains(&AnomalyKind::DuplicateVerse));

    let verse = book.lookup("1", "1").unwrap_or_default();
    assert_eq!(verse[1].clean_text, "Text with an open note");
    assert_eq!(verse[1].extras.len(), 1);
}

#[test]
fn verse_without_chapter_gets_chapter_one() {
    let book = process(&[("id", "TST"), ("p", ""), ("v", "1 Text")]);

    insta::assert_snapshot!(snapshot::render(book.entries()), @r#"
    id "TST"
    c "1"
    p ""
    c# "1"
    v "1"
    v~ "Text"
    ¬v "1"
    ¬p ""
    ¬c "1"
    "#);
    assert_eq!(
        kinds(&book),
        vec![AnomalyKind::MissingChapterBeforeFirstVerse]
    );
}

#[test]
fn converted_markup_is_reordered() {
    let config = ParserConfig {
        reorder_external_markup: true,
        ..ParserConfig::default()
    };
    let book = process_with(
        &[
            ("c", "1"),
            ("p", ""),
            ("v", "1 First."),
            ("p", ""),
            ("v", "2 Second."),
        ],
        &config,
    );

    insta::assert_snapshot!(snapshot::render(book.entries()), @r#"
    c "1"
    c# "1"
    v "1"
    p ""
    p~ "First."
    ¬v "1"
    v "2"
    ¬p ""
    p ""
    p~ "Second."
    ¬p ""
    ¬v "2"
    ¬c "1"
    "#);
}

#[test]
fn stray_closing_entry_in_source_is_reported() {
    let book = BibleBook::process(
        "TST",
        vec![RawLine::new("c", "1"), RawLine::new("v", "1 a"), RawLine::new("¬q1", "")],
        &ParserConfig::default(),
    )
    .unwrap_or_else(|e| panic!("{e}"));
    let kinds = kinds(&book);
    assert!(kinds.contains(&AnomalyKind::UnmatchedClose));
    assert!(kinds.contains(&AnomalyKind::NestingError));
}
