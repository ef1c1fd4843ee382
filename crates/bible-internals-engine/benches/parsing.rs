use bible_internals_engine::{BibleBook, ParserConfig, UsfmMarkers, parse_usfm};
use criterion::{Criterion, criterion_group, criterion_main};
mod common;

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    group.sample_size(10);

    let content = common::generate_inline_usfm(50, 30);
    group.bench_function("parse_usfm_inline", |b| {
        b.iter(|| {
            let book = parse_usfm(std::hint::black_box(&content), &UsfmMarkers);
            std::hint::black_box(book);
        });
    });

    group.finish();
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");
    group.sample_size(10);

    let content = common::generate_usfm_book(50, 30);
    let raw = parse_usfm(&content, &UsfmMarkers);
    let config = ParserConfig::default();

    group.bench_function("full_pipeline", |b| {
        b.iter(|| {
            let book = BibleBook::process("TST", raw.lines.clone(), &config);
            std::hint::black_box(book)
        });
    });

    let book = BibleBook::process("TST", raw.lines.clone(), &config);
    if let Ok(book) = book {
        group.bench_function("lookup", |b| {
            b.iter(|| {
                for chapter in ["1", "25", "50"] {
                    let _ = std::hint::black_box(book.lookup(chapter, "17"));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_process);
criterion_main!(benches);
