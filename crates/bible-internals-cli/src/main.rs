use anyhow::{Context, Result, bail};
use bible_internals_config::Config;
use bible_internals_engine::{BibleBook, ProcessedEntry, io};
use std::{
    env,
    path::{Path, PathBuf},
    process,
};

/// A `C:V` argument. A bare `C` asks for the chapter heading range (verse 0).
#[derive(Debug, PartialEq, Eq)]
struct Reference {
    chapter: String,
    verse: String,
}

impl Reference {
    fn parse(arg: &str) -> Result<Self> {
        let (chapter, verse) = arg.split_once(':').unwrap_or((arg, "0"));
        if chapter.is_empty() || verse.is_empty() {
            bail!("invalid reference '{arg}', expected C:V");
        }
        Ok(Self {
            chapter: chapter.to_string(),
            verse: verse.to_string(),
        })
    }
}

/// The book argument is a file path, or a book code looked up in the
/// configured books folder.
fn resolve_book_path(arg: &str, config: &Config) -> Result<PathBuf> {
    let path = Path::new(arg);
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    match &config.books_path {
        Some(books_path) => io::find_book_file(books_path, arg)
            .with_context(|| format!("Book '{arg}' not found in {}", books_path.display())),
        None => bail!(
            "'{arg}' is not a file and no books_path is set in {}",
            Config::config_path().display()
        ),
    }
}

/// Writes the default config to `config_path` unless a file is already there.
fn init_config(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }
    Config::default()
        .save_to_path(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(true)
}

fn print_entries(entries: &[ProcessedEntry]) {
    for entry in entries {
        println!("{entry}");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <book.usfm | BOOK> [C:V ...] | --init-config", args[0]);
        process::exit(1);
    }

    if args[1] == "--init-config" {
        let config_path = Config::config_path();
        if init_config(&config_path)? {
            log::info!("Wrote default config to {}", config_path.display());
        } else {
            log::warn!("{} already exists, leaving it alone", config_path.display());
        }
        return Ok(());
    }

    let config = Config::load_or_default().context("Failed to load config file")?;
    let book_path = resolve_book_path(&args[1], &config)?;
    log::info!("Processing {}", book_path.display());

    let raw = io::read_usfm_file(&book_path)
        .with_context(|| format!("Failed to read {}", book_path.display()))?;
    let book = BibleBook::process(&raw.book_code, raw.lines, &config.parser)
        .with_context(|| format!("Failed to process {}", book_path.display()))?;

    let references = args[2..]
        .iter()
        .map(|arg| Reference::parse(arg))
        .collect::<Result<Vec<_>>>()?;

    if references.is_empty() {
        print_entries(book.entries());
    }
    for reference in &references {
        match book.lookup_with_context(&reference.chapter, &reference.verse) {
            Ok((entries, context)) => {
                println!(
                    "== {} {}:{} [{}]",
                    book.book_code(),
                    reference.chapter,
                    reference.verse,
                    context.join(" ")
                );
                print_entries(entries);
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    log::info!("{book}");
    Ok(())
}
