//! Minimal USFM text loader producing raw lines for the pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::markers::{MarkerTable, TokenKind, UsfmMarkers, scan_markers};
use crate::models::RawLine;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid books directory: {0}")]
    InvalidBooksDir(String),
    #[error("No book code in {0}")]
    MissingBookCode(PathBuf),
}

const BYTE_ORDER_MARK: char = '\u{feff}';
const BOOK_FILE_EXTENSIONS: &[&str] = &["usfm", "sfm", "ptx"];

/// One book's raw lines, as handed to [`crate::book::BibleBook::process`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawBook {
    /// Upper-cased first word of the `\id` line, empty if there is none.
    pub book_code: String,
    pub lines: Vec<RawLine>,
}

/// Read a USFM file. The book code falls back to the file stem when the
/// file has no `\id` line.
pub fn read_usfm_file(path: &Path) -> Result<RawBook, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(IoError::Io)?;
    let mut book = parse_usfm(&text, &UsfmMarkers);

    if book.book_code.is_empty() {
        book.book_code = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_uppercase)
            .ok_or_else(|| IoError::MissingBookCode(path.to_path_buf()))?;
    }
    log::debug!(
        "read {} lines of {} from {}",
        book.lines.len(),
        book.book_code,
        path.display()
    );
    Ok(book)
}

/// Split USFM text into raw lines.
///
/// Blank lines and `#` comment lines are skipped, a line without a leading
/// marker continues the previous line, and newline markers written inline
/// (as in `\p \v 1 In the beginning`) start lines of their own.
pub fn parse_usfm(text: &str, table: &dyn MarkerTable) -> RawBook {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut lines: Vec<RawLine> = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match line_start_regex().captures(trimmed) {
            Some(caps) => {
                let marker = caps.get(1).map_or("", |m| m.as_str());
                let rest = caps.get(2).map_or("", |m| m.as_str());
                split_inline_markers(marker, rest, table, &mut lines);
            }
            None => match lines.last_mut() {
                Some(previous) => {
                    if !previous.text.is_empty() {
                        previous.text.push(' ');
                    }
                    previous.text.push_str(trimmed);
                }
                None => log::warn!("line {}: text before the first marker ignored", number + 1),
            },
        }
    }

    let book_code = lines
        .iter()
        .find(|line| line.marker == "id")
        .and_then(|line| line.text.split_whitespace().next())
        .map(str::to_uppercase)
        .unwrap_or_default();

    RawBook { book_code, lines }
}

/// Find USFM book files in a directory, sorted by path.
pub fn scan_usfm_files(books_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !books_root.is_dir() {
        return Err(IoError::InvalidBooksDir(format!(
            "{} is not a directory",
            books_root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(books_root).map_err(IoError::Io)? {
        let path = entry.map_err(IoError::Io)?.path();
        if path.is_file()
            && let Some(ext) = path.extension().and_then(|e| e.to_str())
            && BOOK_FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Find the file for `book_code` in a directory, matching on the file's `\id` line.
pub fn find_book_file(books_root: &Path, book_code: &str) -> Result<PathBuf, IoError> {
    let wanted = book_code.to_uppercase();
    for path in scan_usfm_files(books_root)? {
        let text = fs::read_to_string(&path).map_err(IoError::Io)?;
        if parse_usfm(&text, &UsfmMarkers).book_code == wanted {
            return Ok(path);
        }
    }
    Err(IoError::NotFound(books_root.join(wanted)))
}

fn line_start_regex() -> &'static Regex {
    static LINE_START: OnceLock<Regex> = OnceLock::new();
    LINE_START.get_or_init(|| Regex::new(r"^\\([^\s\\]+)\s?(.*)$").expect("Invalid line regex"))
}

fn split_inline_markers(marker: &str, text: &str, table: &dyn MarkerTable, out: &mut Vec<RawLine>) {
    let mut marker = marker;
    let mut rest = text;
    loop {
        let next = scan_markers(rest).into_iter().find(|t| {
            !t.nested && t.kind != TokenKind::Close && table.is_newline_marker(t.name)
        });
        match next {
            Some(token) => {
                out.push(RawLine::new(marker, rest[..token.start].trim_end()));
                marker = token.name;
                rest = &rest[token.end..];
            }
            None => {
                out.push(RawLine::new(marker, rest));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn pairs(book: &RawBook) -> Vec<(&str, &str)> {
        book.lines
            .iter()
            .map(|l| (l.marker.as_str(), l.text.as_str()))
            .collect()
    }

    #[test]
    fn parses_lines_and_book_code() {
        let book = parse_usfm(
            "\u{feff}\\id gen Genesis\n\\h Genesis\n\n# a comment\n\\c 1\n\\p\n\\v 1 In the beginning\n",
            &UsfmMarkers,
        );
        assert_eq!(book.book_code, "GEN");
        assert_eq!(
            pairs(&book),
            vec![
                ("id", "gen Genesis"),
                ("h", "Genesis"),
                ("c", "1"),
                ("p", ""),
                ("v", "1 In the beginning"),
            ]
        );
    }

    #[test]
    fn inline_newline_markers_start_new_lines() {
        let book = parse_usfm(
            "\\c 1\n\\p \\v 1 In the beginning \\nd God\\nd* made \\v 2 the earth \\f + \\ft note\\f*\n",
            &UsfmMarkers,
        );
        assert_eq!(
            pairs(&book),
            vec![
                ("c", "1"),
                ("p", ""),
                ("v", "1 In the beginning \\nd God\\nd* made"),
                ("v", "2 the earth \\f + \\ft note\\f*"),
            ]
        );
    }

    #[test]
    fn continuation_lines_join_previous() {
        let book = parse_usfm("\\v 1 In the\n  beginning\n\\v 2 next\n", &UsfmMarkers);
        assert_eq!(pairs(&book), vec![("v", "1 In the beginning"), ("v", "2 next")]);
    }

    #[test]
    fn text_before_first_marker_is_dropped() {
        let book = parse_usfm("stray\n\\id TST\n", &UsfmMarkers);
        assert_eq!(pairs(&book), vec![("id", "TST")]);
    }

    #[test]
    fn read_file_uses_stem_without_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rut.usfm");
        std::fs::write(&path, "\\c 1\n\\v 1 text\n").unwrap();

        let book = read_usfm_file(&path).unwrap();
        assert_eq!(book.book_code, "RUT");
        assert_eq!(book.lines.len(), 2);
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let result = read_usfm_file(Path::new("/definitely/not/here.usfm"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn read_file_with_id() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\\id JHN").unwrap();
        writeln!(file, "\\c 1").unwrap();
        let book = read_usfm_file(file.path()).unwrap();
        assert_eq!(book.book_code, "JHN");
    }

    #[test]
    fn scan_and_find_books() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("01GEN.usfm"), "\\id GEN\n").unwrap();
        std::fs::write(dir.path().join("02EXO.SFM"), "\\id EXO\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "\\id XXX\n").unwrap();

        let files = scan_usfm_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let exodus = find_book_file(dir.path(), "exo").unwrap();
        assert_eq!(exodus, dir.path().join("02EXO.SFM"));
        assert!(matches!(
            find_book_file(dir.path(), "LEV"),
            Err(IoError::NotFound(_))
        ));
    }

    #[test]
    fn scan_rejects_missing_directory() {
        let result = scan_usfm_files(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(IoError::InvalidBooksDir(_))));
    }
}
