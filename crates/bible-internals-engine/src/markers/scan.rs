//! Locates backslash markers inside a line of text.
//!
//! Recognised token shapes:
//!
//! - `\name ` opening token (the single following space is part of the token)
//! - `\name*` closing token
//! - `\+name ` / `\+name*` nested character tokens
//! - `\name` at end of text or before punctuation (bare)
//! - `\*` milestone close
//!
//! A backslash that starts none of these is ordinary text.

use super::cursor::Cursor;

/// Token shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Open,
    Close,
    Bare,
}

/// A marker token found in a line. `start..end` covers the whole token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerToken<'a> {
    pub name: &'a str,
    pub nested: bool,
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl MarkerToken<'_> {
    pub fn is_close(&self) -> bool {
        self.kind == TokenKind::Close
    }

    /// Start of the token's name, past the backslash and any `+`.
    pub fn name_start(&self) -> usize {
        self.start + 1 + usize::from(self.nested)
    }
}

pub struct Backslash;

impl Backslash {
    pub const BYTE: u8 = b'\\';
    pub const NESTED: u8 = b'+';
    pub const CLOSE: u8 = b'*';
}

/// Returns every marker token in `text`, in order.
pub fn scan_markers(text: &str) -> Vec<MarkerToken<'_>> {
    let mut cur = Cursor::new(text, 0);
    let mut out = vec![];

    while !cur.eof() {
        if let Some(token) = try_parse_marker(&mut cur) {
            out.push(token);
            continue;
        }
        cur.bump();
    }

    out
}

/// Attempts to parse a marker token at the current position.
///
/// On failure, cursor position is restored.
fn try_parse_marker<'a>(cur: &mut Cursor<'a>) -> Option<MarkerToken<'a>> {
    if cur.peek() != Some(Backslash::BYTE) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump(); // backslash

    let nested = cur.peek() == Some(Backslash::NESTED);
    if nested {
        cur.bump();
    }

    if !cur.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
        // `\*` closes a milestone; anything else is a stray backslash.
        if !nested && cur.peek() == Some(Backslash::CLOSE) {
            cur.bump();
            return Some(MarkerToken {
                name: "",
                nested,
                kind: TokenKind::Close,
                start,
                end: cur.pos(),
            });
        }
        *cur = saved;
        return None;
    }

    let name = cur.bump_while(|b| b.is_ascii_alphanumeric() || b == b'-');
    let kind = match cur.peek() {
        Some(Backslash::CLOSE) => {
            cur.bump();
            TokenKind::Close
        }
        Some(b' ') => {
            cur.bump();
            TokenKind::Open
        }
        _ => TokenKind::Bare,
    };

    Some(MarkerToken {
        name,
        nested,
        kind,
        start,
        end: cur.pos(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shapes(text: &str) -> Vec<(&str, TokenKind, usize, usize)> {
        scan_markers(text)
            .into_iter()
            .map(|t| (t.name, t.kind, t.start, t.end))
            .collect()
    }

    #[test]
    fn finds_open_and_close_tokens() {
        assert_eq!(
            shapes("a \\nd LORD\\nd* b"),
            vec![("nd", TokenKind::Open, 2, 6), ("nd", TokenKind::Close, 10, 14)]
        );
    }

    #[test]
    fn nested_tokens_are_flagged() {
        let tokens = scan_markers("\\+w word\\+w*");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.nested && t.name == "w"));
        assert_eq!(tokens[0].name_start(), 2);
    }

    #[test]
    fn bare_marker_at_end_of_text() {
        assert_eq!(shapes("text \\p"), vec![("p", TokenKind::Bare, 5, 7)]);
    }

    #[test]
    fn milestone_close_is_a_close_token() {
        assert_eq!(
            shapes("\\qt-s |who=\"Pilate\"\\*"),
            vec![("qt-s", TokenKind::Open, 0, 6), ("", TokenKind::Close, 19, 21)]
        );
    }

    #[test]
    fn stray_backslash_is_text() {
        assert!(scan_markers("a \\ b \\1").is_empty());
    }

    #[test]
    fn plain_text_has_no_tokens() {
        assert!(scan_markers("In the beginning").is_empty());
    }
}
