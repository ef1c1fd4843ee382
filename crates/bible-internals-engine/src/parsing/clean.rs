use std::borrow::Cow;

use crate::markers::{MarkerClass, MarkerTable, scan_markers};

/// Separates USFM 3 word attributes from the word, as in `\w grace|strong="G5485"\w*`.
pub const ATTRIBUTE_SEPARATOR: char = '|';

/// Plain prose for `adjusted`: every marker token removed, word attributes
/// dropped and HTML entities decoded.
pub fn clean_text(adjusted: &str) -> String {
    let stripped = strip_formatting(adjusted);
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// Removes every inline marker token from `text`.
///
/// Text between a token and a following closing token loses anything from
/// an attribute separator onwards.
pub fn strip_formatting(text: &str) -> Cow<'_, str> {
    let tokens = scan_markers(text);
    if tokens.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in &tokens {
        let mut segment = &text[last..token.start];
        if token.is_close()
            && let Some(bar) = segment.find(ATTRIBUTE_SEPARATOR)
        {
            segment = &segment[..bar];
        }
        out.push_str(segment);
        last = token.end;
    }
    out.push_str(&text[last..]);

    Cow::Owned(out)
}

/// Inline markers in `text` that the table does not know as character
/// formatting, notes or milestones.
pub fn unknown_character_markers<'t>(text: &'t str, table: &dyn MarkerTable) -> Vec<&'t str> {
    scan_markers(text)
        .into_iter()
        .filter(|token| !token.name.is_empty() && !token.name.ends_with("-s") && !token.name.ends_with("-e"))
        .filter(|token| {
            !matches!(
                table.classify(token.name),
                MarkerClass::Character | MarkerClass::Note(_)
            )
        })
        .map(|token| token.name)
        .collect()
}
