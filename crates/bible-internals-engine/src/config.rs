use serde::{Deserialize, Serialize};

/// Options controlling how a book is processed.
///
/// Every stage receives the same config; there is no process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Rewrite `<<`, `>>`, `<` and `>` to curly quotes.
    pub replace_angle_brackets: bool,
    /// Rewrite straight `"` to curly quotes.
    pub replace_straight_quotes: bool,
    /// Report pedantic spacing and unknown-marker problems.
    pub strict_checking: bool,
    /// Normalise paragraph/verse line order from externally converted sources.
    pub reorder_external_markup: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            replace_angle_brackets: true,
            replace_straight_quotes: false,
            strict_checking: false,
            reorder_external_markup: false,
        }
    }
}
