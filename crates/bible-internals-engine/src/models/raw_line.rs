/// One logical line of source markup: the marker (without its backslash)
/// and the text that followed it.
///
/// `text` never contains a line break; loaders join continuation lines
/// before building these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub marker: String,
    pub text: String,
}

impl RawLine {
    pub fn new(marker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            text: text.into(),
        }
    }

    /// A line that carries only its marker.
    pub fn bare(marker: impl Into<String>) -> Self {
        Self::new(marker, "")
    }
}
