//! Parse Configuration

/// Options applied while loading a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseConfig {
    /// Reject words that are not valid UTF-8 (off = words are opaque bytes)
    pub validate_utf8: bool,
}

impl ParseConfig {
    /// Enable or disable UTF-8 validation of vocabulary words
    pub fn with_validate_utf8(mut self, validate: bool) -> Self {
        self.validate_utf8 = validate;
        self
    }
}
