use std::fmt;
use std::sync::Arc;

/// Placeholder rendered in place of an unknown source name.
pub const UNKNOWN_SOURCE: &str = "<source>";

/// Represents the position of a token or error in the source text.
///
/// This is shared by the lexer and parser frameworks: every token carries
/// one, and so does every positioned error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    /// Name of the source (usually a file name), if known
    pub source: Option<Arc<str>>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, counted in characters)
    pub column: usize,
    /// Byte offset from the start of the input
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of an unnamed input.
    pub fn new() -> Self {
        Self {
            source: None,
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Creates a position with the given values.
    pub fn at(line: usize, column: usize, offset: usize) -> Self {
        Self {
            source: None,
            line,
            column,
            offset,
        }
    }

    /// Creates a position at the start of a named input.
    pub fn start_of(source: Option<Arc<str>>) -> Self {
        Self {
            source,
            ..Self::new()
        }
    }

    /// Returns the same position attributed to another source.
    pub fn with_source(mut self, source: Option<Arc<str>>) -> Self {
        self.source = source;
        self
    }

    /// Returns the source name, or the placeholder when it is unknown.
    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_name(), self.line, self.column)
    }
}
