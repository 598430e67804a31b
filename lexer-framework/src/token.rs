use common_framework::Position;
use std::fmt;

/// Identifier of a lexical symbol (token type).
///
/// Ids are negative, in the style of `text/scanner`; they are assigned by a
/// [`Symbols`](crate::Symbols) table.
pub type SymbolId = i32;

/// The reserved end-of-stream symbol.
pub const EOF: SymbolId = -1;

/// A token produced by a [`Stream`](crate::Stream).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Type of the token, as assigned by the definition's symbol table.
    pub kind: SymbolId,
    /// The literal text of the token.
    pub value: String,
    /// Where the token starts.
    pub position: Position,
}

impl Token {
    pub fn new(kind: SymbolId, value: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    /// The end-of-stream sentinel at the given position.
    pub fn eof(position: Position) -> Self {
        Self {
            kind: EOF,
            value: String::new(),
            position,
        }
    }

    /// Returns true if this token represents end-of-file.
    pub fn is_eof(&self) -> bool {
        self.kind == EOF
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            f.write_str("<EOF>")
        } else {
            write!(f, "{:?}", self.value)
        }
    }
}
