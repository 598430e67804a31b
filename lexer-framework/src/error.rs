use common_framework::Position;
use thiserror::Error;

/// Errors raised while producing or transforming tokens.
#[derive(Debug, Error)]
pub enum LexError {
    /// No lexing rule accepts the character at this position.
    #[error("{position}: unexpected character {ch:?}")]
    UnexpectedChar { ch: char, position: Position },

    /// A quoted literal or block comment runs off the end of the input.
    #[error("{position}: unterminated {what}")]
    UnterminatedLiteral {
        what: &'static str,
        position: Position,
    },

    /// A malformed escape sequence inside a quoted literal.
    #[error("{position}: invalid escape in {literal}: {reason}")]
    InvalidEscape {
        literal: String,
        reason: String,
        position: Position,
    },

    /// A rule reported a match without consuming input.
    #[error("{position}: lexing rule matched without consuming input")]
    NoProgress { position: Position },

    /// Reading the source failed.
    #[error("failed to read {source_name}: {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },
}

impl LexError {
    /// Returns the position of the failure, when it has one.
    pub fn position(&self) -> Option<&Position> {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::UnterminatedLiteral { position, .. }
            | LexError::InvalidEscape { position, .. }
            | LexError::NoProgress { position } => Some(position),
            LexError::Io { .. } => None,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;
