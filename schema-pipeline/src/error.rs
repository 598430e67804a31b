use lexer_framework::LexError;
use parser_framework::{CompileError, ParseError, ValueError};
use thiserror::Error;

/// Everything that can go wrong between declaring a schema and reading a
/// typed result out of a parse.
#[derive(Debug, Error)]
pub enum Error {
    #[error("grammar error: {0}")]
    Compile(#[from] CompileError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The parse succeeded but the result does not have the requested shape
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    #[error("no lexer definition or schema given: {0}")]
    Config(&'static str),
}

impl From<LexError> for Error {
    fn from(error: LexError) -> Self {
        Error::Parse(ParseError::Lex(error))
    }
}

impl Error {
    /// Where the failure happened, for parse failures.
    pub fn position(&self) -> Option<&common_framework::Position> {
        match self {
            Error::Parse(error) => error.position(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
