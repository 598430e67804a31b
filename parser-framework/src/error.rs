use common_framework::Position;
use lexer_framework::LexError;
use thiserror::Error;

// ============================================================================
// COMPILE ERRORS
// ============================================================================

/// Errors raised while building a Schema Descriptor. Any of them prevents the
/// schema from being used for parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A field refers to a schema type that was never declared
    #[error("{schema}.{field}: unknown schema type '{name}'")]
    UnknownType {
        schema: String,
        field: String,
        name: String,
    },

    /// A grammar names a token type missing from the lexer's symbol table
    #[error("{schema}.{field}: unknown token type '{name}' at offset {offset}")]
    UnknownSymbol {
        schema: String,
        field: String,
        name: String,
        offset: usize,
    },

    /// An opening or closing grouping delimiter without its partner
    #[error("{schema}.{field}: unmatched '{delimiter}' at offset {offset}")]
    Unmatched {
        schema: String,
        field: String,
        delimiter: char,
        offset: usize,
    },

    /// Any other grammar syntax error
    #[error("{schema}.{field}: unexpected {found} at offset {offset}")]
    Unexpected {
        schema: String,
        field: String,
        found: String,
        offset: usize,
    },

    /// A capture whose shape does not fit the destination field
    #[error("{schema}.{field}: cannot capture {capture} into a field of type {ty}")]
    TypeMismatch {
        schema: String,
        field: String,
        capture: &'static str,
        ty: String,
    },

    /// A quoted literal in the grammar could not be unquoted
    #[error("{schema}.{field}: invalid literal at offset {offset}: {reason}")]
    InvalidLiteral {
        schema: String,
        field: String,
        reason: String,
        offset: usize,
    },

    /// All fragments of a schema together contain no grammar
    #[error("{schema}: grammar is empty")]
    EmptyGrammar { schema: String },

    #[error("schema '{name}' is declared twice")]
    DuplicateSchema { name: String },

    #[error("schema '{name}' is not declared")]
    UndeclaredSchema { name: String },

    /// Structural problems with a declaration (duplicate field names, ...)
    #[error("{schema}: {reason}")]
    InvalidSchema { schema: String, reason: String },
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// The single positioned failure returned by a parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input diverged from the grammar
    #[error("{position}: unexpected {found} (expected {expected})")]
    Unexpected {
        position: Position,
        found: String,
        expected: String,
    },

    /// A repetition iteration succeeded without consuming any token
    #[error("{position}: repetition matched without consuming input")]
    NoProgress { position: Position },

    /// A schema re-entered itself without consuming any token
    #[error("{position}: left recursion while entering '{schema}'")]
    LeftRecursion { schema: String, position: Position },

    /// Schema objects were nested deeper than the parser allows
    #[error("{position}: nesting deeper than {limit} levels while entering '{schema}'")]
    TooDeep {
        schema: String,
        limit: usize,
        position: Position,
    },

    /// Captured text could not be converted to the field's type
    #[error("{position}: cannot convert {value:?} to {ty} for field '{field}': {reason}")]
    Conversion {
        field: String,
        ty: String,
        value: String,
        reason: String,
        position: Position,
    },

    /// A union result did not end up with exactly one active variant
    #[error("{position}: '{schema}' needs exactly one active variant, found {count}")]
    Variant {
        schema: String,
        count: usize,
        position: Position,
    },

    /// The compiled schema does not contain a descriptor it refers to
    #[error("schema '{schema}' is not compiled")]
    Unresolved { schema: String },

    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    /// Returns where the failure happened, when known.
    pub fn position(&self) -> Option<&Position> {
        match self {
            ParseError::Unexpected { position, .. }
            | ParseError::NoProgress { position }
            | ParseError::LeftRecursion { position, .. }
            | ParseError::TooDeep { position, .. }
            | ParseError::Conversion { position, .. }
            | ParseError::Variant { position, .. } => Some(position),
            ParseError::Unresolved { .. } => None,
            ParseError::Lex(error) => error.position(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

// ============================================================================
// VALUE ERRORS
// ============================================================================

/// Errors raised when extracting typed data from a parsed [`Value`](crate::Value).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: &'static str, actual: String },

    #[error("missing field: {field}")]
    MissingField { field: String },

    #[error("unknown variant '{name}' of {schema}")]
    UnknownVariant { schema: String, name: String },
}
