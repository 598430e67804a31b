//! Schema Pipeline
//!
//! Ties a lexer [`Definition`](lexer_framework::Definition) to compiled
//! schemas: declare output structures with per-field grammars, build a
//! [`Parser`], and parse text or readers into [`Value`]s.

pub mod error;
pub mod parser;

pub use error::{Error, Result};
pub use lexer_framework::{text_scanner, Definition, Map, RuleDefinition};
pub use parser::{Parser, ParserBuilder, ParserOptions};
pub use parser_framework::{
    CompileError, FieldType, FromValue, LookaheadOptions, ParseError, Position, Record, Schema, Value, ValueError,
    Variant, DEFAULT_MAX_DEPTH,
};
