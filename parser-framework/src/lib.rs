//! Parser Framework
//!
//! Compiles declarative per-field grammars into Schema Descriptors and runs
//! them against a [`Stream`](lexer_framework::Stream) to build a [`Value`]
//! graph.
//!
//! ```text
//! Schema declarations ──► Registry::compile ──► CompiledSchema
//!                                                    │
//!                 Definition::lex ──► Stream ──► CompiledSchema::parse ──► Value
//! ```

mod context;
mod engine;
pub mod error;
pub mod grammar;
mod graph;
pub mod lookahead;
pub mod schema;
pub mod value;

pub use common_framework::Position;
pub use error::{CompileError, CompileResult, ParseError, ParseResult, ValueError};
pub use grammar::{Disjunction, Node};
pub use lookahead::{LookaheadOptions, Shape, Signature};
pub use schema::{
    CompiledSchema, Descriptor, Field, FieldDecl, FieldType, Registry, Schema, SchemaId, SchemaKind, DEFAULT_MAX_DEPTH,
};
pub use value::{FromValue, Record, Value, Variant};
