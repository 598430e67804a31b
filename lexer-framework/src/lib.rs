//! Lexer Framework
//!
//! Produces position-tagged [`Token`]s for the parser. A [`Definition`] owns a
//! [`Symbols`] table and creates [`Stream`]s; streams support bounded peeking
//! and a bind-time [`Stream::transform`] hook.

pub mod context;
pub mod cursor;
pub mod definition;
pub mod error;
pub mod lexer;
pub mod quote;
pub mod rules;
pub mod scanner;
pub mod symbols;
pub mod token;
pub mod traits;
pub mod transform;

pub use common_framework::{Checkpoint, Position};
pub use context::{DefaultContext, LexContext};
pub use cursor::Cursor;
pub use definition::{consume_all, Definition, RuleDefinition, RuleDefinitionBuilder, Stream};
pub use error::{LexError, LexResult};
pub use lexer::{Lexer, RuleSet};
pub use quote::unquote;
pub use scanner::{raw_text_scanner, text_scanner};
pub use symbols::Symbols;
pub use token::{SymbolId, Token, EOF};
pub use traits::LexingRule;
pub use transform::{Map, TransformFn};
