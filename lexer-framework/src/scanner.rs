//! The default text-scanner definition.
//!
//! Symbols: `Ident`, `Int`, `Float`, `Char`, `String`, `Comment`,
//! `Whitespace`, `Punct`. Whitespace and comments are elided; every other
//! non-space character is a single-character `Punct` token.

use crate::definition::{Definition, RuleDefinition};
use crate::rules::{CommentRule, IdentRule, NumberRule, PunctRule, QuotedRule, WhitespaceRule};
use crate::transform::Map;
use once_cell::sync::Lazy;
use std::sync::Arc;

static TEXT_SCANNER: Lazy<Arc<dyn Definition>> =
    Lazy::new(|| Arc::new(Map::unquote(Arc::new(raw_text_scanner()), &["String", "Char"])));

/// Builds the text-scanner rules without any transform: quoted literals keep
/// their quotes and escapes.
pub fn raw_text_scanner() -> RuleDefinition {
    let mut builder = RuleDefinition::builder();
    let ident = builder.symbol("Ident");
    let int = builder.symbol("Int");
    let float = builder.symbol("Float");
    let char = builder.symbol("Char");
    let string = builder.symbol("String");
    let comment = builder.symbol("Comment");
    let whitespace = builder.symbol("Whitespace");
    let punct = builder.symbol("Punct");

    builder
        .rule(WhitespaceRule::new(whitespace))
        .rule(CommentRule::new(comment))
        .rule(IdentRule::new(ident))
        .rule(NumberRule::new(int, float))
        .rule(QuotedRule::new(string, char))
        .rule(PunctRule::new(punct))
        .elide(whitespace)
        .elide(comment);
    builder.build()
}

/// The shared default definition: the text scanner with `String` and `Char`
/// tokens unquoted at bind time.
pub fn text_scanner() -> Arc<dyn Definition> {
    Arc::clone(&TEXT_SCANNER)
}
