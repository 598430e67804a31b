//! Token transforms layered over a [`Definition`].
//!
//! A transform runs only when the parser is about to bind a token into a
//! result. Layers compose innermost first: the wrapped definition's
//! transform runs before the wrapper's own.

use crate::definition::{Definition, Stream};
use crate::error::{LexError, LexResult};
use crate::quote;
use crate::symbols::Symbols;
use crate::token::{SymbolId, Token};
use std::collections::HashSet;
use std::sync::Arc;

/// A token transform function.
pub type TransformFn = Arc<dyn Fn(Token) -> LexResult<Token> + Send + Sync>;

/// A definition that applies a transform to the tokens of another definition.
pub struct Map {
    inner: Arc<dyn Definition>,
    transform: TransformFn,
}

impl Map {
    pub fn new<F>(inner: Arc<dyn Definition>, transform: F) -> Self
    where
        F: Fn(Token) -> LexResult<Token> + Send + Sync + 'static,
    {
        Self {
            inner,
            transform: Arc::new(transform),
        }
    }

    /// Unquotes tokens of the given symbol names; `String` when none are given.
    pub fn unquote(inner: Arc<dyn Definition>, kinds: &[&str]) -> Self {
        let kinds = if kinds.is_empty() { &["String"][..] } else { kinds };
        let table = symbol_set(&inner.symbols(), kinds);
        Self::new(inner, move |mut token: Token| {
            if table.contains(&token.kind) {
                token.value = quote::unquote(&token.value).map_err(|reason| LexError::InvalidEscape {
                    literal: token.value.clone(),
                    reason,
                    position: token.position.clone(),
                })?;
            }
            Ok(token)
        })
    }

    /// Upper-cases tokens of the given symbol names.
    pub fn upper(inner: Arc<dyn Definition>, kinds: &[&str]) -> Self {
        let table = symbol_set(&inner.symbols(), kinds);
        Self::new(inner, move |mut token: Token| {
            if table.contains(&token.kind) {
                token.value = token.value.to_uppercase();
            }
            Ok(token)
        })
    }
}

/// Resolves symbol names to ids, ignoring names the table does not know.
fn symbol_set(symbols: &Symbols, kinds: &[&str]) -> HashSet<SymbolId> {
    kinds.iter().filter_map(|name| symbols.id(name)).collect()
}

impl Definition for Map {
    fn symbols(&self) -> Arc<Symbols> {
        self.inner.symbols()
    }

    fn lex(&self, source: Option<&str>, input: String) -> Box<dyn Stream> {
        Box::new(MappedStream {
            inner: self.inner.lex(source, input),
            transform: Arc::clone(&self.transform),
        })
    }
}

struct MappedStream {
    inner: Box<dyn Stream>,
    transform: TransformFn,
}

impl Stream for MappedStream {
    fn next(&mut self) -> LexResult<Token> {
        self.inner.next()
    }

    fn peek(&mut self, n: usize) -> LexResult<&Token> {
        self.inner.peek(n)
    }

    fn transform(&self, token: Token) -> LexResult<Token> {
        (self.transform)(self.inner.transform(token)?)
    }
}
