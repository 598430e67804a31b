//! Built-in lexing rules.
//!
//! Each rule is constructed with the symbol id it emits, so the same rules can
//! back definitions with different symbol tables.

use crate::context::LexContext;
use crate::error::{LexError, LexResult};
use crate::quote::escape_len;
use crate::token::{SymbolId, Token};
use crate::traits::LexingRule;
use std::cmp::Reverse;

/// A rule that matches runs of whitespace, newlines included.
pub struct WhitespaceRule {
    kind: SymbolId,
}

impl WhitespaceRule {
    pub fn new(kind: SymbolId) -> Self {
        Self { kind }
    }
}

impl<Ctx> LexingRule<Ctx> for WhitespaceRule
where
    Ctx: LexContext,
{
    fn try_match(&self, ctx: &mut Ctx) -> LexResult<Option<Token>> {
        let position = ctx.position();
        let value = ctx.consume_while(char::is_whitespace);
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(Token::new(self.kind, value.to_string(), position)))
    }

    fn priority(&self) -> i32 {
        20
    }

    fn quick_check(&self, first_char: Option<char>) -> Option<bool> {
        first_char.map(char::is_whitespace)
    }
}

/// A rule that matches identifiers: a letter or `_` followed by letters,
/// digits or `_`.
pub struct IdentRule {
    kind: SymbolId,
}

impl IdentRule {
    pub fn new(kind: SymbolId) -> Self {
        Self { kind }
    }
}

impl<Ctx> LexingRule<Ctx> for IdentRule
where
    Ctx: LexContext,
{
    fn try_match(&self, ctx: &mut Ctx) -> LexResult<Option<Token>> {
        let position = ctx.position();
        match ctx.peek() {
            Some(first) if first.is_alphabetic() || first == '_' => {}
            _ => return Ok(None),
        }
        let value = ctx.consume_while(|c| c.is_alphanumeric() || c == '_');
        Ok(Some(Token::new(self.kind, value.to_string(), position)))
    }

    fn priority(&self) -> i32 {
        10
    }

    fn quick_check(&self, first_char: Option<char>) -> Option<bool> {
        first_char.map(|c| c.is_alphabetic() || c == '_')
    }
}

/// A rule that matches integer and floating point numbers.
///
/// A number with a fraction (`1.5`) or an exponent (`2e10`) is a float; the
/// fraction needs at least one digit after the dot, so `3.` lexes as an
/// integer followed by punctuation.
pub struct NumberRule {
    int: SymbolId,
    float: SymbolId,
}

impl NumberRule {
    pub fn new(int: SymbolId, float: SymbolId) -> Self {
        Self { int, float }
    }
}

impl<Ctx> LexingRule<Ctx> for NumberRule
where
    Ctx: LexContext,
{
    fn try_match(&self, ctx: &mut Ctx) -> LexResult<Option<Token>> {
        let position = ctx.position();
        let start = ctx.offset();
        if ctx.consume_while(|c| c.is_ascii_digit()).is_empty() {
            return Ok(None);
        }
        let mut kind = self.int;

        if ctx.peek() == Some('.') && ctx.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            ctx.advance();
            ctx.consume_while(|c| c.is_ascii_digit());
            kind = self.float;
        }

        if matches!(ctx.peek(), Some('e' | 'E')) {
            let signed = matches!(ctx.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if ctx.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                ctx.advance();
                if signed {
                    ctx.advance();
                }
                ctx.consume_while(|c| c.is_ascii_digit());
                kind = self.float;
            }
        }

        let value = ctx.cursor().slice_from(start);
        Ok(Some(Token::new(kind, value.to_string(), position)))
    }

    fn priority(&self) -> i32 {
        10
    }

    fn quick_check(&self, first_char: Option<char>) -> Option<bool> {
        first_char.map(|c| c.is_ascii_digit())
    }
}

/// A rule that matches quoted literals.
///
/// `"..."` and `` `...` `` produce `string` tokens. `'...'` produces a `char`
/// token when it holds exactly one character (or one escape), and a `string`
/// token otherwise. Escape syntax is validated here; the token keeps its raw
/// text, quotes included, until a transform unquotes it.
pub struct QuotedRule {
    string: SymbolId,
    char: SymbolId,
}

impl QuotedRule {
    pub fn new(string: SymbolId, char: SymbolId) -> Self {
        Self { string, char }
    }
}

impl<Ctx> LexingRule<Ctx> for QuotedRule
where
    Ctx: LexContext,
{
    fn try_match(&self, ctx: &mut Ctx) -> LexResult<Option<Token>> {
        let position = ctx.position();
        let start = ctx.offset();
        let quote = match ctx.peek() {
            Some(q @ ('"' | '\'' | '`')) => q,
            _ => return Ok(None),
        };
        ctx.advance();

        let mut units = 0usize;
        loop {
            let ch = match ctx.peek() {
                None => {
                    return Err(LexError::UnterminatedLiteral {
                        what: "quoted literal",
                        position,
                    })
                }
                Some('\n') if quote != '`' => {
                    return Err(LexError::UnterminatedLiteral {
                        what: "quoted literal",
                        position,
                    })
                }
                Some(ch) => ch,
            };
            ctx.advance();
            if ch == quote {
                break;
            }
            units += 1;
            if ch == '\\' && quote != '`' {
                let escape_position = ctx.position();
                let rest = ctx.cursor().remaining();
                let len = escape_len(&rest).map_err(|reason| LexError::InvalidEscape {
                    literal: ctx.cursor().slice_from(start).to_string(),
                    reason,
                    position: escape_position,
                })?;
                let chars = rest[..len].chars().count();
                ctx.cursor_mut().advance_by(chars);
            }
        }

        let kind = if quote == '\'' && units == 1 {
            self.char
        } else {
            self.string
        };
        let value = ctx.cursor().slice_from(start);
        Ok(Some(Token::new(kind, value.to_string(), position)))
    }

    fn priority(&self) -> i32 {
        10
    }

    fn quick_check(&self, first_char: Option<char>) -> Option<bool> {
        first_char.map(|c| matches!(c, '"' | '\'' | '`'))
    }
}

/// A rule that matches `// line` and `/* block */` comments.
pub struct CommentRule {
    kind: SymbolId,
}

impl CommentRule {
    pub fn new(kind: SymbolId) -> Self {
        Self { kind }
    }
}

impl<Ctx> LexingRule<Ctx> for CommentRule
where
    Ctx: LexContext,
{
    fn try_match(&self, ctx: &mut Ctx) -> LexResult<Option<Token>> {
        let position = ctx.position();
        let start = ctx.offset();
        match (ctx.peek(), ctx.peek_nth(1)) {
            (Some('/'), Some('/')) => {
                ctx.consume_while(|c| c != '\n');
            }
            (Some('/'), Some('*')) => {
                ctx.advance();
                ctx.advance();
                loop {
                    match ctx.advance() {
                        Some('*') if ctx.peek() == Some('/') => {
                            ctx.advance();
                            break;
                        }
                        Some(_) => {}
                        None => {
                            return Err(LexError::UnterminatedLiteral {
                                what: "block comment",
                                position,
                            })
                        }
                    }
                }
            }
            _ => return Ok(None),
        }
        let value = ctx.cursor().slice_from(start);
        Ok(Some(Token::new(self.kind, value.to_string(), position)))
    }

    fn priority(&self) -> i32 {
        15
    }

    fn quick_check(&self, first_char: Option<char>) -> Option<bool> {
        Some(first_char == Some('/'))
    }
}

/// A rule that matches a fixed set of operators, longest first.
pub struct OperatorRule {
    kind: SymbolId,
    operators: Vec<String>,
}

impl OperatorRule {
    pub fn new(kind: SymbolId, operators: &[&str]) -> Self {
        let mut operators: Vec<String> = operators.iter().map(|op| op.to_string()).collect();
        operators.sort_by_key(|op| Reverse(op.chars().count()));
        Self { kind, operators }
    }
}

impl<Ctx> LexingRule<Ctx> for OperatorRule
where
    Ctx: LexContext,
{
    fn try_match(&self, ctx: &mut Ctx) -> LexResult<Option<Token>> {
        for op in &self.operators {
            let count = op.chars().count();
            if ctx.cursor().peek_slice(count) == op.as_str() {
                let position = ctx.position();
                ctx.cursor_mut().advance_by(count);
                return Ok(Some(Token::new(self.kind, op.clone(), position)));
            }
        }
        Ok(None)
    }

    fn priority(&self) -> i32 {
        5
    }
}

/// Fallback rule: any single non-whitespace character is punctuation.
pub struct PunctRule {
    kind: SymbolId,
}

impl PunctRule {
    pub fn new(kind: SymbolId) -> Self {
        Self { kind }
    }
}

impl<Ctx> LexingRule<Ctx> for PunctRule
where
    Ctx: LexContext,
{
    fn try_match(&self, ctx: &mut Ctx) -> LexResult<Option<Token>> {
        let position = ctx.position();
        match ctx.peek() {
            Some(ch) if !ch.is_whitespace() => {
                ctx.advance();
                Ok(Some(Token::new(self.kind, ch.to_string(), position)))
            }
            _ => Ok(None),
        }
    }

    fn priority(&self) -> i32 {
        -1 // Lowest priority - only match when nothing else matches
    }
}
