//! Tokenizer for the grammar mini-language.
//!
//! Independent of the document lexer: it only knows the handful of symbols
//! the mini-language uses. Every token remembers which field's fragment it
//! came from, so captures can bind to the right field after the fragments
//! are concatenated.

use crate::error::{CompileError, CompileResult};
use lexer_framework::{unquote, Cursor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lexeme {
    /// A quoted literal, already unquoted
    Literal(String),
    Ident(String),
    At,
    AtAt,
    Pipe,
    Colon,
    Dot,
    Question,
    Star,
    Plus,
    Open(char),
    Close(char),
}

impl Lexeme {
    pub(crate) fn describe(&self) -> String {
        match self {
            Lexeme::Literal(value) => format!("literal {value:?}"),
            Lexeme::Ident(name) => format!("'{name}'"),
            Lexeme::At => "'@'".to_string(),
            Lexeme::AtAt => "'@@'".to_string(),
            Lexeme::Pipe => "'|'".to_string(),
            Lexeme::Colon => "':'".to_string(),
            Lexeme::Dot => "'.'".to_string(),
            Lexeme::Question => "'?'".to_string(),
            Lexeme::Star => "'*'".to_string(),
            Lexeme::Plus => "'+'".to_string(),
            Lexeme::Open(c) | Lexeme::Close(c) => format!("'{c}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GrammarToken {
    pub lexeme: Lexeme,
    /// Index of the field whose fragment holds this token
    pub field: usize,
    /// Byte offset inside that fragment
    pub offset: usize,
}

/// Scans one field's fragment.
pub(crate) fn scan(schema: &str, field_name: &str, field: usize, text: &str) -> CompileResult<Vec<GrammarToken>> {
    let mut cursor = Cursor::new(text);
    let mut tokens = Vec::new();

    while let Some(ch) = cursor.peek() {
        let offset = cursor.offset();
        if ch.is_whitespace() {
            cursor.advance();
            continue;
        }

        let lexeme = match ch {
            '"' | '\'' | '`' => {
                cursor.advance();
                let mut escaped = false;
                let closed = loop {
                    match cursor.advance() {
                        None => break false,
                        Some('\\') if ch != '`' && !escaped => escaped = true,
                        Some(c) if c == ch && !escaped => break true,
                        Some(_) => escaped = false,
                    }
                };
                if !closed {
                    return Err(CompileError::Unexpected {
                        schema: schema.to_string(),
                        field: field_name.to_string(),
                        found: "unterminated literal".to_string(),
                        offset,
                    });
                }
                let raw = cursor.slice_from(offset);
                let value = unquote(&raw).map_err(|reason| CompileError::InvalidLiteral {
                    schema: schema.to_string(),
                    field: field_name.to_string(),
                    reason,
                    offset,
                })?;
                Lexeme::Literal(value)
            }
            c if c.is_alphabetic() || c == '_' => {
                let name = cursor.consume_while(|c| c.is_alphanumeric() || c == '_');
                Lexeme::Ident(name.to_string())
            }
            '@' => {
                cursor.advance();
                if cursor.peek() == Some('@') {
                    cursor.advance();
                    Lexeme::AtAt
                } else {
                    Lexeme::At
                }
            }
            other => {
                cursor.advance();
                match other {
                    '|' => Lexeme::Pipe,
                    ':' => Lexeme::Colon,
                    '.' => Lexeme::Dot,
                    '?' => Lexeme::Question,
                    '*' => Lexeme::Star,
                    '+' => Lexeme::Plus,
                    '(' | '[' | '{' => Lexeme::Open(other),
                    ')' | ']' | '}' => Lexeme::Close(other),
                    _ => {
                        return Err(CompileError::Unexpected {
                            schema: schema.to_string(),
                            field: field_name.to_string(),
                            found: format!("character {other:?}"),
                            offset,
                        })
                    }
                }
            }
        };
        tokens.push(GrammarToken { lexeme, field, offset });
    }

    Ok(tokens)
}
