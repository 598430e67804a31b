use crate::cursor::Cursor;
use common_framework::{Checkpoint, Position, TextSlice};
use std::sync::Arc;

/// Context for lexing operations.
///
/// Lexing rules are written against this trait instead of a concrete lexer,
/// so the same rule set can drive different contexts.
pub trait LexContext {
    /// Returns a reference to the cursor.
    fn cursor(&self) -> &Cursor;

    /// Returns a mutable reference to the cursor.
    fn cursor_mut(&mut self) -> &mut Cursor;

    /// Returns the current position.
    fn position(&self) -> Position {
        self.cursor().position()
    }

    /// Returns the current byte offset.
    fn offset(&self) -> usize {
        self.cursor().offset()
    }

    /// Returns true if at end of input.
    fn is_eof(&self) -> bool {
        self.cursor().is_eof()
    }

    /// Peeks at the next character without advancing.
    fn peek(&self) -> Option<char> {
        self.cursor().peek()
    }

    /// Peeks `n` characters ahead without advancing.
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.cursor().peek_nth(n)
    }

    /// Advances the cursor and returns the character.
    fn advance(&mut self) -> Option<char> {
        self.cursor_mut().advance()
    }

    /// Consumes characters while the predicate returns true.
    fn consume_while<F>(&mut self, predicate: F) -> TextSlice
    where
        F: FnMut(char) -> bool,
    {
        self.cursor_mut().consume_while(predicate)
    }

    /// Creates a checkpoint of the current state.
    fn checkpoint(&self) -> Checkpoint {
        self.cursor().checkpoint()
    }

    /// Restores the cursor to a checkpoint.
    fn restore(&mut self, checkpoint: &Checkpoint) {
        self.cursor_mut().restore(checkpoint);
    }
}

/// A simple default context implementation.
#[derive(Debug, Clone)]
pub struct DefaultContext {
    cursor: Cursor,
}

impl DefaultContext {
    pub fn new<S: Into<String>>(input: S) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Creates a context whose positions carry the given source name.
    pub fn named<S: Into<String>>(source: Option<Arc<str>>, input: S) -> Self {
        Self {
            cursor: Cursor::named(source, input),
        }
    }
}

impl LexContext for DefaultContext {
    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }
}
