use common_framework::{Checkpoint, Position, TextSlice};
use std::sync::Arc;

/// A character cursor over one source text.
///
/// Rules reach it through a [`LexContext`](crate::LexContext). Lines and
/// columns are counted in characters, offsets in bytes.
#[derive(Debug, Clone)]
pub struct Cursor {
    buffer: Arc<str>,
    current: usize,
    position: Position,
}

impl Cursor {
    /// Creates a cursor over an unnamed input string.
    pub fn new<S: Into<String>>(input: S) -> Self {
        Self::named(None, input)
    }

    /// Creates a cursor whose positions carry `source` as the file name.
    pub fn named<S: Into<String>>(source: Option<Arc<str>>, input: S) -> Self {
        Self::with_arc(Arc::from(input.into()), source)
    }

    /// Creates a cursor over an existing shared buffer.
    pub fn with_arc(buffer: Arc<str>, source: Option<Arc<str>>) -> Self {
        Self {
            buffer,
            current: 0,
            position: Position::start_of(source),
        }
    }

    fn rest(&self) -> &str {
        &self.buffer[self.current..]
    }

    fn slice(&self, start: usize, end: usize) -> TextSlice {
        TextSlice::new(Arc::clone(&self.buffer), start, end)
    }

    pub fn position(&self) -> Position {
        self.position.clone()
    }

    /// Byte offset of the next character.
    pub fn offset(&self) -> usize {
        self.current
    }

    pub fn is_eof(&self) -> bool {
        self.rest().is_empty()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character `n` places ahead; `peek_nth(0)` is `peek()`.
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Up to `n` characters ahead, without moving.
    pub fn peek_slice(&self, n: usize) -> TextSlice {
        let len = self
            .rest()
            .char_indices()
            .nth(n)
            .map_or(self.rest().len(), |(i, _)| i);
        self.slice(self.current, self.current + len)
    }

    /// Moves past one character, updating line and column.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        match ch {
            '\n' => {
                self.position.line += 1;
                self.position.column = 1;
            }
            _ => self.position.column += 1,
        }
        self.current += ch.len_utf8();
        self.position.offset = self.current;
        Some(ch)
    }

    /// Moves past up to `n` characters and returns how many it moved.
    pub fn advance_by(&mut self, n: usize) -> usize {
        (0..n).take_while(|_| self.advance().is_some()).count()
    }

    /// Consumes characters while `predicate` holds and returns them.
    pub fn consume_while<F>(&mut self, mut predicate: F) -> TextSlice
    where
        F: FnMut(char) -> bool,
    {
        let start = self.current;
        while self.peek().is_some_and(&mut predicate) {
            self.advance();
        }
        self.slice(start, self.current)
    }

    /// The text from byte offset `start` up to the cursor.
    pub fn slice_from(&self, start: usize) -> TextSlice {
        self.slice(start, self.current)
    }

    pub fn remaining(&self) -> TextSlice {
        self.slice(self.current, self.buffer.len())
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.current, self.position.clone())
    }

    pub fn restore(&mut self, checkpoint: &Checkpoint) {
        self.current = checkpoint.current();
        self.position = checkpoint.position().clone();
    }
}
