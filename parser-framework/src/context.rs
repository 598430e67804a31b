use crate::error::{ParseError, ParseResult};
use crate::graph::Graph;
use common_framework::{Checkpoint, Position};
use lexer_framework::{LexResult, Stream, Token};

/// A recoverable divergence from the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Mismatch {
    pub index: usize,
    pub position: Position,
    pub found: String,
    pub expected: Vec<String>,
}

impl From<Mismatch> for ParseError {
    fn from(mismatch: Mismatch) -> Self {
        let expected = if mismatch.expected.is_empty() {
            "nothing".to_string()
        } else {
            mismatch.expected.join(" or ")
        };
        ParseError::Unexpected {
            position: mismatch.position,
            found: mismatch.found,
            expected,
        }
    }
}

/// Tokens behind every live pin are dropped once this many pile up.
const TRIM_THRESHOLD: usize = 256;

/// State of one parse: a buffered cursor over the token stream plus the
/// destination graph being built.
///
/// Tokens are pulled from the stream on demand. Token indices are absolute;
/// `tokens[0]` is token `base`. Checkpoints and captures pin the index they
/// may return to, and tokens before the oldest pin are released as the
/// cursor moves on. Restoring a checkpoint rewinds the cursor and the graph
/// together.
pub(crate) struct ParseContext {
    stream: Box<dyn Stream>,
    tokens: Vec<Token>,
    base: usize,
    current: usize,
    /// Live pins, oldest first. Scopes nest, so the first is the lowest.
    pins: Vec<usize>,
    graph: Graph,
    furthest: Option<Mismatch>,
}

impl ParseContext {
    pub fn new(stream: Box<dyn Stream>) -> Self {
        Self {
            stream,
            tokens: Vec::new(),
            base: 0,
            current: 0,
            pins: Vec::new(),
            graph: Graph::new(),
            furthest: None,
        }
    }

    /// Returns the token `n` positions ahead of the cursor. Past the end of
    /// input this is the EOF token.
    pub fn peek(&mut self, n: usize) -> LexResult<&Token> {
        let wanted = self.current + n - self.base;
        while self.tokens.len() <= wanted {
            if self.tokens.last().is_some_and(Token::is_eof) {
                break;
            }
            let token = self.stream.next()?;
            self.tokens.push(token);
        }
        let index = wanted.min(self.tokens.len() - 1);
        Ok(&self.tokens[index])
    }

    /// Clones the next `n` tokens.
    pub fn window(&mut self, n: usize) -> LexResult<Vec<Token>> {
        let mut window = Vec::with_capacity(n);
        for i in 0..n {
            let token = self.peek(i)?;
            let done = token.is_eof();
            window.push(token.clone());
            if done {
                break;
            }
        }
        Ok(window)
    }

    /// Consumes the current token. The cursor never moves past EOF.
    pub fn advance(&mut self) -> LexResult<Token> {
        let token = self.peek(0)?.clone();
        if !token.is_eof() {
            self.current += 1;
            self.trim();
        }
        Ok(token)
    }

    /// Drops buffered tokens that no pin and not the cursor can reach again.
    fn trim(&mut self) {
        let low = self.pins.first().copied().unwrap_or(self.current).min(self.current);
        let dead = low - self.base;
        if dead >= TRIM_THRESHOLD {
            self.tokens.drain(..dead);
            self.base = low;
        }
    }

    /// Keeps the current token and everything after it buffered until the
    /// matching [`unpin`](Self::unpin). Returns the pinned index.
    pub fn pin(&mut self) -> usize {
        self.pins.push(self.current);
        self.current
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(at) = self.pins.iter().rposition(|&pin| pin == index) {
            self.pins.remove(at);
        }
    }

    pub fn token_index(&self) -> usize {
        self.current
    }

    /// Position of the current token, or of the last token seen.
    pub fn position(&self) -> Position {
        self.tokens
            .get(self.current - self.base)
            .or_else(|| self.tokens.last())
            .map(|token| token.position.clone())
            .unwrap_or_default()
    }

    /// The tokens consumed since `start`, transformed for binding.
    ///
    /// `start` must still be buffered, which holding a pin on it ensures.
    pub fn consumed(&self, start: usize) -> ParseResult<Vec<Token>> {
        let end = (self.current - self.base).min(self.tokens.len());
        let start = start.saturating_sub(self.base).min(end);
        self.tokens[start..end]
            .iter()
            .map(|token| self.stream.transform(token.clone()).map_err(ParseError::from))
            .collect()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Marks the current state and pins it until [`release`](Self::release).
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.pin();
        Checkpoint::with_journal(self.current, self.position(), self.graph.journal_len())
    }

    pub fn release(&mut self, checkpoint: &Checkpoint) {
        self.unpin(checkpoint.token_index());
    }

    pub fn restore(&mut self, checkpoint: &Checkpoint) {
        tracing::trace!(
            from = self.current,
            to = checkpoint.token_index(),
            position = %checkpoint.position(),
            "restoring checkpoint"
        );
        debug_assert!(checkpoint.token_index() >= self.base, "restoring a released token");
        self.current = checkpoint.token_index().max(self.base);
        self.graph.rollback(checkpoint.journal());
    }

    /// Records a mismatch at the current token and returns it. The furthest
    /// mismatch of the whole parse is kept for error reporting.
    pub fn mismatch(&mut self, expected: Vec<String>) -> LexResult<Mismatch> {
        self.mismatch_ahead(0, expected)
    }

    /// Records a mismatch at the token `n` positions ahead of the cursor.
    pub fn mismatch_ahead(&mut self, n: usize, expected: Vec<String>) -> LexResult<Mismatch> {
        let token = self.peek(n)?;
        let found = token.to_string();
        let position = token.position.clone();
        let mismatch = Mismatch {
            index: self.current + n,
            position,
            found,
            expected,
        };
        let further = self
            .furthest
            .as_ref()
            .map_or(true, |furthest| mismatch.index > furthest.index);
        if further {
            self.furthest = Some(mismatch.clone());
        }
        Ok(mismatch)
    }

    /// The furthest mismatch recorded so far, falling back to `mismatch`.
    pub fn furthest(&self, mismatch: Mismatch) -> Mismatch {
        match &self.furthest {
            Some(furthest) if furthest.index > mismatch.index => furthest.clone(),
            _ => mismatch,
        }
    }

    /// Number of tokens pulled from the stream so far.
    pub fn pulled(&self) -> usize {
        self.base + self.tokens.len()
    }

    /// Number of tokens currently held in the buffer.
    pub fn buffered(&self) -> usize {
        self.tokens.len()
    }
}
