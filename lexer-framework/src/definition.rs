use crate::context::{DefaultContext, LexContext};
use crate::error::{LexError, LexResult};
use crate::lexer::{rule_set, Lexer, RuleSet};
use crate::symbols::Symbols;
use crate::token::{SymbolId, Token};
use crate::traits::LexingRule;
use std::collections::{HashSet, VecDeque};
use std::io::Read;
use std::sync::Arc;

/// A stream of tokens over one source.
///
/// Once the source is exhausted the stream keeps returning the same EOF
/// token. Lex failures abort the current call; repeating the call repeats
/// the failure.
pub trait Stream {
    /// Consumes and returns the next token.
    fn next(&mut self) -> LexResult<Token>;

    /// Returns the token `n` positions ahead without consuming anything.
    /// `peek(0)` is the token the next call to `next` returns.
    fn peek(&mut self, n: usize) -> LexResult<&Token>;

    /// Post-processes a token that is about to be bound into a result.
    ///
    /// Never applied to tokens that are only looked at, so an expensive or
    /// failing transform runs once per bound token.
    fn transform(&self, token: Token) -> LexResult<Token>;
}

/// Produces streams and owns the symbol table they share.
pub trait Definition: Send + Sync {
    /// The symbol table, fixed for the lifetime of the definition.
    fn symbols(&self) -> Arc<Symbols>;

    /// Creates a stream over `input`. `source` names the input in positions.
    fn lex(&self, source: Option<&str>, input: String) -> Box<dyn Stream>;

    /// Reads the whole of `reader` and creates a stream over it.
    fn lex_reader(&self, source: Option<&str>, reader: &mut dyn Read) -> LexResult<Box<dyn Stream>> {
        let mut input = String::new();
        reader
            .read_to_string(&mut input)
            .map_err(|error| LexError::Io {
                source_name: source.unwrap_or(common_framework::UNKNOWN_SOURCE).to_string(),
                error,
            })?;
        Ok(self.lex(source, input))
    }
}

/// Reads every token of a stream, EOF included.
pub fn consume_all(stream: &mut dyn Stream, transform: bool) -> LexResult<Vec<Token>> {
    let mut tokens = Vec::new();
    loop {
        let mut token = stream.next()?;
        if transform {
            token = stream.transform(token)?;
        }
        let done = token.is_eof();
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// A definition driven by a priority-ordered set of [`LexingRule`]s.
pub struct RuleDefinition {
    symbols: Arc<Symbols>,
    rules: RuleSet<DefaultContext>,
    elide: Arc<HashSet<SymbolId>>,
}

impl RuleDefinition {
    pub fn builder() -> RuleDefinitionBuilder {
        RuleDefinitionBuilder::default()
    }
}

impl Definition for RuleDefinition {
    fn symbols(&self) -> Arc<Symbols> {
        Arc::clone(&self.symbols)
    }

    fn lex(&self, source: Option<&str>, input: String) -> Box<dyn Stream> {
        let context = DefaultContext::named(source.map(Arc::from), input);
        Box::new(RuleStream {
            lexer: Lexer::with_rule_set(context, Arc::clone(&self.rules)),
            elide: Arc::clone(&self.elide),
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }
}

/// Collects symbols, rules and elided symbols for a [`RuleDefinition`].
#[derive(Default)]
pub struct RuleDefinitionBuilder {
    names: Vec<String>,
    rules: Vec<Box<dyn LexingRule<DefaultContext>>>,
    elide: HashSet<SymbolId>,
}

impl RuleDefinitionBuilder {
    /// Declares a symbol (if it is new) and returns its id.
    pub fn symbol(&mut self, name: &str) -> SymbolId {
        if name == "EOF" {
            return crate::token::EOF;
        }
        let index = match self.names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        };
        -(index as SymbolId) - 2
    }

    pub fn rule<R>(&mut self, rule: R) -> &mut Self
    where
        R: LexingRule<DefaultContext> + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Drops tokens of this symbol from the stream (whitespace, comments).
    pub fn elide(&mut self, kind: SymbolId) -> &mut Self {
        self.elide.insert(kind);
        self
    }

    pub fn build(self) -> RuleDefinition {
        RuleDefinition {
            symbols: Arc::new(Symbols::new(self.names)),
            rules: rule_set(self.rules),
            elide: Arc::new(self.elide),
        }
    }
}

/// Stream over a rule-driven lexer with a lookahead buffer.
///
/// Tokens are pulled from the lexer on demand. Once the lexer is exhausted
/// the EOF token stays at the back of the buffer and is never popped.
struct RuleStream {
    lexer: Lexer<DefaultContext>,
    elide: Arc<HashSet<SymbolId>>,
    buffer: VecDeque<Token>,
    exhausted: bool,
}

impl RuleStream {
    /// Ensures that the buffer holds the token at `n`, or ends with EOF.
    fn fill(&mut self, n: usize) -> LexResult<()> {
        while self.buffer.len() <= n && !self.exhausted {
            match self.lexer.next_token()? {
                Some(token) if self.elide.contains(&token.kind) => {}
                Some(token) => self.buffer.push_back(token),
                None => {
                    let position = self.lexer.context().position();
                    self.buffer.push_back(Token::eof(position));
                    self.exhausted = true;
                }
            }
        }
        Ok(())
    }
}

impl Stream for RuleStream {
    fn next(&mut self) -> LexResult<Token> {
        self.fill(0)?;
        if self.exhausted && self.buffer.len() == 1 {
            return Ok(self.buffer[0].clone());
        }
        match self.buffer.pop_front() {
            Some(token) => Ok(token),
            None => Err(LexError::NoProgress {
                position: self.lexer.context().position(),
            }),
        }
    }

    fn peek(&mut self, n: usize) -> LexResult<&Token> {
        self.fill(n)?;
        let index = n.min(self.buffer.len().saturating_sub(1));
        Ok(&self.buffer[index])
    }

    fn transform(&self, token: Token) -> LexResult<Token> {
        Ok(token)
    }
}
