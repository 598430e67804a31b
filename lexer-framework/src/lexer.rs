use crate::context::{DefaultContext, LexContext};
use crate::error::{LexError, LexResult};
use crate::token::Token;
use crate::traits::LexingRule;
use std::cmp::Reverse;
use std::sync::Arc;

/// Shared, priority-ordered rule set.
pub type RuleSet<Ctx> = Arc<[Box<dyn LexingRule<Ctx>>]>;

/// Sorts rules by priority (highest first) and freezes them for sharing.
pub fn rule_set<Ctx: LexContext>(rules: Vec<Box<dyn LexingRule<Ctx>>>) -> RuleSet<Ctx> {
    let mut sorted_rules = rules;
    sorted_rules.sort_by_key(|rule| Reverse(rule.priority()));
    sorted_rules.into()
}

/// A lexer that applies rules in priority order.
pub struct Lexer<Ctx>
where
    Ctx: LexContext,
{
    context: Ctx,
    rules: RuleSet<Ctx>,
    halted: bool,
}

impl<Ctx> Lexer<Ctx>
where
    Ctx: LexContext,
{
    /// Creates a new lexer with the given context and rules.
    pub fn new(context: Ctx, rules: Vec<Box<dyn LexingRule<Ctx>>>) -> Self {
        Self::with_rule_set(context, rule_set(rules))
    }

    /// Creates a lexer over an already sorted, shared rule set.
    pub fn with_rule_set(context: Ctx, rules: RuleSet<Ctx>) -> Self {
        Self {
            context,
            rules,
            halted: false,
        }
    }

    /// Returns a reference to the context.
    pub fn context(&self) -> &Ctx {
        &self.context
    }

    /// Returns a mutable reference to the context.
    pub fn context_mut(&mut self) -> &mut Ctx {
        &mut self.context
    }

    /// Tries to match the next token using the rules.
    ///
    /// Rules whose `quick_check` rules them out are skipped; a checkpoint is
    /// only taken for rules that are actually tried. Returns `Ok(None)` at end
    /// of input, and an error when no rule accepts the next character.
    pub fn next_token(&mut self) -> LexResult<Option<Token>> {
        if self.context.is_eof() {
            return Ok(None);
        }
        let first_char = self.context.peek();
        let offset_before = self.context.offset();

        for rule in self.rules.iter() {
            if let Some(false) = rule.quick_check(first_char) {
                continue;
            }

            let checkpoint = self.context.checkpoint();
            match rule.try_match(&mut self.context) {
                Ok(Some(token)) => {
                    if self.context.offset() == offset_before {
                        tracing::warn!(
                            offset = offset_before,
                            "lexing rule matched without consuming input"
                        );
                        self.context.restore(&checkpoint);
                        return Err(LexError::NoProgress {
                            position: self.context.position(),
                        });
                    }
                    return Ok(Some(token));
                }
                Ok(None) => self.context.restore(&checkpoint),
                Err(error) => {
                    self.context.restore(&checkpoint);
                    return Err(error);
                }
            }
        }

        Err(LexError::UnexpectedChar {
            ch: first_char.unwrap_or('\0'),
            position: self.context.position(),
        })
    }

    /// Collects all tokens from the input (without an EOF token).
    pub fn tokenize(&mut self) -> LexResult<Vec<Token>> {
        self.collect()
    }
}

impl Lexer<DefaultContext> {
    /// Creates a new lexer with a default context from an input string.
    pub fn from_str<S: Into<String>>(input: S, rules: Vec<Box<dyn LexingRule<DefaultContext>>>) -> Self {
        Self::new(DefaultContext::new(input), rules)
    }
}

/// The lexer is an iterator of tokens; it stops after the last token or the
/// first error.
impl<Ctx> Iterator for Lexer<Ctx>
where
    Ctx: LexContext,
{
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let item = self.next_token().transpose();
        self.halted = matches!(item, None | Some(Err(_)));
        item
    }
}
