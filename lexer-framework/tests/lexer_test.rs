use lexer_framework::rules::{IdentRule, NumberRule, OperatorRule, PunctRule, WhitespaceRule};
use lexer_framework::{DefaultContext, LexContext, LexError, LexResult, Lexer, LexingRule, Token};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const IDENT: i32 = -2;
const NUMBER: i32 = -3;
const OP: i32 = -4;
const SPACE: i32 = -5;
const PUNCT: i32 = -6;

type Rules = Vec<Box<dyn LexingRule<DefaultContext>>>;

fn basic_rules() -> Rules {
    vec![
        Box::new(WhitespaceRule::new(SPACE)),
        Box::new(IdentRule::new(IDENT)),
        Box::new(NumberRule::new(NUMBER, NUMBER)),
        Box::new(OperatorRule::new(OP, &["=", "==", "=>", "!="])),
        Box::new(PunctRule::new(PUNCT)),
    ]
}

fn kinds_and_values(input: &str, rules: Rules) -> Vec<(i32, String)> {
    Lexer::from_str(input, rules)
        .tokenize()
        .unwrap()
        .into_iter()
        .filter(|t| t.kind != SPACE)
        .map(|t| (t.kind, t.value))
        .collect()
}

#[test]
fn test_rules_by_priority() {
    let tokens = kinds_and_values("x == 12 => y;", basic_rules());
    assert_eq!(
        tokens,
        vec![
            (IDENT, "x".to_string()),
            (OP, "==".to_string()),
            (NUMBER, "12".to_string()),
            (OP, "=>".to_string()),
            (IDENT, "y".to_string()),
            (PUNCT, ";".to_string()),
        ]
    );
}

#[test]
fn test_token_positions() {
    let tokens = Lexer::from_str("ab\n  cd", basic_rules()).tokenize().unwrap();
    let cd = tokens.iter().find(|t| t.value == "cd").unwrap();
    assert_eq!((cd.position.line, cd.position.column, cd.position.offset), (2, 3, 5));
}

/// Counts how often the full match runs.
struct CountingRule {
    calls: Arc<AtomicUsize>,
}

impl LexingRule<DefaultContext> for CountingRule {
    fn try_match(&self, ctx: &mut DefaultContext) -> LexResult<Option<Token>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let position = ctx.position();
        match ctx.peek() {
            Some('#') => {
                ctx.advance();
                Ok(Some(Token::new(OP, "#", position)))
            }
            _ => Ok(None),
        }
    }

    fn priority(&self) -> i32 {
        100
    }

    fn quick_check(&self, first_char: Option<char>) -> Option<bool> {
        Some(first_char == Some('#'))
    }
}

#[test]
fn test_quick_check_skips_rules() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut rules = basic_rules();
    rules.push(Box::new(CountingRule {
        calls: Arc::clone(&calls),
    }));
    let tokens = kinds_and_values("a # b # c", rules);
    assert_eq!(tokens.len(), 5);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// Consumes part of its input and then gives up.
struct PartialRule;

impl LexingRule<DefaultContext> for PartialRule {
    fn try_match(&self, ctx: &mut DefaultContext) -> LexResult<Option<Token>> {
        ctx.consume_while(|c| c == 'a');
        Ok(None)
    }

    fn priority(&self) -> i32 {
        50
    }
}

#[test]
fn test_failed_rule_restores_cursor() {
    let mut rules = basic_rules();
    rules.push(Box::new(PartialRule));
    let tokens = kinds_and_values("aaa", rules);
    assert_eq!(tokens, vec![(IDENT, "aaa".to_string())]);
}

/// Claims a match without consuming anything.
struct StuckRule;

impl LexingRule<DefaultContext> for StuckRule {
    fn try_match(&self, ctx: &mut DefaultContext) -> LexResult<Option<Token>> {
        Ok(Some(Token::new(PUNCT, "", ctx.position())))
    }
}

#[test]
fn test_rule_without_progress_is_an_error() {
    let mut lexer = Lexer::from_str("x", vec![Box::new(StuckRule) as Box<dyn LexingRule<DefaultContext>>]);
    assert!(matches!(lexer.next_token(), Err(LexError::NoProgress { .. })));
    assert_eq!(lexer.context().offset(), 0);
}

#[test]
fn test_unexpected_character() {
    let rules: Rules = vec![Box::new(IdentRule::new(IDENT))];
    let err = Lexer::from_str("ab?", rules).tokenize().unwrap_err();
    match err {
        LexError::UnexpectedChar { ch, position } => {
            assert_eq!(ch, '?');
            assert_eq!(position.column, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_iterator_stops_after_error() {
    let rules: Rules = vec![Box::new(IdentRule::new(IDENT))];
    let mut lexer = Lexer::from_str("ab ?", rules);
    assert!(matches!(lexer.next(), Some(Ok(_))));
    assert!(matches!(lexer.next(), Some(Err(_))));
    assert!(lexer.next().is_none());
    assert!(lexer.next().is_none());
}

#[test]
fn test_empty_input_yields_nothing() {
    let mut lexer = Lexer::from_str("", basic_rules());
    assert!(lexer.next_token().unwrap().is_none());
    assert!(lexer.tokenize().unwrap().is_empty());
}

#[test]
fn test_numbers() {
    // Without an identifier rule a stray exponent marker is punctuation.
    let rules: Rules = vec![
        Box::new(WhitespaceRule::new(SPACE)),
        Box::new(NumberRule::new(NUMBER, -9)),
        Box::new(PunctRule::new(PUNCT)),
    ];
    let tokens = kinds_and_values("1 2.5 3. 4e10 5e+ 6E-2", rules);
    assert_eq!(
        tokens,
        vec![
            (NUMBER, "1".to_string()),
            (-9, "2.5".to_string()),
            (NUMBER, "3".to_string()),
            (PUNCT, ".".to_string()),
            (-9, "4e10".to_string()),
            (NUMBER, "5".to_string()),
            (PUNCT, "e".to_string()),
            (PUNCT, "+".to_string()),
            (-9, "6E-2".to_string()),
        ]
    );
}
