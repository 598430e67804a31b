use lexer_framework::{raw_text_scanner, text_scanner, unquote, Definition, LexError, Map, Stream, Token};
use proptest::prelude::*;
use std::sync::Arc;

fn bound(definition: &dyn Definition, input: &str) -> Vec<Token> {
    let mut stream = definition.lex(None, input.to_string());
    let mut tokens = Vec::new();
    loop {
        let token = stream.next().unwrap();
        if token.is_eof() {
            return tokens;
        }
        tokens.push(stream.transform(token).unwrap());
    }
}

fn values(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.value.as_str()).collect()
}

#[test]
fn test_unquote_defaults_to_string() {
    let definition = Map::unquote(Arc::new(raw_text_scanner()), &[]);
    let tokens = bound(&definition, r#""a\"b" 'c'"#);
    assert_eq!(values(&tokens), vec!["a\"b", "'c'"]);
}

#[test]
fn test_upper_selected_kinds() {
    let definition = Map::upper(text_scanner(), &["Ident"]);
    let tokens = bound(&definition, r#"abc "def" 1e3"#);
    assert_eq!(values(&tokens), vec!["ABC", "def", "1e3"]);
}

#[test]
fn test_unknown_kind_names_are_ignored() {
    let definition = Map::upper(text_scanner(), &["Nope", "Ident"]);
    assert_eq!(values(&bound(&definition, "x")), vec!["X"]);
}

#[test]
fn test_layers_apply_innermost_first() {
    // The inner layer sees quoted text; the outer layer sees the unquoted value.
    let unquoted = Arc::new(Map::unquote(Arc::new(raw_text_scanner()), &["String"]));
    let tagged = Map::new(unquoted, |mut token: Token| {
        token.value = format!("<{}>", token.value);
        Ok(token)
    });
    let tokens = bound(&tagged, r#""hi" there"#);
    assert_eq!(values(&tokens), vec!["<hi>", "<there>"]);
}

#[test]
fn test_transform_errors_carry_position() {
    let failing = Map::new(text_scanner(), |token: Token| {
        if token.value == "bad" {
            return Err(LexError::InvalidEscape {
                literal: token.value.clone(),
                reason: "rejected".to_string(),
                position: token.position,
            });
        }
        Ok(token)
    });
    let mut stream = failing.lex(Some("t"), "ok bad".to_string());
    let ok = stream.next().unwrap();
    assert!(stream.transform(ok).is_ok());
    let bad = stream.next().unwrap();
    let err = stream.transform(bad).unwrap_err();
    assert_eq!(err.position().map(|p| p.to_string()), Some("t:1:4".to_string()));
}

#[test]
fn test_peek_is_never_transformed() {
    let mut stream = Map::upper(text_scanner(), &["Ident"]).lex(None, "low".to_string());
    assert_eq!(stream.peek(0).unwrap().value, "low");
    assert_eq!(stream.next().unwrap().value, "low");
}

proptest! {
    #[test]
    fn prop_backtick_literals_are_raw(body in "[^`]*") {
        let literal = format!("`{body}`");
        prop_assert_eq!(unquote(&literal).unwrap(), body);
    }

    #[test]
    fn prop_plain_double_quoted(body in "[^\"\\\\\n]*") {
        let literal = format!("\"{body}\"");
        prop_assert_eq!(unquote(&literal).unwrap(), body);
    }
}
