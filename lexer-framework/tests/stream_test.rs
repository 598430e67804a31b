use lexer_framework::{consume_all, raw_text_scanner, text_scanner, Definition, LexError, Stream, Token, EOF};
use proptest::prelude::*;

fn lex(input: &str) -> Vec<Token> {
    let mut stream = text_scanner().lex(None, input.to_string());
    consume_all(stream.as_mut(), false).unwrap()
}

fn names(tokens: &[Token]) -> Vec<String> {
    let symbols = text_scanner().symbols();
    tokens
        .iter()
        .map(|t| symbols.name(t.kind).unwrap_or("?").to_string())
        .collect()
}

#[test]
fn test_text_scanner_symbols() {
    let symbols = text_scanner().symbols();
    assert_eq!(symbols.id("EOF"), Some(EOF));
    assert_eq!(symbols.id("Ident"), Some(-2));
    assert_eq!(symbols.id("Int"), Some(-3));
    assert_eq!(symbols.id("Punct"), Some(-9));
    assert_eq!(symbols.len(), 9);
}

#[test]
fn test_hello_world_positions() {
    let tokens = lex("hello world");
    let summary: Vec<_> = tokens
        .iter()
        .map(|t| (t.value.as_str(), t.position.line, t.position.column))
        .collect();
    assert_eq!(summary, vec![("hello", 1, 1), ("world", 1, 7), ("", 1, 12)]);
    assert_eq!(names(&tokens), vec!["Ident", "Ident", "EOF"]);
}

#[test]
fn test_whitespace_and_comments_are_elided() {
    let tokens = lex("a // line\n/* block\n */ b");
    assert_eq!(names(&tokens), vec!["Ident", "Ident", "EOF"]);
    assert_eq!(tokens[1].position.line, 3);
}

#[test]
fn test_token_kinds() {
    let tokens = lex(r#"x 12 1.5 'c' "str" `raw` 'two' {"#);
    assert_eq!(
        names(&tokens),
        vec!["Ident", "Int", "Float", "Char", "String", "String", "String", "Punct", "EOF"]
    );
    // Tokens keep their quotes until they are transformed.
    assert_eq!(tokens[4].value, r#""str""#);
}

#[test]
fn test_eof_repeats() {
    let mut stream = text_scanner().lex(None, "x".to_string());
    assert_eq!(stream.next().unwrap().value, "x");
    for _ in 0..3 {
        assert!(stream.next().unwrap().is_eof());
        assert!(stream.peek(5).unwrap().is_eof());
    }
}

#[test]
fn test_peek_clamps_at_eof() {
    let mut stream = text_scanner().lex(None, "a b".to_string());
    assert_eq!(stream.peek(1).unwrap().value, "b");
    assert!(stream.peek(2).unwrap().is_eof());
    assert!(stream.peek(100).unwrap().is_eof());
    assert_eq!(stream.next().unwrap().value, "a");
}

#[test]
fn test_transform_only_on_request() {
    let mut stream = text_scanner().lex(None, r#""a\tb""#.to_string());
    let token = stream.next().unwrap();
    assert_eq!(token.value, r#""a\tb""#);
    assert_eq!(stream.transform(token).unwrap().value, "a\tb");

    let tokens = consume_all(text_scanner().lex(None, "'x'".to_string()).as_mut(), true).unwrap();
    assert_eq!(tokens[0].value, "x");
}

#[test]
fn test_raw_scanner_keeps_quotes() {
    let mut stream = raw_text_scanner().lex(None, r#""q""#.to_string());
    let token = stream.next().unwrap();
    assert_eq!(stream.transform(token).unwrap().value, r#""q""#);
}

#[test]
fn test_lex_errors() {
    let mut stream = text_scanner().lex(Some("in.txt"), "ok \"open".to_string());
    assert_eq!(stream.next().unwrap().value, "ok");
    let err = stream.next().unwrap_err();
    assert!(matches!(err, LexError::UnterminatedLiteral { .. }));
    assert_eq!(err.to_string(), "in.txt:1:4: unterminated quoted literal");
    // The failure repeats rather than skipping ahead.
    assert!(stream.peek(0).is_err());

    let mut stream = text_scanner().lex(None, r#""\z""#.to_string());
    assert!(matches!(stream.next(), Err(LexError::InvalidEscape { .. })));

    let mut stream = text_scanner().lex(None, "/* never closed".to_string());
    assert!(matches!(stream.next(), Err(LexError::UnterminatedLiteral { what: "block comment", .. })));
}

#[test]
fn test_lex_reader() {
    let mut reader = "alpha\nbeta".as_bytes();
    let mut stream = text_scanner().lex_reader(Some("file.txt"), &mut reader).unwrap();
    stream.next().unwrap();
    let beta = stream.next().unwrap();
    assert_eq!(beta.position.to_string(), "file.txt:2:1");
}

proptest! {
    #[test]
    fn prop_peek_matches_next(words in prop::collection::vec("[a-z]{1,6}|[0-9]{1,4}|[{}=;,]", 0..20), depth in 0usize..6) {
        let input = words.join(" ");
        let expected = lex(&input);

        let mut stream = text_scanner().lex(None, input.clone());
        let mut index = 0;
        loop {
            let ahead = stream.peek(depth).unwrap().clone();
            let want = &expected[(index + depth).min(expected.len() - 1)];
            prop_assert_eq!(&ahead, want);

            let token = stream.next().unwrap();
            prop_assert_eq!(&token, &expected[index.min(expected.len() - 1)]);
            if token.is_eof() {
                break;
            }
            index += 1;
        }
    }

    #[test]
    fn prop_identifiers_roundtrip(words in prop::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,8}", 1..10)) {
        let input = words.join("  ");
        let tokens = lex(&input);
        let values: Vec<_> = tokens.iter().filter(|t| !t.is_eof()).map(|t| t.value.clone()).collect();
        prop_assert_eq!(values, words);
    }
}
