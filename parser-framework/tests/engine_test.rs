use lexer_framework::{text_scanner, Definition};
use parser_framework::*;

fn compile(schemas: Vec<Schema>, root: &str) -> CompiledSchema {
    let mut registry = Registry::new(text_scanner().symbols());
    for schema in schemas {
        registry.declare(schema).unwrap();
    }
    registry.compile(root).unwrap()
}

fn parse(compiled: &CompiledSchema, input: &str) -> ParseResult<Value> {
    compiled.parse(text_scanner().lex(None, input.to_string()))
}

#[test]
fn test_sequence_binds_fields() {
    let compiled = compile(
        vec![Schema::record("Assign")
            .field("name", FieldType::String, r#""let" @Ident "=""#)
            .field("value", FieldType::Int, "@Int")],
        "Assign",
    );
    let value = parse(&compiled, "let x = 42").unwrap();
    let record = value.as_record().unwrap();
    assert_eq!(record.type_name(), "Assign");
    assert_eq!(record.field::<String>("name").unwrap(), "x");
    assert_eq!(record.field::<i64>("value").unwrap(), 42);
}

#[test]
fn test_optional_rolls_back_partial_bindings() {
    // The optional group binds `a` before failing on the missing "!", so the
    // rollback has to clear it again.
    let compiled = compile(
        vec![Schema::record("S")
            .field("a", FieldType::String, r#"[ @Ident "!" ]"#)
            .field("b", FieldType::String, "@Ident")],
        "S",
    );
    let value = parse(&compiled, "only").unwrap();
    assert_eq!(value.get("a"), Some(&Value::Null));
    assert_eq!(value.get("b"), Some(&Value::String("only".into())));

    let value = parse(&compiled, "x ! y").unwrap();
    assert_eq!(value.get("a"), Some(&Value::String("x".into())));
    assert_eq!(value.get("b"), Some(&Value::String("y".into())));
}

#[test]
fn test_repetition_collects_list() {
    let compiled = compile(
        vec![Schema::record("Numbers").field("items", FieldType::list(FieldType::Int), r#""[" { @Int [ "," ] } "]""#)],
        "Numbers",
    );
    let value = parse(&compiled, "[1, 2, 3]").unwrap();
    assert_eq!(value.get("items").unwrap().extract::<Vec<i64>>().unwrap(), vec![1, 2, 3]);

    let value = parse(&compiled, "[]").unwrap();
    assert_eq!(value.get("items"), Some(&Value::List(Vec::new())));
}

#[test]
fn test_repetition_minimum() {
    let compiled = compile(
        vec![Schema::record("Words").field("words", FieldType::list(FieldType::String), "@Ident+")],
        "Words",
    );
    assert!(parse(&compiled, "a b c").is_ok());
    let err = parse(&compiled, "").unwrap_err();
    assert!(matches!(err, ParseError::Unexpected { ref expected, .. } if expected == "Ident"));
}

#[test]
fn test_string_fields_concatenate() {
    let compiled = compile(
        vec![Schema::record("Path").field("path", FieldType::String, r#"@Ident { @"." @Ident }"#)],
        "Path",
    );
    let value = parse(&compiled, "a.b.c").unwrap();
    assert_eq!(value.get("path"), Some(&Value::String("a.b.c".into())));
}

#[test]
fn test_bool_and_float_fields() {
    let compiled = compile(
        vec![Schema::record("Setting")
            .field("enabled", FieldType::Bool, r#"@"on"?"#)
            .field("ratio", FieldType::Float, r#"@( ["-"] (Float | Int) )"#)],
        "Setting",
    );
    let value = parse(&compiled, "on 0.5").unwrap();
    assert_eq!(value.get("enabled"), Some(&Value::Bool(true)));
    assert_eq!(value.get("ratio"), Some(&Value::Float(0.5)));

    let value = parse(&compiled, "- 2").unwrap();
    assert_eq!(value.get("ratio"), Some(&Value::Float(-2.0)));
}

#[test]
fn test_conversion_failure_is_positioned() {
    let compiled = compile(
        vec![Schema::record("Big").field("n", FieldType::Int, "@Int")],
        "Big",
    );
    let err = parse(&compiled, "99999999999999999999999").unwrap_err();
    match err {
        ParseError::Conversion { field, position, .. } => {
            assert_eq!(field, "n");
            assert_eq!((position.line, position.column), (1, 1));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_trailing_input_is_rejected() {
    let compiled = compile(
        vec![Schema::record("One").field("name", FieldType::String, "@Ident")],
        "One",
    );
    let err = parse(&compiled, "a b").unwrap_err();
    assert_eq!(err.to_string(), r#"<source>:1:3: unexpected "b" (expected <EOF>)"#);
}

#[test]
fn test_furthest_failure_is_reported() {
    // The repetition swallows the failing iteration; the error still points
    // at the missing "=" rather than at the start of the entry.
    let compiled = compile(
        vec![Schema::record("Pairs").field(
            "keys",
            FieldType::list(FieldType::String),
            r#"{ @Ident "=" Int }"#,
        )],
        "Pairs",
    );
    let err = parse(&compiled, "a = 1 b 2").unwrap_err();
    assert_eq!(err.to_string(), r#"<source>:1:9: unexpected "2" (expected "=")"#);
}

#[test]
fn test_left_recursion_aborts() {
    let compiled = compile(
        vec![Schema::record("Expr")
            .field("left", FieldType::structure("Expr"), "[ @@ ]")
            .field("op", FieldType::String, r#"@"+""#)],
        "Expr",
    );
    let err = parse(&compiled, "+").unwrap_err();
    assert!(matches!(err, ParseError::LeftRecursion { ref schema, .. } if schema == "Expr"));
}

#[test]
fn test_zero_width_repetition_fails_fast() {
    let compiled = compile(
        vec![Schema::record("Loop").field("xs", FieldType::list(FieldType::String), r#"{ [ @"x" ] }"#)],
        "Loop",
    );
    assert!(matches!(parse(&compiled, "x x y"), Err(ParseError::NoProgress { .. })));
}

#[test]
fn test_typed_literal() {
    let compiled = compile(
        vec![Schema::record("Kw").field("word", FieldType::String, r#"@"if":Ident"#)],
        "Kw",
    );
    assert!(parse(&compiled, "if").is_ok());
    // A quoted string with the same text is not an identifier.
    assert!(parse(&compiled, r#""if""#).is_err());
}

#[test]
fn test_lex_error_aborts() {
    let compiled = compile(
        vec![Schema::record("S").field("s", FieldType::String, "@String")],
        "S",
    );
    let err = parse(&compiled, r#""bad\q""#).unwrap_err();
    assert!(matches!(err, ParseError::Lex(_)));
    assert!(err.position().is_some());
}

#[test]
fn test_nesting_limit() {
    let compiled = compile(
        vec![Schema::record("Box").field("inner", FieldType::structure("Box"), r#""[" [ @@ ] "]""#)],
        "Box",
    )
    .with_max_depth(3);
    assert_eq!(compiled.max_depth(), 3);
    assert!(parse(&compiled, "[[[]]]").is_ok());

    let err = parse(&compiled, "[[[[]]]]").unwrap_err();
    assert!(matches!(err, ParseError::TooDeep { limit: 3, .. }));
    assert_eq!(
        err.to_string(),
        "<source>:1:4: nesting deeper than 3 levels while entering 'Box'"
    );
}

#[test]
fn test_long_capture_survives_buffer_release() {
    let compiled = compile(
        vec![Schema::record("Long")
            .field("path", FieldType::String, r#"@( Ident { "." Ident } )"#)
            .field("items", FieldType::list(FieldType::Int), "{ @Int }")],
        "Long",
    );
    let segments: Vec<String> = (0..1500).map(|i| format!("s{i}")).collect();
    let numbers: Vec<String> = (0..3000).map(|i| i.to_string()).collect();
    let input = format!("{} {}", segments.join("."), numbers.join(" "));

    let value = parse(&compiled, &input).unwrap();
    assert_eq!(value.get("path"), Some(&Value::String(segments.join("."))));
    let items = value.get("items").unwrap().extract::<Vec<i64>>().unwrap();
    assert_eq!(items.len(), 3000);
    assert_eq!(items[2999], 2999);
}
