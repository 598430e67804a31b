//! Recursive-descent compiler from grammar text to [`Node`] trees.
//!
//! ```text
//! grammar     := alternative { "|" alternative }
//! alternative := term { term }
//! term        := primary { "?" | "*" | "+" }
//! primary     := literal [ ":" Type ] | Type | "@" term | "@@" | "."
//!              | "(" grammar ")" | "[" grammar "]" | "{" grammar "}"
//! ```

use super::node::Node;
use super::scanner::{scan, GrammarToken, Lexeme};
use crate::error::{CompileError, CompileResult};
use crate::schema::{Schema, SchemaId};
use lexer_framework::{SymbolId, Symbols};

/// Compiles the concatenated field fragments of `schema`.
///
/// `targets[i]` is the descriptor that `@@` in field `i` recurses into; it
/// is `None` for scalar fields.
pub(crate) fn compile(schema: &Schema, targets: &[Option<SchemaId>], symbols: &Symbols) -> CompileResult<Node> {
    let mut tokens = Vec::new();
    for (index, field) in schema.fields().iter().enumerate() {
        tokens.extend(scan(schema.name(), &field.name, index, &field.grammar)?);
    }
    if tokens.is_empty() {
        return Err(CompileError::EmptyGrammar {
            schema: schema.name().to_string(),
        });
    }

    let mut compiler = Compiler {
        schema,
        targets,
        symbols,
        tokens,
        pos: 0,
        in_capture: false,
    };
    let root = compiler.grammar()?;
    if let Some(token) = compiler.peek() {
        return Err(match token.lexeme {
            Lexeme::Close(delimiter) => compiler.error_at(token, |schema, field, offset| CompileError::Unmatched {
                schema,
                field,
                delimiter,
                offset,
            }),
            _ => compiler.unexpected(token),
        });
    }
    Ok(root)
}

struct Compiler<'a> {
    schema: &'a Schema,
    targets: &'a [Option<SchemaId>],
    symbols: &'a Symbols,
    tokens: Vec<GrammarToken>,
    pos: usize,
    in_capture: bool,
}

impl Compiler<'_> {
    fn peek(&self) -> Option<&GrammarToken> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<GrammarToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn field_name(&self, field: usize) -> String {
        self.schema
            .fields()
            .get(field)
            .map(|f| f.name.clone())
            .unwrap_or_default()
    }

    fn error_at<F>(&self, token: &GrammarToken, make: F) -> CompileError
    where
        F: FnOnce(String, String, usize) -> CompileError,
    {
        make(self.schema.name().to_string(), self.field_name(token.field), token.offset)
    }

    fn unexpected(&self, token: &GrammarToken) -> CompileError {
        let found = token.lexeme.describe();
        self.error_at(token, |schema, field, offset| CompileError::Unexpected {
            schema,
            field,
            found,
            offset,
        })
    }

    /// Error for input that ended early; reported at the end of the last
    /// fragment.
    fn unexpected_end(&self) -> CompileError {
        let field = self.tokens.last().map(|t| t.field).unwrap_or(0);
        let offset = self
            .schema
            .fields()
            .get(field)
            .map(|f| f.grammar.len())
            .unwrap_or(0);
        CompileError::Unexpected {
            schema: self.schema.name().to_string(),
            field: self.field_name(field),
            found: "end of grammar".to_string(),
            offset,
        }
    }

    fn grammar(&mut self) -> CompileResult<Node> {
        let mut alternatives = vec![self.alternative()?];
        while self.peek().is_some_and(|t| t.lexeme == Lexeme::Pipe) {
            self.next();
            alternatives.push(self.alternative()?);
        }
        Ok(Node::disjunction(alternatives))
    }

    fn alternative(&mut self) -> CompileResult<Node> {
        let mut terms = Vec::new();
        while let Some(token) = self.peek() {
            if matches!(token.lexeme, Lexeme::Pipe | Lexeme::Close(_)) {
                break;
            }
            terms.push(self.term()?);
        }
        if terms.is_empty() {
            return Err(match self.peek() {
                Some(token) => self.unexpected(token),
                None => self.unexpected_end(),
            });
        }
        Ok(Node::sequence(terms))
    }

    fn term(&mut self) -> CompileResult<Node> {
        let mut node = self.primary()?;
        while let Some(token) = self.peek() {
            node = match token.lexeme {
                Lexeme::Question => Node::optional(node),
                Lexeme::Star => Node::repetition(node, 0),
                Lexeme::Plus => Node::repetition(node, 1),
                _ => break,
            };
            self.next();
        }
        Ok(node)
    }

    fn primary(&mut self) -> CompileResult<Node> {
        let Some(token) = self.next() else {
            return Err(self.unexpected_end());
        };
        match &token.lexeme {
            Lexeme::Literal(value) => {
                let kind = if self.peek().is_some_and(|t| t.lexeme == Lexeme::Colon) {
                    self.next();
                    match self.next() {
                        Some(GrammarToken {
                            lexeme: Lexeme::Ident(name),
                            ..
                        }) => Some(self.symbol(&token, &name)?),
                        Some(other) => return Err(self.unexpected(&other)),
                        None => return Err(self.unexpected_end()),
                    }
                } else {
                    None
                };
                Ok(Node::Literal {
                    value: value.clone(),
                    kind,
                })
            }
            Lexeme::Ident(name) => Ok(Node::Type(self.symbol(&token, name)?)),
            Lexeme::Dot => Ok(Node::End),
            Lexeme::At => self.capture(&token),
            Lexeme::AtAt => self.recurse(&token),
            Lexeme::Open(open) => {
                let open = *open;
                let inner = self.grammar()?;
                let close = match open {
                    '(' => ')',
                    '[' => ']',
                    _ => '}',
                };
                match self.next() {
                    Some(GrammarToken {
                        lexeme: Lexeme::Close(c),
                        ..
                    }) if c == close => {}
                    _ => {
                        return Err(self.error_at(&token, |schema, field, offset| CompileError::Unmatched {
                            schema,
                            field,
                            delimiter: open,
                            offset,
                        }))
                    }
                }
                Ok(match open {
                    '(' => Node::group(inner),
                    '[' => Node::optional(inner),
                    _ => Node::repetition(inner, 0),
                })
            }
            Lexeme::Close(delimiter) => {
                let delimiter = *delimiter;
                Err(self.error_at(&token, |schema, field, offset| CompileError::Unmatched {
                    schema,
                    field,
                    delimiter,
                    offset,
                }))
            }
            _ => Err(self.unexpected(&token)),
        }
    }

    fn symbol(&self, token: &GrammarToken, name: &str) -> CompileResult<SymbolId> {
        self.symbols.id(name).ok_or_else(|| {
            self.error_at(token, |schema, field, offset| CompileError::UnknownSymbol {
                schema,
                field,
                name: name.to_string(),
                offset,
            })
        })
    }

    fn type_mismatch(&self, token: &GrammarToken, capture: &'static str) -> CompileError {
        let ty = self
            .schema
            .fields()
            .get(token.field)
            .map(|f| f.ty.to_string())
            .unwrap_or_default();
        CompileError::TypeMismatch {
            schema: self.schema.name().to_string(),
            field: self.field_name(token.field),
            capture,
            ty,
        }
    }

    /// `@ term`: binds the tokens matched by `term` into the fragment's field.
    fn capture(&mut self, token: &GrammarToken) -> CompileResult<Node> {
        if self.in_capture {
            return Err(self.unexpected(token));
        }
        if self.targets.get(token.field).copied().flatten().is_some() {
            return Err(self.type_mismatch(token, "a token"));
        }
        if let Some(next) = self.peek() {
            if next.lexeme == Lexeme::AtAt {
                return Err(self.unexpected(&next.clone()));
            }
        }
        self.in_capture = true;
        let inner = self.term();
        self.in_capture = false;
        Ok(Node::capture(token.field, inner?))
    }

    /// `@@`: parses the field's structure type into a new object.
    fn recurse(&mut self, token: &GrammarToken) -> CompileResult<Node> {
        if self.in_capture {
            return Err(self.unexpected(token));
        }
        match self.targets.get(token.field).copied().flatten() {
            Some(target) => Ok(Node::capture(token.field, Node::Reference(target))),
            None => Err(self.type_mismatch(token, "a structure")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn symbols() -> Symbols {
        Symbols::new(["Ident", "String", "Int"])
    }

    fn compile_one(ty: FieldType, grammar: &str) -> CompileResult<Node> {
        let schema = Schema::record("S").field("f", ty.clone(), grammar);
        let target = ty.struct_name().map(|_| SchemaId(7));
        compile(&schema, &[target], &symbols())
    }

    #[test]
    fn test_sequence_with_capture() {
        let node = compile_one(FieldType::String, r#""let" @Ident "=""#).unwrap();
        assert_eq!(
            node,
            Node::Sequence(vec![
                Node::literal("let"),
                Node::capture(0, Node::Type(-2)),
                Node::literal("="),
            ])
        );
    }

    #[test]
    fn test_postfix_and_brackets() {
        let node = compile_one(FieldType::list(FieldType::String), "@Ident* [ Int ] { String }+").unwrap();
        assert_eq!(
            node,
            Node::Sequence(vec![
                Node::capture(0, Node::repetition(Node::Type(-2), 0)),
                Node::optional(Node::Type(-4)),
                Node::repetition(Node::repetition(Node::Type(-3), 0), 1),
            ])
        );
    }

    #[test]
    fn test_typed_literal_and_end() {
        let node = compile_one(FieldType::String, r#"@"x":Ident ."#).unwrap();
        assert_eq!(
            node,
            Node::Sequence(vec![
                Node::capture(
                    0,
                    Node::Literal {
                        value: "x".into(),
                        kind: Some(-2)
                    }
                ),
                Node::End,
            ])
        );
    }

    #[test]
    fn test_alternation_across_fields() {
        let schema = Schema::union("U")
            .variant("a", FieldType::structure("A"), "@@")
            .variant("b", FieldType::structure("B"), "| @@");
        let node = compile(&schema, &[Some(SchemaId(1)), Some(SchemaId(2))], &symbols()).unwrap();
        let Node::Disjunction(disjunction) = node else {
            panic!("expected a disjunction");
        };
        assert_eq!(
            disjunction.alternatives(),
            &[
                Node::capture(0, Node::Reference(SchemaId(1))),
                Node::capture(1, Node::Reference(SchemaId(2))),
            ]
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            compile_one(FieldType::String, "@Nope"),
            Err(CompileError::UnknownSymbol { offset: 1, .. })
        ));
        assert!(matches!(
            compile_one(FieldType::String, "( Ident"),
            Err(CompileError::Unmatched { delimiter: '(', offset: 0, .. })
        ));
        assert!(matches!(
            compile_one(FieldType::String, "Ident ]"),
            Err(CompileError::Unmatched { delimiter: ']', offset: 6, .. })
        ));
        assert!(matches!(
            compile_one(FieldType::String, "@@"),
            Err(CompileError::TypeMismatch { capture: "a structure", .. })
        ));
        assert!(matches!(
            compile_one(FieldType::structure("T"), "@Ident"),
            Err(CompileError::TypeMismatch { capture: "a token", .. })
        ));
        assert!(matches!(
            compile_one(FieldType::String, "Ident | "),
            Err(CompileError::Unexpected { .. })
        ));
        assert!(matches!(
            compile_one(FieldType::String, "@ @Ident"),
            Err(CompileError::Unexpected { .. })
        ));
        assert!(matches!(compile_one(FieldType::String, "  "), Err(CompileError::EmptyGrammar { .. })));
    }
}
