//! Walks compiled grammar trees against a token stream.
//!
//! Speculative nodes (optional, each repetition iteration) take a checkpoint
//! first and restore it when their inner node mismatches. A disjunction
//! commits to one alternative by lookahead and never retries a sibling.

use crate::context::{Mismatch, ParseContext};
use crate::error::{ParseError, ParseResult};
use crate::grammar::{Disjunction, Node};
use crate::graph::ObjectId;
use crate::lookahead::{self, Shape};
use crate::schema::{CompiledSchema, Descriptor, SchemaId};
use crate::value::Value;
use lexer_framework::{LexError, Stream, Symbols, EOF};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Why a node failed to match.
enum Fail {
    /// The input diverged from the grammar; enclosing speculative nodes may
    /// recover.
    Mismatch(Mismatch),
    /// A hard failure that ends the parse.
    Abort(ParseError),
}

impl From<LexError> for Fail {
    fn from(error: LexError) -> Self {
        Fail::Abort(ParseError::Lex(error))
    }
}

impl From<ParseError> for Fail {
    fn from(error: ParseError) -> Self {
        Fail::Abort(error)
    }
}

type Step<T = ()> = Result<T, Fail>;

/// Parses the whole stream into the root schema of `schema`.
pub(crate) fn run(schema: &CompiledSchema, stream: Box<dyn Stream>) -> ParseResult<Value> {
    let root = schema.root();
    tracing::debug!(schema = root.name(), "parse started");

    let mut engine = Engine {
        descriptors: &schema.descriptors,
        symbols: &schema.symbols,
        schema,
        ctx: ParseContext::new(stream),
        active: HashSet::new(),
        depth: 0,
    };

    let outcome = engine.enter(root.id()).and_then(|object| {
        engine.end()?;
        Ok(object)
    });
    let object = match outcome {
        Ok(object) => object,
        Err(Fail::Mismatch(mismatch)) => {
            let furthest = engine.ctx.furthest(mismatch);
            tracing::debug!(schema = root.name(), position = %furthest.position, "parse failed");
            return Err(furthest.into());
        }
        Err(Fail::Abort(error)) => {
            tracing::debug!(schema = root.name(), %error, "parse aborted");
            return Err(error);
        }
    };

    let value = engine.ctx.graph().materialize(object, engine.descriptors)?;
    tracing::debug!(
        schema = root.name(),
        tokens = engine.ctx.pulled(),
        "parse finished"
    );
    Ok(value)
}

struct Engine<'a> {
    descriptors: &'a [Arc<Descriptor>],
    symbols: &'a Symbols,
    schema: &'a CompiledSchema,
    ctx: ParseContext,
    /// Descriptors entered on the active path, with the token index at entry
    active: HashSet<(SchemaId, usize)>,
    /// Number of objects currently being parsed inside each other
    depth: usize,
}

impl<'a> Engine<'a> {
    fn descriptor(&self, id: SchemaId) -> ParseResult<&'a Descriptor> {
        self.descriptors
            .get(id.index())
            .map(|d| d.as_ref())
            .ok_or_else(|| ParseError::Unresolved { schema: id.to_string() })
    }

    fn mismatch(&mut self, expected: Vec<String>) -> Fail {
        match self.ctx.mismatch(expected) {
            Ok(mismatch) => Fail::Mismatch(mismatch),
            Err(error) => error.into(),
        }
    }

    fn expected(&self, shape: Shape) -> Vec<String> {
        vec![shape.describe(self.symbols)]
    }

    /// Allocates an object for `id` and parses the descriptor's grammar
    /// into it.
    fn enter(&mut self, id: SchemaId) -> Step<ObjectId> {
        let descriptor = self.descriptor(id)?;
        let root = descriptor.root().ok_or_else(|| ParseError::Unresolved {
            schema: descriptor.name().to_string(),
        })?;

        if self.depth >= self.schema.max_depth {
            self.ctx.peek(0)?;
            return Err(Fail::Abort(ParseError::TooDeep {
                schema: descriptor.name().to_string(),
                limit: self.schema.max_depth,
                position: self.ctx.position(),
            }));
        }

        let key = (id, self.ctx.token_index());
        if !self.active.insert(key) {
            return Err(Fail::Abort(ParseError::LeftRecursion {
                schema: descriptor.name().to_string(),
                position: self.ctx.position(),
            }));
        }

        let position = self.ctx.position();
        let object = self.ctx.graph_mut().alloc(descriptor, position);
        self.depth += 1;
        let result = self.node(root, object);
        self.depth -= 1;
        self.active.remove(&key);
        result.map(|()| object)
    }

    fn end(&mut self) -> Step {
        if self.ctx.peek(0)?.is_eof() {
            Ok(())
        } else {
            Err(self.mismatch(self.expected(Shape::Type(EOF))))
        }
    }

    fn node(&mut self, node: &'a Node, object: ObjectId) -> Step {
        match node {
            Node::Literal { value, kind } => {
                let token = self.ctx.peek(0)?;
                if token.value == *value && kind.map_or(true, |kind| kind == token.kind) {
                    self.ctx.advance()?;
                    Ok(())
                } else {
                    let shape = Shape::Literal {
                        value: value.clone(),
                        kind: *kind,
                    };
                    Err(self.mismatch(self.expected(shape)))
                }
            }
            Node::Type(kind) => {
                if self.ctx.peek(0)?.kind == *kind {
                    self.ctx.advance()?;
                    Ok(())
                } else {
                    Err(self.mismatch(self.expected(Shape::Type(*kind))))
                }
            }
            Node::End => self.end(),
            Node::Sequence(children) => {
                for child in children {
                    self.node(child, object)?;
                }
                Ok(())
            }
            Node::Group(inner) => self.node(inner, object),
            Node::Capture { field, inner } => self.capture(*field, inner, object),
            Node::Reference(id) => self.enter(*id).map(|_| ()),
            Node::Disjunction(disjunction) => {
                let chosen = self.choose(disjunction)?;
                self.node(&disjunction.alternatives()[chosen], object)
            }
            Node::Optional(inner) => {
                let checkpoint = self.ctx.checkpoint();
                let result = match self.node(inner, object) {
                    Err(Fail::Mismatch(_)) => {
                        self.ctx.restore(&checkpoint);
                        Ok(())
                    }
                    other => other,
                };
                self.ctx.release(&checkpoint);
                result
            }
            Node::Repetition { inner, min } => {
                let mut count = 0;
                loop {
                    let checkpoint = self.ctx.checkpoint();
                    let result = self.node(inner, object);
                    let stalled = self.ctx.token_index() == checkpoint.token_index();
                    if let Err(Fail::Mismatch(_)) = result {
                        self.ctx.restore(&checkpoint);
                    }
                    self.ctx.release(&checkpoint);
                    match result {
                        Ok(()) if stalled => {
                            return Err(Fail::Abort(ParseError::NoProgress {
                                position: self.ctx.position(),
                            }));
                        }
                        Ok(()) => count += 1,
                        Err(Fail::Mismatch(mismatch)) => {
                            if count < *min {
                                return Err(Fail::Mismatch(mismatch));
                            }
                            return Ok(());
                        }
                        Err(abort) => return Err(abort),
                    }
                }
            }
        }
    }

    fn capture(&mut self, field: usize, inner: &'a Node, object: ObjectId) -> Step {
        let descriptor = self.descriptor(self.ctx.graph().schema_of(object))?;
        let Some(target) = descriptor.field(field) else {
            return Err(Fail::Abort(ParseError::Unresolved {
                schema: descriptor.name().to_string(),
            }));
        };

        if let Node::Reference(id) = inner {
            let child = self.enter(*id)?;
            self.ctx.graph_mut().bind_object(object, field, &target.ty, child);
            return Ok(());
        }

        let start = self.ctx.pin();
        let tokens = match self.node(inner, object) {
            Ok(()) => self.ctx.consumed(start).map_err(Fail::from),
            Err(fail) => Err(fail),
        };
        self.ctx.unpin(start);
        let tokens = tokens?;
        self.ctx
            .graph_mut()
            .bind_tokens(object, field, &target.name, &target.ty, &tokens)?;
        Ok(())
    }

    /// Selects the alternative of `disjunction` to commit to.
    fn choose(&mut self, disjunction: &'a Disjunction) -> Step<usize> {
        let descriptors = self.descriptors;
        let options = self.schema.options;
        let signatures = disjunction.signatures(|alternatives| lookahead::signatures(alternatives, descriptors, options));

        let depth = signatures.iter().map(|s| s.depth()).max().unwrap_or(0).max(1);
        let window = self.ctx.window(depth)?;

        match lookahead::choose(signatures, &window) {
            Some(chosen) => {
                tracing::trace!(
                    alternatives = signatures.len(),
                    chosen,
                    position = %self.ctx.position(),
                    "disjunction resolved"
                );
                Ok(chosen)
            }
            None => {
                let (depth, shapes) = lookahead::divergence(signatures, &window);
                let depth = depth.min(window.len().saturating_sub(1));
                let expected: BTreeSet<String> = shapes.iter().map(|shape| shape.describe(self.symbols)).collect();
                tracing::trace!(alternatives = signatures.len(), depth, "no alternative matched");
                match self.ctx.mismatch_ahead(depth, expected.into_iter().collect()) {
                    Ok(mismatch) => Err(Fail::Mismatch(mismatch)),
                    Err(error) => Err(error.into()),
                }
            }
        }
    }
}
