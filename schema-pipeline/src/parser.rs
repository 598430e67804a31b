use crate::error::{Error, Result};
use lexer_framework::{text_scanner, Definition};
use parser_framework::{CompiledSchema, FromValue, LookaheadOptions, Registry, Schema, Value, DEFAULT_MAX_DEPTH};
use std::io::Read;
use std::sync::Arc;

/// Tunables for a [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub lookahead: LookaheadOptions,
    /// How many schema objects may nest before parsing fails with
    /// [`ParseError::TooDeep`](parser_framework::ParseError::TooDeep).
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            lookahead: LookaheadOptions::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Collects a lexer definition, schema declarations and options.
///
/// ```text
/// Parser::builder()
///     .schema(Schema::record("Pair").field("key", FieldType::String, "@Ident").field(..))
///     .lookahead(2)
///     .build("Pair")?
/// ```
pub struct ParserBuilder {
    definition: Option<Arc<dyn Definition>>,
    schemas: Vec<Schema>,
    options: ParserOptions,
}

impl Default for ParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self {
            definition: None,
            schemas: Vec::new(),
            options: ParserOptions::default(),
        }
    }

    /// Uses `definition` to tokenize input. Defaults to [`text_scanner`].
    pub fn lexer(mut self, definition: Arc<dyn Definition>) -> Self {
        self.definition = Some(definition);
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn schemas<I: IntoIterator<Item = Schema>>(mut self, schemas: I) -> Self {
        self.schemas.extend(schemas);
        self
    }

    /// How many tokens disjunctions may peek at.
    pub fn lookahead(mut self, tokens: usize) -> Self {
        self.options.lookahead.tokens = tokens;
        self
    }

    /// How many nested schema references lookahead follows.
    pub fn expansion(mut self, depth: usize) -> Self {
        self.options.lookahead.expansion = depth;
        self
    }

    /// How deeply schema objects may nest in one input.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    pub fn options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Declares every schema and compiles `root`. Grammar problems surface
    /// here, before any input is parsed.
    pub fn build(self, root: &str) -> Result<Parser> {
        if self.schemas.is_empty() {
            return Err(Error::Config("at least one schema is required"));
        }
        let definition = self.definition.unwrap_or_else(text_scanner);
        let mut registry = Registry::with_options(definition.symbols(), self.options.lookahead);
        for schema in self.schemas {
            registry.declare(schema)?;
        }
        let compiled = registry.compile(root)?.with_max_depth(self.options.max_depth);
        tracing::debug!(
            root,
            symbols = definition.symbols().len(),
            tokens = self.options.lookahead.tokens,
            max_depth = self.options.max_depth,
            "parser built"
        );

        Ok(Parser {
            definition,
            registry: Arc::new(registry),
            compiled,
            options: self.options,
        })
    }
}

/// A lexer definition bound to a compiled root schema.
///
/// Cloning is cheap; clones and concurrent calls share the compiled
/// descriptors but nothing mutable.
#[derive(Clone)]
pub struct Parser {
    definition: Arc<dyn Definition>,
    registry: Arc<Registry>,
    compiled: CompiledSchema,
    options: ParserOptions,
}

impl Parser {
    pub fn builder() -> ParserBuilder {
        ParserBuilder::new()
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.compiled
    }

    pub fn definition(&self) -> &Arc<dyn Definition> {
        &self.definition
    }

    /// Parses an unnamed string.
    pub fn parse_str(&self, input: &str) -> Result<Value> {
        self.run(&self.compiled, None, input.to_string())
    }

    /// Parses a string; `source` names it in positions.
    pub fn parse_named(&self, source: &str, input: &str) -> Result<Value> {
        self.run(&self.compiled, Some(source), input.to_string())
    }

    /// Reads all of `reader` and parses it.
    pub fn parse_reader<R: Read>(&self, source: &str, mut reader: R) -> Result<Value> {
        let stream = self.definition.lex_reader(Some(source), &mut reader)?;
        tracing::debug!(source, schema = self.compiled.root().name(), "parsing reader");
        Ok(self.compiled.parse(stream)?)
    }

    /// Parses a string and extracts a typed result.
    pub fn parse<T: FromValue>(&self, input: &str) -> Result<T> {
        let value = self.parse_str(input)?;
        Ok(T::from_value(&value)?)
    }

    /// Parses a string as another declared schema, compiling it on first
    /// use.
    pub fn parse_as(&self, schema: &str, input: &str) -> Result<Value> {
        let compiled = self.registry.compile(schema)?.with_max_depth(self.options.max_depth);
        self.run(&compiled, None, input.to_string())
    }

    fn run(&self, compiled: &CompiledSchema, source: Option<&str>, input: String) -> Result<Value> {
        tracing::debug!(
            source = source.unwrap_or(common_framework::UNKNOWN_SOURCE),
            schema = compiled.root().name(),
            bytes = input.len(),
            "parsing"
        );
        let stream = self.definition.lex(source, input);
        Ok(compiled.parse(stream)?)
    }
}
