use super::{FieldType, SchemaId, SchemaKind};
use crate::engine;
use crate::error::ParseResult;
use crate::grammar::Node;
use crate::lookahead::LookaheadOptions;
use crate::value::Value;
use lexer_framework::{Stream, Symbols};
use std::sync::{Arc, OnceLock};

/// A destination field in a descriptor's binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

/// The compiled form of one schema: its grammar tree and binding table.
///
/// A descriptor is registered before its grammar is compiled, so other
/// schemas (and the schema itself) can refer to it by id while it is being
/// built. The root is written exactly once.
#[derive(Debug)]
pub struct Descriptor {
    id: SchemaId,
    name: String,
    kind: SchemaKind,
    fields: Vec<Field>,
    root: OnceLock<Node>,
}

impl Descriptor {
    pub(crate) fn placeholder(id: SchemaId, name: String, kind: SchemaKind, fields: Vec<Field>) -> Self {
        Self {
            id,
            name,
            kind,
            fields,
            root: OnceLock::new(),
        }
    }

    /// Patches the compiled grammar into the placeholder. Returns false if a
    /// root was already set.
    pub(crate) fn complete(&self, root: Node) -> bool {
        self.root.set(root).is_ok()
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// The grammar tree; `None` only while the descriptor is a placeholder.
    pub fn root(&self) -> Option<&Node> {
        self.root.get()
    }
}

/// Default nesting limit of a [`CompiledSchema`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// An immutable snapshot of compiled descriptors, ready to parse.
///
/// Cheap to clone and safe to share between threads: every parse owns its
/// stream, its destination graph and its checkpoints.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub(crate) descriptors: Arc<[Arc<Descriptor>]>,
    pub(crate) root: SchemaId,
    pub(crate) symbols: Arc<Symbols>,
    pub(crate) options: LookaheadOptions,
    pub(crate) max_depth: usize,
}

impl CompiledSchema {
    /// Parses the whole stream into the root schema.
    pub fn parse(&self, stream: Box<dyn Stream>) -> ParseResult<Value> {
        engine::run(self, stream)
    }

    pub fn root(&self) -> &Descriptor {
        &self.descriptors[self.root.0]
    }

    pub fn descriptor(&self, id: SchemaId) -> Option<&Descriptor> {
        self.descriptors.get(id.0).map(|d| d.as_ref())
    }

    pub fn descriptor_named(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| d.name == name).map(|d| d.as_ref())
    }

    pub fn symbols(&self) -> &Arc<Symbols> {
        &self.symbols
    }

    pub fn options(&self) -> LookaheadOptions {
        self.options
    }

    /// How many schema objects may be nested inside each other before a
    /// parse fails with [`ParseError::TooDeep`](crate::ParseError::TooDeep).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
