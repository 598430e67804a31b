use crate::lookahead::Signature;
use crate::schema::SchemaId;
use lexer_framework::SymbolId;
use std::sync::OnceLock;

/// A compiled grammar node. Nodes are immutable once built; the only
/// interior state is the write-once lookahead cache of a [`Disjunction`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Matches a token with this exact value, and this type when given
    Literal {
        value: String,
        kind: Option<SymbolId>,
    },
    /// Matches any token of the given type
    Type(SymbolId),
    /// Routes what `inner` matched into field `field` of the current object
    Capture { field: usize, inner: Box<Node> },
    /// All children, in order
    Sequence(Vec<Node>),
    /// Exactly one alternative, chosen by lookahead
    Disjunction(Disjunction),
    /// `min` or more successive matches of `inner`
    Repetition { inner: Box<Node>, min: usize },
    /// Zero or one match of `inner`
    Optional(Box<Node>),
    /// Scoping boundary for an alternation
    Group(Box<Node>),
    /// Parses another schema into a freshly allocated object
    Reference(SchemaId),
    /// Requires the stream to be at end of input
    End,
}

impl Node {
    pub fn literal(value: impl Into<String>) -> Self {
        Node::Literal {
            value: value.into(),
            kind: None,
        }
    }

    pub fn capture(field: usize, inner: Node) -> Self {
        Node::Capture {
            field,
            inner: Box::new(inner),
        }
    }

    pub fn optional(inner: Node) -> Self {
        Node::Optional(Box::new(inner))
    }

    pub fn repetition(inner: Node, min: usize) -> Self {
        Node::Repetition {
            inner: Box::new(inner),
            min,
        }
    }

    pub fn group(inner: Node) -> Self {
        Node::Group(Box::new(inner))
    }

    /// Builds a sequence, collapsing the single-child case.
    pub fn sequence(mut children: Vec<Node>) -> Self {
        if children.len() == 1 {
            return children.remove(0);
        }
        Node::Sequence(children)
    }

    /// Builds a disjunction, collapsing the single-alternative case.
    pub fn disjunction(mut alternatives: Vec<Node>) -> Self {
        if alternatives.len() == 1 {
            return alternatives.remove(0);
        }
        Node::Disjunction(Disjunction::new(alternatives))
    }
}

/// Ordered alternatives plus their lazily computed lookahead signatures.
///
/// Declaration order is significant: it breaks ties between equally good
/// alternatives.
#[derive(Debug, Clone)]
pub struct Disjunction {
    alternatives: Vec<Node>,
    signatures: OnceLock<Vec<Signature>>,
}

impl Disjunction {
    pub fn new(alternatives: Vec<Node>) -> Self {
        Self {
            alternatives,
            signatures: OnceLock::new(),
        }
    }

    pub fn alternatives(&self) -> &[Node] {
        &self.alternatives
    }

    /// Signatures, one per alternative, computed on first use. Descriptors
    /// are complete by the time any parse runs, so every reference resolves.
    pub(crate) fn signatures<F>(&self, compute: F) -> &[Signature]
    where
        F: FnOnce(&[Node]) -> Vec<Signature>,
    {
        self.signatures.get_or_init(|| compute(&self.alternatives))
    }
}

impl PartialEq for Disjunction {
    fn eq(&self, other: &Self) -> bool {
        self.alternatives == other.alternatives
    }
}
