//! Schema declarations, compiled descriptors and the registry that turns
//! one into the other.

mod declaration;
mod descriptor;
mod registry;

pub use declaration::{FieldDecl, FieldType, Schema, SchemaKind};
pub use descriptor::{CompiledSchema, Descriptor, Field, DEFAULT_MAX_DEPTH};
pub use registry::Registry;

use std::fmt;

/// Index of a descriptor inside a [`CompiledSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
