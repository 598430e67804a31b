use std::fmt;

/// The type of a destination field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Captured token values are concatenated
    String,
    /// Captured text is parsed as an `i64`
    Int,
    /// Captured text is parsed as an `f64`
    Float,
    /// Set to `true` when the capture matched
    Bool,
    /// A nested structure, filled by `@@`
    Struct(String),
    /// One element per captured token, or per nested structure
    List(Box<FieldType>),
}

impl FieldType {
    pub fn structure(name: impl Into<String>) -> Self {
        FieldType::Struct(name.into())
    }

    pub fn list(element: FieldType) -> Self {
        FieldType::List(Box::new(element))
    }

    /// The type of one bound element: the element type for lists, the type
    /// itself otherwise.
    pub fn element(&self) -> &FieldType {
        match self {
            FieldType::List(inner) => inner.element(),
            other => other,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List(_))
    }

    /// The nested schema name, if elements of this field are structures.
    pub fn struct_name(&self) -> Option<&str> {
        match self.element() {
            FieldType::Struct(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => f.write_str("string"),
            FieldType::Int => f.write_str("int"),
            FieldType::Float => f.write_str("float"),
            FieldType::Bool => f.write_str("bool"),
            FieldType::Struct(name) => f.write_str(name),
            FieldType::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Whether a schema produces a record or a tagged union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Every field may be set
    Record,
    /// Exactly one field (variant) is set in every result
    Union,
}

/// One declared field: its name, its type and its grammar fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: FieldType,
    pub grammar: String,
}

/// Declaration of an output structure: its fields in order, each with the
/// grammar fragment that fills it.
///
/// The schema's grammar is the concatenation of the fragments. `@` and `@@`
/// in a fragment bind to that fragment's field; a fragment starting with `|`
/// continues an alternation begun by earlier fields.
///
/// ```text
/// Schema::record("Attribute")
///     .field("key", FieldType::String, r#"@Ident "=""#)
///     .field("value", FieldType::String, "@String")
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    kind: SchemaKind,
    fields: Vec<FieldDecl>,
}

impl Schema {
    /// Declares a record schema.
    pub fn record(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SchemaKind::Record,
            fields: Vec::new(),
        }
    }

    /// Declares a tagged-union schema; add cases with [`Schema::variant`].
    pub fn union(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SchemaKind::Union,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType, grammar: impl Into<String>) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            ty,
            grammar: grammar.into(),
        });
        self
    }

    /// Adds a union case. Same as [`Schema::field`]; reads better on unions.
    pub fn variant(self, name: impl Into<String>, ty: FieldType, grammar: impl Into<String>) -> Self {
        self.field(name, ty, grammar)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }
}
