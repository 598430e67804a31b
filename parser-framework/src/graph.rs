//! The destination graph under construction.
//!
//! Objects live in an arena and refer to each other by index. Every mutation
//! is appended to a journal, so rewinding to a checkpoint is a matter of
//! undoing journal entries back to the recorded length.

use crate::error::{ParseError, ParseResult};
use crate::schema::{Descriptor, FieldType, SchemaId, SchemaKind};
use crate::value::{Record, Value, Variant};
use common_framework::Position;
use lexer_framework::Token;
use std::sync::Arc;

/// Index of an object in the arena.
pub(crate) type ObjectId = usize;

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Object(ObjectId),
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Unset,
    One(Scalar),
    Many(Vec<Scalar>),
}

#[derive(Debug)]
struct Object {
    schema: SchemaId,
    position: Position,
    slots: Vec<Slot>,
}

#[derive(Debug)]
enum Entry {
    Alloc,
    Set {
        object: ObjectId,
        field: usize,
        previous: Slot,
    },
    Push {
        object: ObjectId,
        field: usize,
    },
}

#[derive(Debug, Default)]
pub(crate) struct Graph {
    objects: Vec<Object>,
    journal: Vec<Entry>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_of(&self, object: ObjectId) -> SchemaId {
        self.objects[object].schema
    }

    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Allocates an empty object for `descriptor`.
    pub fn alloc(&mut self, descriptor: &Descriptor, position: Position) -> ObjectId {
        let slots = descriptor
            .fields()
            .iter()
            .map(|field| {
                if field.ty.is_list() {
                    Slot::Many(Vec::new())
                } else {
                    Slot::Unset
                }
            })
            .collect();
        self.objects.push(Object {
            schema: descriptor.id(),
            position,
            slots,
        });
        self.journal.push(Entry::Alloc);
        self.objects.len() - 1
    }

    /// Undoes every mutation recorded after `len`.
    pub fn rollback(&mut self, len: usize) {
        while self.journal.len() > len {
            let Some(entry) = self.journal.pop() else { break };
            match entry {
                Entry::Alloc => {
                    self.objects.pop();
                }
                Entry::Set {
                    object,
                    field,
                    previous,
                } => {
                    self.objects[object].slots[field] = previous;
                }
                Entry::Push { object, field } => {
                    if let Slot::Many(items) = &mut self.objects[object].slots[field] {
                        items.pop();
                    }
                }
            }
        }
    }

    fn set(&mut self, object: ObjectId, field: usize, value: Scalar) {
        let previous = std::mem::replace(&mut self.objects[object].slots[field], Slot::One(value));
        self.journal.push(Entry::Set {
            object,
            field,
            previous,
        });
    }

    fn push(&mut self, object: ObjectId, field: usize, value: Scalar) {
        if let Slot::Many(items) = &mut self.objects[object].slots[field] {
            items.push(value);
            self.journal.push(Entry::Push { object, field });
        }
    }

    /// Binds a nested object into a structure field.
    pub fn bind_object(&mut self, object: ObjectId, field: usize, ty: &FieldType, child: ObjectId) {
        if ty.is_list() {
            self.push(object, field, Scalar::Object(child));
        } else {
            self.set(object, field, Scalar::Object(child));
        }
    }

    /// Binds captured (already transformed) tokens into a scalar field.
    ///
    /// Strings concatenate, numbers are parsed from the concatenated text,
    /// booleans become `true`. List fields receive one element per token. A
    /// capture that matched no tokens binds nothing.
    pub fn bind_tokens(
        &mut self,
        object: ObjectId,
        field: usize,
        name: &str,
        ty: &FieldType,
        tokens: &[Token],
    ) -> ParseResult<()> {
        let Some(first) = tokens.first() else {
            return Ok(());
        };

        if ty.is_list() {
            for token in tokens {
                let scalar = convert(name, ty.element(), &token.value, &token.position)?;
                self.push(object, field, scalar);
            }
            return Ok(());
        }

        let text: String = tokens.iter().map(|t| t.value.as_str()).collect();
        let scalar = match (ty, &self.objects[object].slots[field]) {
            (FieldType::String, Slot::One(Scalar::String(previous))) => Scalar::String(format!("{previous}{text}")),
            _ => convert(name, ty, &text, &first.position)?,
        };
        self.set(object, field, scalar);
        Ok(())
    }

    /// Converts the object tree rooted at `root` into a [`Value`].
    ///
    /// Recurses once per nesting level; the engine refuses to build trees
    /// deeper than the schema's `max_depth`.
    pub fn materialize(&self, root: ObjectId, descriptors: &[Arc<Descriptor>]) -> ParseResult<Value> {
        let object = &self.objects[root];
        let descriptor = descriptors
            .get(object.schema.index())
            .ok_or_else(|| ParseError::Unresolved {
                schema: object.schema.to_string(),
            })?;

        let mut fields = Vec::with_capacity(object.slots.len());
        for (slot, field) in object.slots.iter().zip(descriptor.fields()) {
            let value = match slot {
                Slot::Unset => Value::Null,
                Slot::One(scalar) => self.scalar_value(scalar, descriptors)?,
                Slot::Many(items) => Value::List(
                    items
                        .iter()
                        .map(|s| self.scalar_value(s, descriptors))
                        .collect::<ParseResult<_>>()?,
                ),
            };
            fields.push((field.name.clone(), value));
        }

        match descriptor.kind() {
            SchemaKind::Record => Ok(Value::Record(Record::new(descriptor.name(), fields))),
            SchemaKind::Union => {
                let mut active = fields.into_iter().filter(|(_, value)| match value {
                    Value::Null => false,
                    Value::List(items) => !items.is_empty(),
                    _ => true,
                });
                match (active.next(), active.count()) {
                    (Some((name, value)), 0) => Ok(Value::Variant(Variant::new(descriptor.name(), name, value))),
                    (first, rest) => Err(ParseError::Variant {
                        schema: descriptor.name().to_string(),
                        count: usize::from(first.is_some()) + rest,
                        position: object.position.clone(),
                    }),
                }
            }
        }
    }

    fn scalar_value(&self, scalar: &Scalar, descriptors: &[Arc<Descriptor>]) -> ParseResult<Value> {
        Ok(match scalar {
            Scalar::String(s) => Value::String(s.clone()),
            Scalar::Int(n) => Value::Int(*n),
            Scalar::Float(n) => Value::Float(*n),
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Object(id) => self.materialize(*id, descriptors)?,
        })
    }
}

fn convert(name: &str, ty: &FieldType, text: &str, position: &Position) -> ParseResult<Scalar> {
    let conversion = |reason: String| ParseError::Conversion {
        field: name.to_string(),
        ty: ty.to_string(),
        value: text.to_string(),
        reason,
        position: position.clone(),
    };
    match ty {
        FieldType::String => Ok(Scalar::String(text.to_string())),
        FieldType::Int => text
            .parse::<i64>()
            .map(Scalar::Int)
            .map_err(|e| conversion(e.to_string())),
        FieldType::Float => text
            .parse::<f64>()
            .map(Scalar::Float)
            .map_err(|e| conversion(e.to_string())),
        FieldType::Bool => Ok(Scalar::Bool(true)),
        FieldType::Struct(_) | FieldType::List(_) => Err(conversion("not a scalar type".to_string())),
    }
}
