use super::descriptor::{CompiledSchema, Descriptor, Field, DEFAULT_MAX_DEPTH};
use super::{FieldType, Schema, SchemaId};
use crate::error::{CompileError, CompileResult};
use crate::grammar;
use crate::lookahead::LookaheadOptions;
use lexer_framework::Symbols;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// Declared schemas plus the descriptors compiled from them so far.
///
/// Compilation is memoised: every schema is compiled at most once for the
/// lifetime of the registry, and every [`CompiledSchema`] handed out shares
/// the same descriptors. Concurrent `compile` calls are serialised, so no
/// caller ever sees a placeholder.
pub struct Registry {
    symbols: Arc<Symbols>,
    options: LookaheadOptions,
    schemas: HashMap<String, Schema>,
    compiled: Mutex<Compiled>,
}

#[derive(Default)]
struct Compiled {
    descriptors: Vec<Arc<Descriptor>>,
    ids: HashMap<String, SchemaId>,
}

impl Registry {
    pub fn new(symbols: Arc<Symbols>) -> Self {
        Self::with_options(symbols, LookaheadOptions::default())
    }

    pub fn with_options(symbols: Arc<Symbols>, options: LookaheadOptions) -> Self {
        Self {
            symbols,
            options,
            schemas: HashMap::new(),
            compiled: Mutex::new(Compiled::default()),
        }
    }

    pub fn symbols(&self) -> &Arc<Symbols> {
        &self.symbols
    }

    pub fn options(&self) -> LookaheadOptions {
        self.options
    }

    /// Adds a schema declaration. Structural problems are reported here;
    /// grammar problems are reported by [`Registry::compile`].
    pub fn declare(&mut self, schema: Schema) -> CompileResult<&mut Self> {
        if self.schemas.contains_key(schema.name()) {
            return Err(CompileError::DuplicateSchema {
                name: schema.name().to_string(),
            });
        }

        let mut names = HashSet::new();
        for field in schema.fields() {
            if !names.insert(field.name.as_str()) {
                return Err(CompileError::InvalidSchema {
                    schema: schema.name().to_string(),
                    reason: format!("field '{}' is declared twice", field.name),
                });
            }
            if let FieldType::List(inner) = &field.ty {
                if inner.is_list() {
                    return Err(CompileError::InvalidSchema {
                        schema: schema.name().to_string(),
                        reason: format!("field '{}' is a list of lists", field.name),
                    });
                }
            }
        }

        self.schemas.insert(schema.name().to_string(), schema);
        Ok(self)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns true once `name` has been compiled.
    pub fn is_compiled(&self, name: &str) -> bool {
        self.lock().ids.contains_key(name)
    }

    /// Compiles `root` and everything it refers to, reusing descriptors
    /// compiled by earlier calls.
    ///
    /// On failure nothing from this call stays registered.
    pub fn compile(&self, root: &str) -> CompileResult<CompiledSchema> {
        let mut compiled = self.lock();
        let mark = compiled.descriptors.len();

        match self.ensure(&mut compiled, root) {
            Ok(id) => Ok(CompiledSchema {
                descriptors: compiled.descriptors.iter().cloned().collect(),
                root: id,
                symbols: Arc::clone(&self.symbols),
                options: self.options,
                max_depth: DEFAULT_MAX_DEPTH,
            }),
            Err(error) => {
                compiled.descriptors.truncate(mark);
                compiled.ids.retain(|_, id| id.index() < mark);
                tracing::debug!(schema = root, %error, "compilation rolled back");
                Err(error)
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Compiled> {
        self.compiled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Two-phase build: register a placeholder first, so recursive
    /// references resolve to its id, then compile and patch in the grammar.
    fn ensure(&self, compiled: &mut Compiled, name: &str) -> CompileResult<SchemaId> {
        if let Some(id) = compiled.ids.get(name) {
            return Ok(*id);
        }
        let schema = self.schemas.get(name).ok_or_else(|| CompileError::UndeclaredSchema {
            name: name.to_string(),
        })?;

        let id = SchemaId(compiled.descriptors.len());
        let fields = schema
            .fields()
            .iter()
            .map(|f| Field {
                name: f.name.clone(),
                ty: f.ty.clone(),
            })
            .collect();
        compiled.descriptors.push(Arc::new(Descriptor::placeholder(
            id,
            schema.name().to_string(),
            schema.kind(),
            fields,
        )));
        compiled.ids.insert(name.to_string(), id);
        tracing::debug!(schema = name, %id, "placeholder registered");

        let mut targets = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let target = match field.ty.struct_name() {
                Some(nested) if !self.schemas.contains_key(nested) => {
                    return Err(CompileError::UnknownType {
                        schema: schema.name().to_string(),
                        field: field.name.clone(),
                        name: nested.to_string(),
                    });
                }
                Some(nested) => Some(self.ensure(compiled, nested)?),
                None => None,
            };
            targets.push(target);
        }

        let root = grammar::compile(schema, &targets, &self.symbols)?;
        if !compiled.descriptors[id.index()].complete(root) {
            tracing::warn!(schema = name, "descriptor was already complete");
        }
        tracing::debug!(schema = name, %id, fields = schema.fields().len(), "schema compiled");
        Ok(id)
    }
}
