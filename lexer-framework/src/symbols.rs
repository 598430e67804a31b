use crate::token::{SymbolId, EOF};
use std::collections::HashMap;

/// Bidirectional mapping between symbol names and symbol ids.
///
/// Built once with the definition and never mutated afterwards; streams share
/// it read-only through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbols {
    names: Vec<String>,
    ids: HashMap<String, SymbolId>,
}

impl Symbols {
    /// Builds a table from symbol names. `EOF` is always present as `-1`; the
    /// given names receive `-2`, `-3`, ... in order. Duplicates keep their
    /// first id.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self {
            names: vec!["EOF".to_string()],
            ids: HashMap::from([("EOF".to_string(), EOF)]),
        };
        for name in names {
            let name = name.into();
            if table.ids.contains_key(&name) {
                continue;
            }
            let id = -(table.names.len() as SymbolId) - 1;
            table.ids.insert(name.clone(), id);
            table.names.push(name);
        }
        table
    }

    /// Looks up the id of a symbol name.
    pub fn id(&self, name: &str) -> Option<SymbolId> {
        self.ids.get(name).copied()
    }

    /// Looks up the name of a symbol id.
    pub fn name(&self, id: SymbolId) -> Option<&str> {
        if id >= 0 {
            return None;
        }
        self.names.get((-id - 1) as usize).map(String::as_str)
    }

    /// Number of symbols, including `EOF`.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates `(name, id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolId)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), -(i as SymbolId) - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_assigned_in_order() {
        let symbols = Symbols::new(["Ident", "Int", "Ident"]);
        assert_eq!(symbols.id("EOF"), Some(EOF));
        assert_eq!(symbols.id("Ident"), Some(-2));
        assert_eq!(symbols.id("Int"), Some(-3));
        assert_eq!(symbols.len(), 3);
        assert_eq!(symbols.name(-3), Some("Int"));
        assert_eq!(symbols.name(7), None);
        assert_eq!(symbols.id("Float"), None);
    }
}
