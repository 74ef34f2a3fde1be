//! Symbol tables: id -> value maps used to resolve cross references.

use indexmap::IndexMap;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::options::DuplicatePolicy;

/// An insertion-ordered id -> value table.
///
/// Entries keep their slot when replaced, so indices handed out by
/// [`SymbolTable::index_of`] stay valid for the lifetime of the table.
#[derive(Debug, Clone)]
pub struct SymbolTable<T> {
    kind: &'static str,
    entries: IndexMap<String, T>,
}

impl<T> SymbolTable<T> {
    /// Create an empty table; `kind` names the entries in diagnostics ("material", "view", ...).
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Declare `id`, applying `policy` on collision.
    ///
    /// Returns the key the value was stored under, or `None` if the
    /// declaration was rejected.
    pub fn declare(
        &mut self,
        id: &str,
        value: T,
        policy: DuplicatePolicy,
        diagnostics: &mut Diagnostics,
        line: Option<usize>,
    ) -> Option<String> {
        if !self.entries.contains_key(id) {
            self.entries.insert(id.to_string(), value);
            return Some(id.to_string());
        }

        let location = format!("{} '{}'", self.kind, id);
        match policy {
            DuplicatePolicy::Replace => {
                diagnostics.report(
                    DiagnosticKind::DuplicateId,
                    location,
                    line,
                    "declared more than once; keeping the latest definition",
                );
                self.entries.insert(id.to_string(), value);
                Some(id.to_string())
            }
            DuplicatePolicy::Rename => {
                let renamed = (2..)
                    .map(|n| format!("{id}#{n}"))
                    .find(|candidate| !self.entries.contains_key(candidate))
                    .unwrap_or_else(|| format!("{id}#"));
                diagnostics.report(
                    DiagnosticKind::DuplicateId,
                    location,
                    line,
                    format!("declared more than once; renamed to '{renamed}'"),
                );
                self.entries.insert(renamed.clone(), value);
                Some(renamed)
            }
            DuplicatePolicy::Reject => {
                diagnostics.element(location, line, "declared more than once; keeping the first definition");
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.get_index_of(id)
    }

    pub fn get_index(&self, index: usize) -> Option<(&str, &T)> {
        self.entries.get_index(index).map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<(&str, &mut T)> {
        self.entries.get_index_mut(index).map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
