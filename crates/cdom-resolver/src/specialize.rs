//! Hand-off to generic specialization.
//!
//! When a reference resolves to a generic method or type with a concrete
//! argument list, the resolver asks a `Specializer` for a handle to the
//! instantiated entity and stores it on the resolved reference without
//! looking inside.

use cdom_types::{DeclId, TypeId, TypeList};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Opaque handle returned by a `Specializer`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SpecializedId(pub u32);

pub trait Specializer {
    fn specialize(&mut self, decl: DeclId, type_args: &[TypeId]) -> SpecializedId;
}

/// Interns `(declaration, type arguments)` pairs: equal requests get equal ids.
#[derive(Debug, Default)]
pub struct SpecializationTable {
    ids: FxHashMap<(DeclId, TypeList), SpecializedId>,
    entries: Vec<(DeclId, TypeList)>,
}

impl SpecializationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SpecializedId) -> Option<(DeclId, &[TypeId])> {
        self.entries
            .get(id.0 as usize)
            .map(|(decl, args)| (*decl, args.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Specializer for SpecializationTable {
    fn specialize(&mut self, decl: DeclId, type_args: &[TypeId]) -> SpecializedId {
        let key = (decl, TypeList::from_slice(type_args));
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = SpecializedId(self.entries.len() as u32);
        self.entries.push(key.clone());
        self.ids.insert(key, id);
        id
    }
}

#[cfg(test)]
#[path = "../tests/specialize_tests.rs"]
mod tests;
