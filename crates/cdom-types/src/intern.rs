//! Type interning for structural deduplication.
//!
//! Converts `TypeData` structures into lightweight `TypeId` handles. The
//! resolver creates types on the fly (substituted parameter types, array
//! wrappers, method groups) while only holding shared references, so the
//! tables sit behind a `RefCell`; resolution is single-threaded.

use crate::decl::DeclId;
use crate::types::{DeclList, IntrinsicKind, TypeData, TypeId, TypeList, TypeParamRef};
use cdom_common::Atom;
use rustc_hash::FxHashMap;
use std::cell::RefCell;

#[derive(Default)]
struct InternTables {
    key_to_id: FxHashMap<TypeData, TypeId>,
    id_to_key: Vec<TypeData>,
}

/// Interns `TypeData` values, pre-seeded with every intrinsic.
pub struct TypeInterner {
    tables: RefCell<InternTables>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let interner = TypeInterner {
            tables: RefCell::new(InternTables::default()),
        };
        for kind in IntrinsicKind::ALL {
            let id = interner.intern(TypeData::Intrinsic(kind));
            debug_assert_eq!(id, kind.type_id());
        }
        interner
    }

    /// Intern a type, returning the existing id for a structurally equal type.
    pub fn intern(&self, data: TypeData) -> TypeId {
        let mut tables = self.tables.borrow_mut();
        if let Some(&id) = tables.key_to_id.get(&data) {
            return id;
        }
        let id = TypeId(tables.id_to_key.len() as u32);
        tables.id_to_key.push(data.clone());
        tables.key_to_id.insert(data, id);
        id
    }

    /// Look up the structure behind an id.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        self.tables.borrow().id_to_key.get(id.0 as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.tables.borrow().id_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn declared(&self, decl: DeclId) -> TypeId {
        self.intern(TypeData::Declared(decl))
    }

    /// Apply a generic declaration to arguments; no arguments means the
    /// declaration itself.
    pub fn application(&self, base: DeclId, args: &[TypeId]) -> TypeId {
        if args.is_empty() {
            return self.declared(base);
        }
        self.intern(TypeData::Application {
            base,
            args: TypeList::from_slice(args),
        })
    }

    /// Wrap `element` in an array of the given rank. Rank 0 is the element.
    pub fn array(&self, element: TypeId, rank: u32) -> TypeId {
        if rank == 0 {
            return element;
        }
        self.intern(TypeData::Array { element, rank })
    }

    /// Wrap a type in successive array ranks, innermost rank last
    /// (`int[][,]` is `[1, 2]`).
    pub fn array_of_ranks(&self, element: TypeId, ranks: &[u32]) -> TypeId {
        ranks
            .iter()
            .rev()
            .fold(element, |inner, &rank| self.array(inner, rank))
    }

    pub fn type_param(&self, owner: DeclId, index: u32) -> TypeId {
        self.intern(TypeData::TypeParameter(TypeParamRef { owner, index }))
    }

    pub fn method_group(&self, methods: &[DeclId]) -> TypeId {
        self.intern(TypeData::MethodGroup(DeclList::from_slice(methods)))
    }

    pub fn unresolved(&self, name: Atom) -> TypeId {
        self.intern(TypeData::Unresolved(name))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Element type and rank of an array type.
    pub fn array_parts(&self, id: TypeId) -> Option<(TypeId, u32)> {
        match self.lookup(id)? {
            TypeData::Array { element, rank } => Some((element, rank)),
            _ => None,
        }
    }

    /// Element type of an array, or `None` for non-arrays.
    pub fn element_type(&self, id: TypeId) -> Option<TypeId> {
        self.array_parts(id).map(|(element, _)| element)
    }

    /// The declaration a named type refers to (`Declared` or `Application`).
    pub fn named_decl(&self, id: TypeId) -> Option<DeclId> {
        match self.lookup(id)? {
            TypeData::Declared(decl) => Some(decl),
            TypeData::Application { base, .. } => Some(base),
            _ => None,
        }
    }

    /// Type arguments of an application; empty for anything else.
    pub fn type_args(&self, id: TypeId) -> TypeList {
        match self.lookup(id) {
            Some(TypeData::Application { args, .. }) => args,
            _ => TypeList::new(),
        }
    }

    pub fn type_param_ref(&self, id: TypeId) -> Option<TypeParamRef> {
        match self.lookup(id)? {
            TypeData::TypeParameter(param) => Some(param),
            _ => None,
        }
    }

    pub fn method_group_members(&self, id: TypeId) -> Option<DeclList> {
        match self.lookup(id)? {
            TypeData::MethodGroup(methods) => Some(methods),
            _ => None,
        }
    }

    pub fn intrinsic_kind(&self, id: TypeId) -> Option<IntrinsicKind> {
        if id.is_intrinsic() {
            return IntrinsicKind::ALL.get(id.0 as usize).copied();
        }
        None
    }

    /// An undetermined type or a direct unresolved reference.
    pub fn is_undetermined(&self, id: TypeId) -> bool {
        id == TypeId::UNDETERMINED || matches!(self.lookup(id), Some(TypeData::Unresolved(_)))
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
