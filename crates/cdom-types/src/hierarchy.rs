//! Base-type walks.
//!
//! Answers "what does this type derive from" for declared types, generic
//! applications (substituting the application's arguments into the
//! declaration's base types), arrays and intrinsics. Every chain ends at
//! `TypeId::OBJECT`. Inheritance cycles in erroneous input are cut by a
//! visited set and a level limit.

use crate::decl::{DeclId, DeclarationStore};
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::types::{IntrinsicKind, TypeData, TypeId};
use cdom_common::limits::MAX_INHERITANCE_DEPTH;
use rustc_hash::FxHashSet;

pub struct Hierarchy<'a> {
    types: &'a TypeInterner,
    decls: &'a DeclarationStore,
}

impl<'a> Hierarchy<'a> {
    pub fn new(types: &'a TypeInterner, decls: &'a DeclarationStore) -> Self {
        Self { types, decls }
    }

    /// Immediate base types, with `OBJECT` last for everything but `OBJECT`,
    /// `void` and undetermined types.
    pub fn direct_bases(&self, ty: TypeId) -> Vec<TypeId> {
        let mut bases = match self.types.lookup(ty) {
            Some(TypeData::Declared(decl)) => self
                .decls
                .get(decl)
                .map(|d| d.base_types.clone())
                .unwrap_or_default(),
            Some(TypeData::Application { base, args }) => {
                let subst = TypeSubstitution::for_owner(base, &args);
                self.decls
                    .get(base)
                    .map(|d| {
                        d.base_types
                            .iter()
                            .map(|&b| instantiate_type(self.types, b, &subst))
                            .collect()
                    })
                    .unwrap_or_default()
            }
            Some(TypeData::Intrinsic(
                IntrinsicKind::Object | IntrinsicKind::Void | IntrinsicKind::Undetermined,
            ))
            | Some(TypeData::MethodGroup(_))
            | Some(TypeData::Unresolved(_))
            | None => return Vec::new(),
            Some(_) => Vec::new(),
        };
        if !bases.contains(&TypeId::OBJECT) {
            bases.push(TypeId::OBJECT);
        }
        bases
    }

    /// All ancestors grouped by inheritance distance (level 0 = direct bases).
    ///
    /// `OBJECT` is reported once, in the last level, so nearer bases always
    /// come first.
    pub fn ancestor_levels(&self, ty: TypeId) -> Vec<Vec<TypeId>> {
        let mut levels: Vec<Vec<TypeId>> = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(ty);
        let mut frontier = vec![ty];
        let mut reaches_object = false;

        while !frontier.is_empty() && (levels.len() as u32) < MAX_INHERITANCE_DEPTH {
            let mut next = Vec::new();
            for &current in &frontier {
                for base in self.direct_bases(current) {
                    if base == TypeId::OBJECT {
                        reaches_object = true;
                        continue;
                    }
                    if seen.insert(base) {
                        next.push(base);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            levels.push(next.clone());
            frontier = next;
        }

        if reaches_object && ty != TypeId::OBJECT {
            levels.push(vec![TypeId::OBJECT]);
        }
        levels
    }

    /// Ancestors nearest-first, `OBJECT` last.
    pub fn ancestors(&self, ty: TypeId) -> Vec<TypeId> {
        self.ancestor_levels(ty).into_iter().flatten().collect()
    }

    pub fn is_derived_from(&self, ty: TypeId, ancestor: TypeId) -> bool {
        ty != ancestor && self.ancestors(ty).contains(&ancestor)
    }

    /// `ty` itself or the nearest ancestor that instantiates `owner`.
    ///
    /// Used to find the type arguments a generic declaring type was bound
    /// to when a member is reached through a derived or applied type.
    pub fn find_instantiation(&self, ty: TypeId, owner: DeclId) -> Option<TypeId> {
        if self.types.named_decl(ty) == Some(owner) {
            return Some(ty);
        }
        self.ancestors(ty)
            .into_iter()
            .find(|&a| self.types.named_decl(a) == Some(owner))
    }

    /// Narrowest type every input derives from (or is), `OBJECT` when the
    /// inputs share nothing below the top type or there are no inputs.
    pub fn common_ancestor(&self, tys: &[TypeId]) -> TypeId {
        let Some((&first, rest)) = tys.split_first() else {
            return TypeId::OBJECT;
        };
        let mut candidates = vec![first];
        candidates.extend(self.ancestors(first));

        let rest_ancestors: Vec<Vec<TypeId>> = rest.iter().map(|&t| self.ancestors(t)).collect();
        candidates
            .into_iter()
            .find(|&candidate| {
                rest.iter()
                    .zip(&rest_ancestors)
                    .all(|(&t, ancestors)| t == candidate || ancestors.contains(&candidate))
            })
            .unwrap_or(TypeId::OBJECT)
    }
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod tests;
