//! Type substitution.
//!
//! Declared parameter types are shared by every call site, so substitution
//! never edits them: instantiating a type walks its structure and interns a
//! new type for every node that changed. Unchanged subtrees keep their ids.

use crate::decl::DeclId;
use crate::intern::TypeInterner;
use crate::types::{TypeData, TypeId, TypeList, TypeParamRef};
use cdom_common::limits::MAX_TYPE_WALK_DEPTH;
use rustc_hash::FxHashMap;

/// Mapping from type parameters to the types that replace them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeParamRef, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every type parameter of `owner` positionally to `args`.
    pub fn for_owner(owner: DeclId, args: &[TypeId]) -> Self {
        let mut subst = Self::new();
        subst.bind_owner(owner, args);
        subst
    }

    pub fn bind_owner(&mut self, owner: DeclId, args: &[TypeId]) {
        for (index, &arg) in args.iter().enumerate() {
            self.insert(
                TypeParamRef {
                    owner,
                    index: index as u32,
                },
                arg,
            );
        }
    }

    pub fn insert(&mut self, param: TypeParamRef, ty: TypeId) {
        self.map.insert(param, ty);
    }

    pub fn get(&self, param: TypeParamRef) -> Option<TypeId> {
        self.map.get(&param).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Replace type parameters in `ty` according to `subst`.
///
/// Parameters without a binding are left in place, array ranks are kept.
pub fn instantiate_type(types: &TypeInterner, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return ty;
    }
    instantiate_inner(types, ty, subst, 0)
}

fn instantiate_inner(
    types: &TypeInterner,
    ty: TypeId,
    subst: &TypeSubstitution,
    depth: u32,
) -> TypeId {
    if depth > MAX_TYPE_WALK_DEPTH || ty.is_intrinsic() {
        return ty;
    }
    match types.lookup(ty) {
        Some(TypeData::TypeParameter(param)) => subst.get(param).unwrap_or(ty),
        Some(TypeData::Array { element, rank }) => {
            let element = instantiate_inner(types, element, subst, depth + 1);
            types.array(element, rank)
        }
        Some(TypeData::Application { base, args }) => {
            let args: TypeList = args
                .iter()
                .map(|&arg| instantiate_inner(types, arg, subst, depth + 1))
                .collect();
            types.application(base, &args)
        }
        _ => ty,
    }
}

/// Whether any type parameter occurs inside `ty`.
pub fn contains_type_parameters(types: &TypeInterner, ty: TypeId) -> bool {
    contains_matching(types, ty, 0, &|data| {
        matches!(data, TypeData::TypeParameter(_))
    })
}

/// Whether a type parameter of `owner` occurs inside `ty`.
pub fn contains_type_params_of(types: &TypeInterner, ty: TypeId, owner: DeclId) -> bool {
    contains_matching(types, ty, 0, &|data| {
        matches!(data, TypeData::TypeParameter(p) if p.owner == owner)
    })
}

/// Whether `ty` is, or is built from, an undetermined or unresolved type.
pub fn contains_unresolved(types: &TypeInterner, ty: TypeId) -> bool {
    if ty == TypeId::UNDETERMINED {
        return true;
    }
    contains_matching(types, ty, 0, &|data| {
        matches!(
            data,
            TypeData::Unresolved(_) | TypeData::Intrinsic(crate::IntrinsicKind::Undetermined)
        )
    })
}

fn contains_matching(
    types: &TypeInterner,
    ty: TypeId,
    depth: u32,
    pred: &dyn Fn(&TypeData) -> bool,
) -> bool {
    if depth > MAX_TYPE_WALK_DEPTH {
        return false;
    }
    let Some(data) = types.lookup(ty) else {
        return false;
    };
    if pred(&data) {
        return true;
    }
    match data {
        TypeData::Array { element, .. } => contains_matching(types, element, depth + 1, pred),
        TypeData::Application { args, .. } => args
            .iter()
            .any(|&arg| contains_matching(types, arg, depth + 1, pred)),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
