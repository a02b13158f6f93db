//! Type identity and implicit convertibility.
//!
//! This is the relation the Parameter Matcher uses: identity for reference
//! and output parameters, implicit conversion for everything else. Unknown
//! or unresolved types never relate to anything; callers distinguish that
//! case from a genuine mismatch themselves.

use crate::decl::{DeclId, DeclKind, DeclarationStore, ParamDecl};
use crate::hierarchy::Hierarchy;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::types::{IntrinsicKind, TypeData, TypeId};
use tracing::trace;

/// How an argument reaches a parameter type. Ordered best-first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Conversion {
    Identity,
    Implicit,
}

/// Parameter list and return type of a delegate type, instantiated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegateSignature {
    pub params: Vec<ParamDecl>,
    pub return_type: TypeId,
}

pub struct TypeRelation<'a> {
    types: &'a TypeInterner,
    decls: &'a DeclarationStore,
    hierarchy: Hierarchy<'a>,
}

impl<'a> TypeRelation<'a> {
    pub fn new(types: &'a TypeInterner, decls: &'a DeclarationStore) -> Self {
        Self {
            types,
            decls,
            hierarchy: Hierarchy::new(types, decls),
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy<'a> {
        &self.hierarchy
    }

    #[inline]
    pub fn is_identical(&self, source: TypeId, target: TypeId) -> bool {
        source == target && !self.types.is_undetermined(source)
    }

    pub fn is_implicitly_convertible(&self, source: TypeId, target: TypeId) -> bool {
        self.classify(source, target).is_some()
    }

    /// Classify the conversion from `source` to `target`, `None` if there is
    /// no implicit conversion.
    pub fn classify(&self, source: TypeId, target: TypeId) -> Option<Conversion> {
        if self.types.is_undetermined(source) || self.types.is_undetermined(target) {
            return None;
        }
        if source == target {
            return Some(Conversion::Identity);
        }
        if source == TypeId::VOID || target == TypeId::VOID {
            return None;
        }
        let conversion = self.classify_implicit(source, target);
        trace!(
            source = source.0,
            target = target.0,
            convertible = conversion.is_some(),
            "classify conversion"
        );
        conversion
    }

    fn classify_implicit(&self, source: TypeId, target: TypeId) -> Option<Conversion> {
        if let Some(methods) = self.types.method_group_members(source) {
            let compatible = methods
                .iter()
                .any(|&m| self.is_method_compatible_with_delegate(m, target));
            return compatible.then_some(Conversion::Implicit);
        }
        if source == TypeId::NULL {
            return self.is_reference_type(target).then_some(Conversion::Implicit);
        }
        if target == TypeId::OBJECT {
            return Some(Conversion::Implicit);
        }
        if let (Some(from), Some(to)) = (
            self.types.intrinsic_kind(source),
            self.types.intrinsic_kind(target),
        ) {
            return is_numeric_widening(from, to).then_some(Conversion::Implicit);
        }
        if let (Some((from_elem, from_rank)), Some((to_elem, to_rank))) = (
            self.types.array_parts(source),
            self.types.array_parts(target),
        ) {
            // Array covariance only holds for reference element types.
            let covariant = from_rank == to_rank
                && self.is_reference_type(from_elem)
                && self.classify(from_elem, to_elem).is_some();
            return covariant.then_some(Conversion::Implicit);
        }
        self.hierarchy
            .is_derived_from(source, target)
            .then_some(Conversion::Implicit)
    }

    /// Whether `null` converts to the type.
    pub fn is_reference_type(&self, ty: TypeId) -> bool {
        match self.types.lookup(ty) {
            Some(TypeData::Intrinsic(kind)) => kind.is_reference(),
            Some(TypeData::Array { .. }) => true,
            Some(TypeData::Declared(decl)) | Some(TypeData::Application { base: decl, .. }) => {
                matches!(
                    self.decls.kind(decl),
                    Some(DeclKind::Class | DeclKind::Interface | DeclKind::Delegate)
                )
            }
            _ => false,
        }
    }

    /// Signature of a delegate type, with the delegate's own type arguments
    /// substituted.
    pub fn delegate_signature(&self, ty: TypeId) -> Option<DelegateSignature> {
        let decl_id = self.types.named_decl(ty)?;
        let decl = self.decls.get(decl_id)?;
        if decl.kind != DeclKind::Delegate {
            return None;
        }
        let subst = TypeSubstitution::for_owner(decl_id, &self.types.type_args(ty));
        let params = decl
            .params
            .iter()
            .map(|p| ParamDecl {
                ty: instantiate_type(self.types, p.ty, &subst),
                ..p.clone()
            })
            .collect();
        let return_type = instantiate_type(self.types, decl.ty.unwrap_or(TypeId::VOID), &subst);
        Some(DelegateSignature {
            params,
            return_type,
        })
    }

    /// Whether a (non-generic) method can be converted to a delegate type.
    ///
    /// Parameter modes must agree; delegate parameters must be identical to,
    /// or reference-convertible to, the method's parameters; the method's
    /// return type must be identical to or reference-convertible to the
    /// delegate's (and `void` only matches `void`).
    pub fn is_method_compatible_with_delegate(&self, method: DeclId, delegate: TypeId) -> bool {
        let Some(signature) = self.delegate_signature(delegate) else {
            return false;
        };
        let Some(decl) = self.decls.get(method) else {
            return false;
        };
        if !matches!(decl.kind, DeclKind::Method) || decl.generic_arity() != 0 {
            return false;
        }
        if decl.params.len() != signature.params.len() {
            return false;
        }
        let params_ok = decl
            .params
            .iter()
            .zip(&signature.params)
            .all(|(mp, dp)| {
                mp.ref_kind == dp.ref_kind
                    && (mp.ty == dp.ty
                        || (!mp.ref_kind.is_by_ref()
                            && self.is_reference_type(dp.ty)
                            && self.is_implicitly_convertible(dp.ty, mp.ty)))
            });
        if !params_ok {
            return false;
        }
        let method_return = decl.ty.unwrap_or(TypeId::VOID);
        if signature.return_type == TypeId::VOID || method_return == TypeId::VOID {
            return signature.return_type == method_return;
        }
        method_return == signature.return_type
            || (self.is_reference_type(method_return)
                && self.is_implicitly_convertible(method_return, signature.return_type))
    }
}

/// Implicit numeric conversions between intrinsic types.
pub fn is_numeric_widening(from: IntrinsicKind, to: IntrinsicKind) -> bool {
    use IntrinsicKind::*;
    match from {
        Int8 => matches!(to, Int16 | Int32 | Int64 | Float32 | Float64 | Decimal),
        UInt8 => matches!(
            to,
            Int16 | UInt16 | Int32 | UInt32 | Int64 | UInt64 | Float32 | Float64 | Decimal
        ),
        Int16 => matches!(to, Int32 | Int64 | Float32 | Float64 | Decimal),
        UInt16 | Char => matches!(
            to,
            Int32 | UInt32 | Int64 | UInt64 | Float32 | Float64 | Decimal
        ) || (from == Char && to == UInt16),
        Int32 => matches!(to, Int64 | Float32 | Float64 | Decimal),
        UInt32 => matches!(to, Int64 | UInt64 | Float32 | Float64 | Decimal),
        Int64 | UInt64 => matches!(to, Float32 | Float64 | Decimal),
        Float32 => matches!(to, Float64),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/relation_tests.rs"]
mod tests;
