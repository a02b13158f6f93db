//! Types of expressions and of unresolved references.
//!
//! `evaluate_type` is exact: it returns a type only when every surviving
//! candidate agrees on it and the unresolved type of the name otherwise.
//! `evaluate_to_minimum_type` widens to the candidates' common ancestor and
//! exists only to keep downstream checks quiet; it must not be used where
//! the exact type matters.

use crate::candidates::{MatchCandidate, MatchTier};
use crate::classify::MatchClassifier;
use crate::category::ResolveCategory;
use crate::dom::{BinaryOp, DomError, NodeArena, NodeIndex, NodeKind, ReferenceState};
use crate::resolver::{Resolver, reference_of};
use cdom_common::Atom;
use cdom_types::{
    DeclId, DeclKind, Hierarchy, IntrinsicKind, Modifiers, TypeId, TypeRelation, TypeSubstitution,
    instantiate_type,
};

impl Resolver<'_> {
    /// Type of an expression, resolving the references it contains.
    pub fn evaluate_expr(
        &mut self,
        arena: &mut NodeArena,
        idx: NodeIndex,
    ) -> Result<TypeId, DomError> {
        let kind = arena.kind(idx).ok_or(DomError::InvalidNode(idx))?.clone();
        match kind {
            NodeKind::Literal(ty) => Ok(ty),
            NodeKind::TypeKeyword(kind) => Ok(kind.type_id()),
            NodeKind::This => {
                let scope = arena.scope(idx).ok_or(DomError::InvalidNode(idx))?;
                Ok(self.this_type(scope))
            }
            NodeKind::Reference(_) | NodeKind::MemberAccess { .. } => {
                self.reference_value(arena, idx)
            }
            NodeKind::New { target, .. } => self.reference_value(arena, target),
            NodeKind::Call { callee, .. } => self.invocation_value(arena, callee),
            NodeKind::Index { target, indexer, .. } => {
                let target_ty = self.evaluate_expr(arena, target)?;
                self.resolve_node(arena, indexer)?;
                if let Some(resolved) = arena.expect_reference(indexer)?.as_resolved() {
                    return Ok(resolved.value_type);
                }
                match self.builtin_index(target_ty) {
                    Some(ty) => Ok(ty),
                    None => self.evaluate_return_type(arena, indexer),
                }
            }
            NodeKind::Binary {
                op,
                left,
                right,
                overload,
            } => {
                self.resolve_node(arena, overload)?;
                if let Some(resolved) = arena.expect_reference(overload)?.as_resolved() {
                    return Ok(resolved.value_type);
                }
                let left = self.evaluate_expr(arena, left)?;
                let right = self.evaluate_expr(arena, right)?;
                match self.builtin_binary(op, left, right) {
                    Some(ty) => Ok(ty),
                    None => self.evaluate_return_type(arena, overload),
                }
            }
            NodeKind::Attribute { .. } => Ok(TypeId::VOID),
        }
    }

    /// Value of a reference (or member access, or constructor target) after
    /// resolving it.
    fn reference_value(
        &mut self,
        arena: &mut NodeArena,
        idx: NodeIndex,
    ) -> Result<TypeId, DomError> {
        let Some(reference) = reference_of(arena, idx) else {
            return self.evaluate_expr(arena, idx);
        };
        self.resolve_node(arena, reference)?;
        self.evaluate_type(arena, reference, false)
    }

    /// Result of invoking `callee`.
    fn invocation_value(
        &mut self,
        arena: &mut NodeArena,
        callee: NodeIndex,
    ) -> Result<TypeId, DomError> {
        let Some(reference) = reference_of(arena, callee) else {
            // `make()(x)`: invoke whatever delegate the callee evaluates to.
            let ty = self.evaluate_expr(arena, callee)?;
            let relation = TypeRelation::new(self.types, self.decls);
            return Ok(relation
                .delegate_signature(ty)
                .map_or_else(|| self.types.unresolved(Atom::NONE), |s| s.return_type));
        };
        self.resolve_node(arena, reference)?;
        self.evaluate_return_type(arena, reference)
    }

    fn this_type(&self, scope: DeclId) -> TypeId {
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(decl) = self.decls.get(id) else {
                break;
            };
            if decl.kind.is_type() {
                return self.types.declared(id);
            }
            current = decl.parent;
        }
        TypeId::UNDETERMINED
    }

    // =========================================================================
    // Unresolved references
    // =========================================================================

    /// Exact type of a reference.
    ///
    /// Resolved references give their value type. A method group gives a
    /// method-group type. Otherwise, at category tier or better, the
    /// candidates' contribution types are used when they are all identical;
    /// in every other case the result is the unresolved type of the name.
    /// With `without_constants`, constants and enum members are left out of
    /// the agreement check while any other candidate remains.
    pub fn evaluate_type(
        &self,
        arena: &NodeArena,
        idx: NodeIndex,
        without_constants: bool,
    ) -> Result<TypeId, DomError> {
        let reference = arena.expect_reference(idx)?;
        let unresolved = self.types.unresolved(reference.name);
        let state = match &reference.state {
            ReferenceState::Resolved(resolved) => return Ok(resolved.value_type),
            ReferenceState::Unresolved(state) => state,
        };
        let Some(matches) = &state.matches else {
            return Ok(unresolved);
        };
        if matches.is_method_group() && matches.has_complete_match() {
            return Ok(self.types.method_group(&matches.targets()));
        }
        if matches.tier().is_none_or(|tier| tier < MatchTier::Category) {
            return Ok(unresolved);
        }
        let category = matches.category();
        let skip_constants = without_constants && matches.iter().any(|c| !self.is_constant(c));
        Ok(self
            .common_exact_type(
                matches
                    .iter()
                    .filter(|c| !(skip_constants && self.is_constant(c)))
                    .map(|c| self.contribution_type(c, category, matches.receiver())),
            )
            .unwrap_or(unresolved))
    }

    /// Exact result type of invoking a reference: the shared return type of
    /// its candidates at category tier or better.
    pub fn evaluate_return_type(
        &self,
        arena: &NodeArena,
        idx: NodeIndex,
    ) -> Result<TypeId, DomError> {
        let reference = arena.expect_reference(idx)?;
        let unresolved = self.types.unresolved(reference.name);
        let state = match &reference.state {
            ReferenceState::Resolved(resolved) => return Ok(resolved.value_type),
            ReferenceState::Unresolved(state) => state,
        };
        let Some(matches) = &state.matches else {
            return Ok(unresolved);
        };
        if matches.tier().is_none_or(|tier| tier < MatchTier::Category) {
            return Ok(unresolved);
        }
        Ok(self
            .common_exact_type(matches.iter().map(|c| self.return_type(c, matches.receiver())))
            .unwrap_or(unresolved))
    }

    /// Widened type of a reference: the nearest common ancestor of every
    /// candidate's contribution (or return) type, `object` when there is
    /// nothing to go on.
    pub fn evaluate_to_minimum_type(
        &self,
        arena: &NodeArena,
        idx: NodeIndex,
    ) -> Result<TypeId, DomError> {
        let reference = arena.expect_reference(idx)?;
        let state = match &reference.state {
            ReferenceState::Resolved(resolved) => return Ok(resolved.value_type),
            ReferenceState::Unresolved(state) => state,
        };
        let Some(matches) = &state.matches else {
            return Ok(TypeId::OBJECT);
        };
        let category = matches.category();
        let tys: Vec<TypeId> = matches
            .iter()
            .filter_map(|c| {
                self.contribution_type(c, category, matches.receiver())
                    .or_else(|| self.return_type(c, matches.receiver()))
            })
            .filter(|&ty| !self.is_unresolved_type(ty))
            .collect();
        Ok(Hierarchy::new(self.types, self.decls).common_ancestor(&tys))
    }

    /// The single type every item agrees on; `None` when one is missing,
    /// undetermined or different.
    fn common_exact_type(&self, tys: impl Iterator<Item = Option<TypeId>>) -> Option<TypeId> {
        let mut common = None;
        for ty in tys {
            let ty = ty.filter(|&t| !self.is_unresolved_type(t))?;
            match common {
                None => common = Some(ty),
                Some(existing) if existing == ty => {}
                Some(_) => return None,
            }
        }
        common
    }

    /// What a candidate says about the reference's type in `category`.
    fn contribution_type(
        &self,
        candidate: &MatchCandidate,
        category: ResolveCategory,
        receiver: Option<TypeId>,
    ) -> Option<TypeId> {
        let decl = self.decls.get(candidate.target)?;
        let args = &candidate.inferred_type_arguments;
        match category {
            ResolveCategory::Method
            | ResolveCategory::Indexer
            | ResolveCategory::OperatorOverload => None,
            ResolveCategory::Constructor | ResolveCategory::Attribute => {
                let type_decl = if decl.kind == DeclKind::Constructor {
                    decl.parent?
                } else {
                    candidate.target
                };
                Some(self.types.application(type_decl, args))
            }
            _ if decl.kind.is_type() => Some(self.types.application(candidate.target, args)),
            _ if decl.kind.is_variable() => match decl.kind {
                DeclKind::EnumMember => decl
                    .ty
                    .or_else(|| decl.parent.map(|p| self.types.declared(p))),
                _ => {
                    let subst = self.candidate_substitution(candidate, receiver);
                    decl.ty.map(|ty| instantiate_type(self.types, ty, &subst))
                }
            },
            _ => None,
        }
    }

    fn is_constant(&self, candidate: &MatchCandidate) -> bool {
        self.decls.get(candidate.target).is_some_and(|decl| {
            decl.modifiers.contains(Modifiers::CONST) || decl.kind == DeclKind::EnumMember
        })
    }

    /// Receiver-bound type arguments plus the candidate's own.
    fn candidate_substitution(
        &self,
        candidate: &MatchCandidate,
        receiver: Option<TypeId>,
    ) -> TypeSubstitution {
        let classifier = MatchClassifier::new(self.types, self.decls);
        let mut subst = classifier.receiver_substitution(candidate.target, receiver);
        if !candidate.inferred_type_arguments.is_empty() {
            subst.bind_owner(candidate.target, &candidate.inferred_type_arguments);
        }
        subst
    }

    /// Result type of invoking a candidate, receiver-bound and its own type
    /// arguments applied.
    fn return_type(&self, candidate: &MatchCandidate, receiver: Option<TypeId>) -> Option<TypeId> {
        let decl = self.decls.get(candidate.target)?;
        let args = &candidate.inferred_type_arguments;
        match decl.kind {
            DeclKind::Constructor => decl.parent.map(|p| self.types.application(p, args)),
            kind if kind.is_type() => Some(self.types.application(candidate.target, args)),
            DeclKind::Namespace => None,
            kind => {
                let subst = self.candidate_substitution(candidate, receiver);
                if kind.is_variable() {
                    let relation = TypeRelation::new(self.types, self.decls);
                    decl.ty
                        .map(|ty| instantiate_type(self.types, ty, &subst))
                        .and_then(|ty| relation.delegate_signature(ty))
                        .map(|s| s.return_type)
                } else {
                    Some(instantiate_type(
                        self.types,
                        decl.ty.unwrap_or(TypeId::VOID),
                        &subst,
                    ))
                }
            }
        }
    }

    // =========================================================================
    // Built-in operators
    // =========================================================================

    /// Result type of `left op right` under the predefined operators, `None`
    /// when no predefined operator applies.
    pub(crate) fn builtin_binary(
        &self,
        op: BinaryOp,
        left: TypeId,
        right: TypeId,
    ) -> Option<TypeId> {
        let numeric = match (self.types.intrinsic_kind(left), self.types.intrinsic_kind(right)) {
            (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => promote_numeric(l, r),
            _ => None,
        };
        if op.is_logical() {
            return (left == TypeId::BOOL && right == TypeId::BOOL).then_some(TypeId::BOOL);
        }
        if op.is_relational() {
            return numeric.map(|_| TypeId::BOOL);
        }
        if op.is_equality() {
            let relation = TypeRelation::new(self.types, self.decls);
            let comparable = numeric.is_some()
                || (left == right && left.is_intrinsic())
                || (relation.is_reference_type(left) && relation.is_reference_type(right));
            return comparable.then_some(TypeId::BOOL);
        }
        if op == BinaryOp::Add && (left == TypeId::STRING || right == TypeId::STRING) {
            return Some(TypeId::STRING);
        }
        numeric
    }

    /// Element type of a built-in element access.
    pub(crate) fn builtin_index(&self, target: TypeId) -> Option<TypeId> {
        if target == TypeId::STRING {
            return Some(TypeId::CHAR);
        }
        self.types.element_type(target)
    }
}

/// Binary numeric promotion: both operands are converted to the narrowest
/// type that holds either, `int` at least. `None` for mixes with no
/// predefined operator (`decimal` with floating point, `ulong` with signed).
fn promote_numeric(left: IntrinsicKind, right: IntrinsicKind) -> Option<TypeId> {
    use IntrinsicKind as K;
    let either = |k: IntrinsicKind| left == k || right == k;
    let signed = |k: IntrinsicKind| matches!(k, K::Int8 | K::Int16 | K::Int32 | K::Int64);
    let floating = |k: IntrinsicKind| matches!(k, K::Float32 | K::Float64);

    if either(K::Decimal) {
        return (!floating(left) && !floating(right)).then_some(TypeId::DECIMAL);
    }
    if either(K::Float64) {
        return Some(TypeId::FLOAT64);
    }
    if either(K::Float32) {
        return Some(TypeId::FLOAT32);
    }
    if either(K::UInt64) {
        return (!signed(left) && !signed(right)).then_some(TypeId::UINT64);
    }
    if either(K::Int64) {
        return Some(TypeId::INT64);
    }
    if either(K::UInt32) {
        return Some(if signed(left) || signed(right) {
            TypeId::INT64
        } else {
            TypeId::UINT32
        });
    }
    Some(TypeId::INT32)
}

#[cfg(test)]
#[path = "../tests/evaluate_tests.rs"]
mod tests;
