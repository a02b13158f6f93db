//! Scoring one candidate declaration against one call site.
//!
//! A candidate is a *complete* match when its kind suits the category and
//! its static mode, generic arity and signature all fit; a *category*
//! match when only the kind fits; and *name-only* otherwise.

use crate::candidates::MatchCandidate;
use crate::category::ResolveCategory;
use crate::diagnostics::MismatchReason;
use crate::infer::{InferenceError, InferenceSlots, Inferencer};
use crate::params::{ArgInfo, ParameterMatcher};
use cdom_types::{
    DeclId, DeclKind, Declaration, DeclarationStore, ParamDecl, TypeId, TypeInterner, TypeList,
    TypeRelation, TypeSubstitution, contains_unresolved, instantiate_type,
};
use std::borrow::Cow;
use tracing::trace;

/// Whether a member is reached through a type, an instance, or neither.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StaticMode {
    /// Simple name in an instance context, constructors, operators.
    Any,
    /// `Type.Member`, or a simple name inside a static member.
    StaticOnly,
    /// `value.Member`
    InstanceOnly,
}

/// Everything known about the position a reference is used in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub category: ResolveCategory,
    /// Argument list when the reference is invoked.
    pub args: Option<Vec<ArgInfo>>,
    /// Explicit type arguments, `None` when none were written.
    pub explicit_type_args: Option<TypeList>,
    pub static_mode: StaticMode,
    /// Type the member is reached through (receiver or enclosing type),
    /// used to bind the declaring type's parameters.
    pub receiver: Option<TypeId>,
}

impl CallSite {
    pub fn new(category: ResolveCategory) -> Self {
        Self {
            category,
            args: None,
            explicit_type_args: None,
            static_mode: StaticMode::Any,
            receiver: None,
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<ArgInfo>) -> Self {
        self.args = Some(args);
        self
    }

    #[must_use]
    pub fn with_type_args(mut self, type_args: TypeList) -> Self {
        self.explicit_type_args = Some(type_args);
        self
    }

    #[must_use]
    pub fn with_static_mode(mut self, mode: StaticMode) -> Self {
        self.static_mode = mode;
        self
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: TypeId) -> Self {
        self.receiver = Some(receiver);
        self
    }

    fn any_unresolved_arg(&self, types: &TypeInterner) -> bool {
        self.args
            .iter()
            .flatten()
            .any(|a| contains_unresolved(types, a.ty))
    }
}

pub struct MatchClassifier<'a> {
    types: &'a TypeInterner,
    decls: &'a DeclarationStore,
    relation: TypeRelation<'a>,
}

impl<'a> MatchClassifier<'a> {
    pub fn new(types: &'a TypeInterner, decls: &'a DeclarationStore) -> Self {
        Self {
            types,
            decls,
            relation: TypeRelation::new(types, decls),
        }
    }

    pub fn relation(&self) -> &TypeRelation<'a> {
        &self.relation
    }

    /// Score `decl_id` against `site`. `None` for ids not in the store.
    pub fn classify(&self, decl_id: DeclId, site: &CallSite) -> Option<MatchCandidate> {
        let decl = self.decls.get(decl_id)?;
        let candidate = self.classify_decl(decl_id, decl, site);
        trace!(
            decl = decl_id.0,
            tier = ?candidate.tier(),
            failure = ?candidate.failure,
            "classified candidate"
        );
        Some(candidate)
    }

    fn classify_decl(
        &self,
        decl_id: DeclId,
        decl: &Declaration,
        site: &CallSite,
    ) -> MatchCandidate {
        let category = site.category;
        let is_method = decl.kind == DeclKind::Method;
        let mut subst = self.receiver_substitution(decl_id, site.receiver);

        // A delegate-typed variable can be invoked like a method.
        let delegate_params = if category == ResolveCategory::Method && decl.kind.is_variable() {
            decl.ty
                .map(|ty| instantiate_type(self.types, ty, &subst))
                .and_then(|ty| self.relation.delegate_signature(ty))
                .map(|sig| (sig.params, sig.return_type))
        } else {
            None
        };

        if !category.accepts(decl.kind) && delegate_params.is_none() {
            return MatchCandidate::name_only(
                decl_id,
                is_method,
                MismatchReason::WrongCategory { kind: decl.kind },
            );
        }

        if !self.static_mode_allows(decl, site.static_mode) {
            return MatchCandidate::category(
                decl_id,
                is_method,
                MismatchReason::StaticMode {
                    requires_instance: decl.is_instance_member(),
                },
            );
        }

        let owner = self.generic_owner(decl_id, decl, category);
        let arity = owner
            .and_then(|o| self.decls.get(o))
            .map_or(0, |o| o.generic_arity());
        let needs_explicit = matches!(
            category,
            ResolveCategory::Type
                | ResolveCategory::Constructor
                | ResolveCategory::Attribute
                | ResolveCategory::Unspecified
        ) || decl.kind.is_type();
        match &site.explicit_type_args {
            Some(args) if args.len() != arity => {
                return MatchCandidate::category(
                    decl_id,
                    is_method,
                    MismatchReason::TypeArgumentCount {
                        expected: arity,
                        actual: args.len(),
                    },
                );
            }
            None if arity > 0 && needs_explicit => {
                return MatchCandidate::category(
                    decl_id,
                    is_method,
                    MismatchReason::TypeArgumentCount {
                        expected: arity,
                        actual: 0,
                    },
                );
            }
            _ => {}
        }

        let mut type_args = TypeList::new();
        if let (Some(owner), Some(args)) = (owner, &site.explicit_type_args) {
            subst.bind_owner(owner, args);
            type_args = args.clone();
            if let Some(failure) = self.check_constraints(owner, &type_args, &subst) {
                return MatchCandidate::category(decl_id, is_method, failure);
            }
        }

        let args = match &site.args {
            Some(args) if category.is_invocation() => args,
            _ => {
                let mut candidate = MatchCandidate::complete(decl_id, is_method);
                candidate.inferred_type_arguments = type_args;
                return candidate;
            }
        };

        let params: Cow<'_, [ParamDecl]> = match &delegate_params {
            Some((params, _)) => Cow::Owned(params.clone()),
            None if decl.kind.is_type() => Cow::Owned(Vec::new()),
            None => Cow::Borrowed(decl.params.as_slice()),
        };

        if let Some(failure) = self.check_arity(&params, args.len()) {
            return MatchCandidate::category(decl_id, is_method, failure);
        }

        // Infer the candidate's own type parameters from the arguments.
        if arity > 0 && site.explicit_type_args.is_none() && owner == Some(decl_id) {
            match self.infer_type_arguments(decl_id, arity, &params, args, &subst) {
                Ok(inferred) => {
                    subst.bind_owner(decl_id, &inferred);
                    type_args = inferred;
                    if let Some(failure) = self.check_constraints(decl_id, &type_args, &subst) {
                        return MatchCandidate::category(decl_id, is_method, failure);
                    }
                }
                Err(err) => {
                    trace!(decl = decl_id.0, error = %err, "inference failed");
                    let mut candidate = MatchCandidate::category(
                        decl_id,
                        is_method,
                        MismatchReason::CannotInferTypeArguments {
                            type_param: err.type_param(),
                        },
                    );
                    candidate.unresolved_cause = site.any_unresolved_arg(self.types);
                    return candidate;
                }
            }
        }

        let matcher = ParameterMatcher::new(self.types, &self.relation);
        let signature = matcher.match_arguments(&params, args, true, &subst);
        if let Some(failure) = signature.failure {
            let mut candidate = MatchCandidate::category(decl_id, is_method, failure);
            candidate.unresolved_cause = signature.unresolved_cause;
            candidate.inferred_type_arguments = type_args;
            return candidate;
        }

        let mut candidate = MatchCandidate::complete(decl_id, is_method);
        candidate.inferred_type_arguments = type_args;
        candidate.conversions = signature.conversions;
        candidate.expanded_variadic = signature.expanded;
        candidate
    }

    fn static_mode_allows(&self, decl: &Declaration, mode: StaticMode) -> bool {
        match mode {
            StaticMode::Any => true,
            StaticMode::StaticOnly => !decl.is_instance_member(),
            StaticMode::InstanceOnly => !decl.is_static(),
        }
    }

    /// The declaration whose type parameters explicit type arguments bind:
    /// the declaring type for constructors, the declaration itself for
    /// types and methods.
    fn generic_owner(
        &self,
        decl_id: DeclId,
        decl: &Declaration,
        category: ResolveCategory,
    ) -> Option<DeclId> {
        match decl.kind {
            DeclKind::Constructor => decl.parent,
            DeclKind::Method => Some(decl_id),
            kind if kind.is_type() => Some(decl_id),
            _ if category == ResolveCategory::Type => Some(decl_id),
            _ => None,
        }
    }

    /// Bind the declaring type's parameters from the receiver's
    /// instantiation of it (`List<int>` for `list.Add`).
    pub fn receiver_substitution(
        &self,
        decl_id: DeclId,
        receiver: Option<TypeId>,
    ) -> TypeSubstitution {
        let mut subst = TypeSubstitution::new();
        let Some(receiver) = receiver else {
            return subst;
        };
        let Some(declaring) = self.decls.declaring_type(decl_id) else {
            return subst;
        };
        if self.decls.get(declaring).is_none_or(|d| d.generic_arity() == 0) {
            return subst;
        }
        if let Some(instance) = self.relation.hierarchy().find_instantiation(receiver, declaring) {
            subst.bind_owner(declaring, &self.types.type_args(instance));
        }
        subst
    }

    fn check_arity(&self, params: &[ParamDecl], actual: usize) -> Option<MismatchReason> {
        let expected_min = params
            .iter()
            .filter(|p| !p.has_default && !p.is_variadic)
            .count();
        let variadic = params.last().is_some_and(|p| p.is_variadic);
        let expected_max = (!variadic).then_some(params.len());
        let too_many = expected_max.is_some_and(|max| actual > max);
        (actual < expected_min || too_many).then_some(MismatchReason::ArgumentCount {
            expected_min,
            expected_max,
            actual,
        })
    }

    fn infer_type_arguments(
        &self,
        owner: DeclId,
        arity: usize,
        params: &[ParamDecl],
        args: &[ArgInfo],
        receiver_subst: &TypeSubstitution,
    ) -> Result<TypeList, InferenceError> {
        let inferencer = Inferencer::new(self.types, &self.relation);
        let mut slots = InferenceSlots::new(owner, arity);
        for (i, arg) in args.iter().enumerate() {
            let param = params
                .get(i)
                .or_else(|| params.last().filter(|p| p.is_variadic));
            let Some(param) = param else {
                break;
            };
            let param_ty = instantiate_type(self.types, param.ty, receiver_subst);
            let expands = param.is_variadic
                && !self.passes_array(param_ty, arg.ty, args.len(), params.len());
            let target = if expands {
                self.types.element_type(param_ty).unwrap_or(param_ty)
            } else {
                param_ty
            };
            inferencer.infer(&mut slots, target, arg.ty)?;
        }
        slots.finish()
    }

    /// Whether an argument for a variadic parameter is the array itself.
    fn passes_array(
        &self,
        param_ty: TypeId,
        arg_ty: TypeId,
        arg_count: usize,
        param_count: usize,
    ) -> bool {
        arg_count == param_count
            && match (self.types.array_parts(param_ty), self.types.array_parts(arg_ty)) {
                (Some((_, p_rank)), Some((_, a_rank))) => p_rank == a_rank,
                _ => false,
            }
    }

    /// Each type argument must convert to each (substituted) constraint of
    /// its parameter.
    fn check_constraints(
        &self,
        owner: DeclId,
        type_args: &[TypeId],
        subst: &TypeSubstitution,
    ) -> Option<MismatchReason> {
        let owner_decl = self.decls.get(owner)?;
        for (index, (param, &arg)) in owner_decl.type_params.iter().zip(type_args).enumerate() {
            if self.types.is_undetermined(arg) || self.types.type_param_ref(arg).is_some() {
                continue;
            }
            for &constraint in &param.constraints {
                let constraint = instantiate_type(self.types, constraint, subst);
                if !self.relation.is_implicitly_convertible(arg, constraint) {
                    return Some(MismatchReason::ConstraintViolation {
                        type_param: index,
                        type_arg: arg,
                        constraint,
                    });
                }
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../tests/classify_tests.rs"]
mod tests;
