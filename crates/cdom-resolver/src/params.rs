//! Argument-to-parameter matching.

use crate::diagnostics::MismatchReason;
use cdom_types::{
    Conversion, ParamDecl, RefKind, TypeId, TypeInterner, TypeRelation, TypeSubstitution,
    contains_unresolved, instantiate_type,
};
use smallvec::SmallVec;

/// One call-site argument as the matcher sees it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArgInfo {
    pub ty: TypeId,
    pub ref_kind: RefKind,
}

impl ArgInfo {
    pub fn value(ty: TypeId) -> Self {
        Self {
            ty,
            ref_kind: RefKind::Value,
        }
    }
}

/// Outcome of matching one argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParamMatch {
    pub conversion: Option<Conversion>,
    /// Failed because the argument's type is, or contains, an unresolved type.
    pub unresolved_cause: bool,
    /// The argument was matched against a variadic element type.
    pub expanded: bool,
    /// Type the argument was checked against.
    pub expected: TypeId,
}

impl ParamMatch {
    pub fn is_match(&self) -> bool {
        self.conversion.is_some()
    }
}

/// Outcome of matching a whole argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureMatch {
    pub conversions: SmallVec<[Conversion; 4]>,
    pub expanded: bool,
    pub unresolved_cause: bool,
    pub failure: Option<MismatchReason>,
}

impl SignatureMatch {
    pub fn is_match(&self) -> bool {
        self.failure.is_none()
    }
}

pub struct ParameterMatcher<'a> {
    types: &'a TypeInterner,
    relation: &'a TypeRelation<'a>,
}

impl<'a> ParameterMatcher<'a> {
    pub fn new(types: &'a TypeInterner, relation: &'a TypeRelation<'a>) -> Self {
        Self { types, relation }
    }

    /// Match one argument against parameter `index` (`None` when the
    /// parameter list has no entry for it).
    ///
    /// `variadic` holds the element type once expansion has been forced;
    /// from then on every argument is matched against it.
    pub fn match_parameter(
        &self,
        params: &[ParamDecl],
        index: Option<usize>,
        arg_count: usize,
        arg: ArgInfo,
        variadic: &mut Option<TypeId>,
        allow_expansion: bool,
        subst: &TypeSubstitution,
    ) -> ParamMatch {
        if self.types.is_undetermined(arg.ty) {
            // Still force expansion so the arguments after it line up.
            let is_last = index.is_some_and(|i| i + 1 == params.len());
            if variadic.is_none()
                && allow_expansion
                && is_last
                && arg_count > params.len()
                && let Some(param) = index.and_then(|i| params.get(i))
                && param.is_variadic
            {
                let param_ty = instantiate_type(self.types, param.ty, subst);
                *variadic = self.types.element_type(param_ty);
            }
            return ParamMatch {
                conversion: None,
                unresolved_cause: true,
                expanded: false,
                expected: TypeId::UNDETERMINED,
            };
        }

        if let Some(element) = *variadic {
            let conversion = if arg.ref_kind.is_by_ref() {
                None
            } else {
                self.relation.classify(arg.ty, element)
            };
            return self.finish(arg, conversion, true, element);
        }

        let Some(param) = index.and_then(|i| params.get(i)) else {
            return self.finish(arg, None, false, TypeId::UNDETERMINED);
        };
        let param_ty = instantiate_type(self.types, param.ty, subst);

        // ref/out parameters alias the caller's storage: identity only.
        if param.ref_kind.is_by_ref() || arg.ref_kind.is_by_ref() {
            let conversion = (arg.ref_kind == param.ref_kind
                && self.relation.is_identical(arg.ty, param_ty))
            .then_some(Conversion::Identity);
            return self.finish(arg, conversion, false, param_ty);
        }

        let is_last = index.is_some_and(|i| i + 1 == params.len());
        let element = if param.is_variadic && is_last && allow_expansion {
            self.types.element_type(param_ty)
        } else {
            None
        };

        if let Some(element) = element
            && arg_count > params.len()
        {
            *variadic = Some(element);
            let conversion = self.relation.classify(arg.ty, element);
            return self.finish(arg, conversion, true, element);
        }

        let conversion = self.relation.classify(arg.ty, param_ty);
        if conversion.is_none()
            && let Some(element) = element
            && arg_count == params.len()
        {
            // A lone trailing argument: the array itself, else one element.
            let conversion = self.relation.classify(arg.ty, element);
            return self.finish(arg, conversion, conversion.is_some(), element);
        }
        self.finish(arg, conversion, false, param_ty)
    }

    fn finish(
        &self,
        arg: ArgInfo,
        conversion: Option<Conversion>,
        expanded: bool,
        expected: TypeId,
    ) -> ParamMatch {
        ParamMatch {
            conversion,
            unresolved_cause: conversion.is_none() && contains_unresolved(self.types, arg.ty),
            expanded,
            expected,
        }
    }

    /// Match every argument in order, stopping at the first failure.
    ///
    /// A failure caused by an unresolved argument does not stop the scan: a
    /// later genuine mismatch replaces it and clears `unresolved_cause`.
    pub fn match_arguments(
        &self,
        params: &[ParamDecl],
        args: &[ArgInfo],
        allow_expansion: bool,
        subst: &TypeSubstitution,
    ) -> SignatureMatch {
        let mut variadic = None;
        let mut unresolved = None;
        let mut result = SignatureMatch {
            conversions: SmallVec::new(),
            expanded: false,
            unresolved_cause: false,
            failure: None,
        };

        for (i, &arg) in args.iter().enumerate() {
            let index = (i < params.len()).then_some(i);
            let m = self.match_parameter(
                params,
                index,
                args.len(),
                arg,
                &mut variadic,
                allow_expansion,
                subst,
            );
            if let Some(conversion) = m.conversion {
                result.conversions.push(conversion);
                result.expanded |= m.expanded;
                continue;
            }
            let reason = self.failure_reason(params, index, i, arg, &m, variadic.is_some());
            if m.unresolved_cause {
                unresolved.get_or_insert(reason);
                continue;
            }
            result.failure = Some(reason);
            return result;
        }
        if let Some(reason) = unresolved {
            result.unresolved_cause = true;
            result.failure = Some(reason);
            return result;
        }

        // `h()` against `h(params int[])` uses the expanded form with no elements.
        if args.len() < params.len() && params.last().is_some_and(|p| p.is_variadic) {
            result.expanded = true;
        }
        result
    }

    fn failure_reason(
        &self,
        params: &[ParamDecl],
        index: Option<usize>,
        position: usize,
        arg: ArgInfo,
        m: &ParamMatch,
        in_expansion: bool,
    ) -> MismatchReason {
        if self.types.is_undetermined(arg.ty) {
            return MismatchReason::UnresolvedArgument { index: position };
        }
        let param = index.and_then(|i| params.get(i));
        match param {
            Some(param) if !in_expansion && param.ref_kind != arg.ref_kind => {
                MismatchReason::RefKind {
                    index: position,
                    expected: param.ref_kind,
                    actual: arg.ref_kind,
                }
            }
            None if !in_expansion => MismatchReason::ArgumentCount {
                expected_min: params.len(),
                expected_max: Some(params.len()),
                actual: position + 1,
            },
            _ => MismatchReason::ArgumentType {
                index: position,
                expected: m.expected,
                actual: arg.ty,
            },
        }
    }
}

#[cfg(test)]
#[path = "../tests/params_tests.rs"]
mod tests;
