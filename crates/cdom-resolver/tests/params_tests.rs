use super::*;
use cdom_common::{Atom, Interner};
use cdom_types::{DeclarationStore, TypeData};

struct Env {
    types: TypeInterner,
    decls: DeclarationStore,
    x: Atom,
}

fn env() -> Env {
    let mut names = Interner::new();
    Env {
        types: TypeInterner::new(),
        decls: DeclarationStore::new(),
        x: names.intern("x"),
    }
}

#[test]
fn test_implicit_conversion_for_value_parameters() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let params = [ParamDecl::new(e.x, TypeId::INT64)];

    let result = matcher.match_arguments(
        &params,
        &[ArgInfo::value(TypeId::INT32)],
        true,
        &TypeSubstitution::new(),
    );
    assert!(result.is_match());
    assert_eq!(result.conversions.as_slice(), &[Conversion::Implicit]);
}

#[test]
fn test_ref_parameter_requires_identity() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let params = [ParamDecl::new(e.x, TypeId::INT32).by_ref(RefKind::Ref)];
    let subst = TypeSubstitution::new();

    let narrower = ArgInfo {
        ty: TypeId::INT16,
        ref_kind: RefKind::Ref,
    };
    let result = matcher.match_arguments(&params, &[narrower], true, &subst);
    assert!(!result.is_match());
    assert!(!result.unresolved_cause);
    assert!(matches!(
        result.failure,
        Some(MismatchReason::ArgumentType { index: 0, .. })
    ));

    let exact = ArgInfo {
        ty: TypeId::INT32,
        ref_kind: RefKind::Ref,
    };
    let result = matcher.match_arguments(&params, &[exact], true, &subst);
    assert_eq!(result.conversions.as_slice(), &[Conversion::Identity]);

    // Passing by value to a ref parameter is a mode mismatch.
    let result = matcher.match_arguments(&params, &[ArgInfo::value(TypeId::INT32)], true, &subst);
    assert_eq!(
        result.failure,
        Some(MismatchReason::RefKind {
            index: 0,
            expected: RefKind::Ref,
            actual: RefKind::Value,
        })
    );
}

#[test]
fn test_variadic_expansion_is_forced_by_extra_arguments() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let ints = e.types.array(TypeId::INT32, 1);
    let params = [ParamDecl::new(e.x, ints).variadic()];
    let args = [
        ArgInfo::value(TypeId::INT32),
        ArgInfo::value(TypeId::INT32),
        ArgInfo::value(TypeId::INT16),
    ];

    let result = matcher.match_arguments(&params, &args, true, &TypeSubstitution::new());
    assert!(result.is_match());
    assert!(result.expanded);
    assert_eq!(result.conversions.len(), 3);

    let result = matcher.match_arguments(&params, &args, false, &TypeSubstitution::new());
    assert!(!result.is_match());
}

#[test]
fn test_single_variadic_argument_prefers_the_array() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let ints = e.types.array(TypeId::INT32, 1);
    let params = [ParamDecl::new(e.x, ints).variadic()];
    let subst = TypeSubstitution::new();

    let result = matcher.match_arguments(&params, &[ArgInfo::value(ints)], true, &subst);
    assert!(result.is_match());
    assert!(!result.expanded);

    let result = matcher.match_arguments(&params, &[ArgInfo::value(TypeId::INT32)], true, &subst);
    assert!(result.is_match());
    assert!(result.expanded);

    let result = matcher.match_arguments(&params, &[], true, &subst);
    assert!(result.is_match());
    assert!(result.expanded);
}

#[test]
fn test_active_expansion_skips_parameter_indexing() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let strings = e.types.array(TypeId::STRING, 1);
    let params = [ParamDecl::new(e.x, strings).variadic()];

    let mut variadic = Some(TypeId::STRING);
    let m = matcher.match_parameter(
        &params,
        None,
        5,
        ArgInfo::value(TypeId::STRING),
        &mut variadic,
        true,
        &TypeSubstitution::new(),
    );
    assert!(m.is_match());
    assert!(m.expanded);
    assert_eq!(m.expected, TypeId::STRING);
}

#[test]
fn test_undetermined_argument_is_an_unresolved_cause() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let params = [ParamDecl::new(e.x, TypeId::INT32)];

    let result = matcher.match_arguments(
        &params,
        &[ArgInfo::value(TypeId::UNDETERMINED)],
        true,
        &TypeSubstitution::new(),
    );
    assert!(result.unresolved_cause);
    assert_eq!(
        result.failure,
        Some(MismatchReason::UnresolvedArgument { index: 0 })
    );
}

#[test]
fn test_genuine_mismatch_after_unresolved_argument_clears_the_cause() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let params = [
        ParamDecl::new(e.x, TypeId::INT32),
        ParamDecl::new(e.x, TypeId::INT32),
    ];

    let result = matcher.match_arguments(
        &params,
        &[ArgInfo::value(TypeId::UNDETERMINED), ArgInfo::value(TypeId::STRING)],
        true,
        &TypeSubstitution::new(),
    );
    assert!(!result.unresolved_cause);
    assert_eq!(
        result.failure,
        Some(MismatchReason::ArgumentType {
            index: 1,
            expected: TypeId::INT32,
            actual: TypeId::STRING,
        })
    );
}

#[test]
fn test_unresolved_argument_among_matches_keeps_the_cause() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let params = [
        ParamDecl::new(e.x, TypeId::INT32),
        ParamDecl::new(e.x, TypeId::STRING),
    ];

    let result = matcher.match_arguments(
        &params,
        &[ArgInfo::value(TypeId::UNDETERMINED), ArgInfo::value(TypeId::STRING)],
        true,
        &TypeSubstitution::new(),
    );
    assert!(result.unresolved_cause);
    assert_eq!(
        result.failure,
        Some(MismatchReason::UnresolvedArgument { index: 0 })
    );
}

#[test]
fn test_unresolved_first_variadic_element_still_expands() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let params = [ParamDecl::new(e.x, e.types.array(TypeId::INT32, 1)).variadic()];

    let args = [
        ArgInfo::value(TypeId::UNDETERMINED),
        ArgInfo::value(TypeId::INT32),
        ArgInfo::value(TypeId::INT32),
    ];
    let result = matcher.match_arguments(&params, &args, true, &TypeSubstitution::new());
    assert!(result.unresolved_cause);
    assert_eq!(
        result.failure,
        Some(MismatchReason::UnresolvedArgument { index: 0 })
    );
}

#[test]
fn test_nested_unresolved_type_sets_the_cause_flag() {
    let mut names = Interner::new();
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let params = [ParamDecl::new(e.x, e.types.array(TypeId::INT32, 1))];
    let missing = e.types.array(e.types.unresolved(names.intern("Missing")), 1);

    let result =
        matcher.match_arguments(&params, &[ArgInfo::value(missing)], true, &TypeSubstitution::new());
    assert!(!result.is_match());
    assert!(result.unresolved_cause);
    assert!(matches!(
        e.types.lookup(missing),
        Some(TypeData::Array { .. })
    ));
}

#[test]
fn test_generic_parameter_is_substituted_before_matching() {
    let e = env();
    let relation = TypeRelation::new(&e.types, &e.decls);
    let matcher = ParameterMatcher::new(&e.types, &relation);
    let owner = cdom_types::DeclId(0);
    let t = e.types.type_param(owner, 0);
    let params = [ParamDecl::new(e.x, e.types.array(t, 1))];
    let arg = ArgInfo::value(e.types.array(TypeId::STRING, 1));

    // Unsubstituted: T[] only accepts T[].
    let result = matcher.match_arguments(&params, &[arg], true, &TypeSubstitution::new());
    assert!(!result.is_match());

    let subst = TypeSubstitution::for_owner(owner, &[TypeId::STRING]);
    let result = matcher.match_arguments(&params, &[arg], true, &subst);
    assert_eq!(result.conversions.as_slice(), &[Conversion::Identity]);
}
