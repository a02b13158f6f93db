use super::*;

#[test]
fn test_intrinsics_are_preseeded_in_order() {
    let types = TypeInterner::new();
    assert_eq!(types.len(), TypeId::FIRST_USER as usize);
    assert_eq!(
        types.lookup(TypeId::INT32),
        Some(TypeData::Intrinsic(IntrinsicKind::Int32))
    );
    assert_eq!(
        types.lookup(TypeId::STRING),
        Some(TypeData::Intrinsic(IntrinsicKind::String))
    );
    assert_eq!(types.intrinsic_kind(TypeId::OBJECT), Some(IntrinsicKind::Object));
}

#[test]
fn test_structural_dedup() {
    let types = TypeInterner::new();
    let a = types.array(TypeId::INT32, 1);
    let b = types.array(TypeId::INT32, 1);
    let c = types.array(TypeId::INT32, 2);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(types.array_parts(c), Some((TypeId::INT32, 2)));
}

#[test]
fn test_rank_zero_array_is_element() {
    let types = TypeInterner::new();
    assert_eq!(types.array(TypeId::STRING, 0), TypeId::STRING);
}

#[test]
fn test_array_of_ranks_nests_outer_first() {
    let types = TypeInterner::new();
    // int[][,] : an array (rank 1) of rank-2 arrays
    let jagged = types.array_of_ranks(TypeId::INT32, &[1, 2]);
    let (inner, rank) = types.array_parts(jagged).expect("array");
    assert_eq!(rank, 1);
    assert_eq!(types.array_parts(inner), Some((TypeId::INT32, 2)));
}

#[test]
fn test_application_without_args_is_declared() {
    let types = TypeInterner::new();
    let decl = DeclId(3);
    assert_eq!(types.application(decl, &[]), types.declared(decl));
    let list_int = types.application(decl, &[TypeId::INT32]);
    assert_eq!(types.named_decl(list_int), Some(decl));
    assert_eq!(types.type_args(list_int).as_slice(), &[TypeId::INT32]);
}

#[test]
fn test_undetermined_queries() {
    let types = TypeInterner::new();
    assert!(types.is_undetermined(TypeId::UNDETERMINED));
    assert!(types.is_undetermined(types.unresolved(Atom(7))));
    assert!(!types.is_undetermined(TypeId::OBJECT));
}
