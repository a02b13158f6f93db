use super::*;

#[test]
fn test_type_category_accepts_only_types() {
    assert!(ResolveCategory::Type.accepts(DeclKind::Class));
    assert!(ResolveCategory::Type.accepts(DeclKind::Delegate));
    assert!(!ResolveCategory::Type.accepts(DeclKind::Method));
    assert!(!ResolveCategory::Type.accepts(DeclKind::Namespace));
}

#[test]
fn test_expression_category_accepts_variables_and_methods() {
    let cat = ResolveCategory::Expression;
    assert!(cat.accepts(DeclKind::Local));
    assert!(cat.accepts(DeclKind::Field));
    assert!(cat.accepts(DeclKind::EnumMember));
    assert!(cat.accepts(DeclKind::Method));
    assert!(!cat.accepts(DeclKind::Class));
    assert!(!cat.accepts(DeclKind::Constructor));
}

#[test]
fn test_constructor_category_accepts_types_for_implicit_constructors() {
    assert!(ResolveCategory::Constructor.accepts(DeclKind::Constructor));
    assert!(ResolveCategory::Constructor.accepts(DeclKind::Struct));
    assert!(!ResolveCategory::Constructor.accepts(DeclKind::Interface));
}

#[test]
fn test_unspecified_accepts_everything() {
    assert!(ResolveCategory::Unspecified.accepts(DeclKind::Namespace));
    assert!(ResolveCategory::Unspecified.accepts(DeclKind::Parameter));
}

#[test]
fn test_invocation_categories() {
    assert!(ResolveCategory::Method.is_invocation());
    assert!(ResolveCategory::Indexer.is_invocation());
    assert!(!ResolveCategory::Expression.is_invocation());
    assert!(!ResolveCategory::Type.is_invocation());
}
