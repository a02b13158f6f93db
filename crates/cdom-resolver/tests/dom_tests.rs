use super::*;
use crate::diagnostics::ResolveErrorKind;
use cdom_common::{DiagnosticCategory, Interner};

fn scope() -> DeclId {
    DeclId(3)
}

#[test]
fn test_add_sets_parent_of_children() {
    let mut names = Interner::new();
    let mut arena = NodeArena::new();
    let callee = arena.reference(names.intern("f"), ResolveCategory::Method, scope());
    let arg = arena.literal(TypeId::INT32, scope());
    let call = arena.call(callee, vec![Argument::value(arg)]);

    assert_eq!(arena.parent(callee), Some(call));
    assert_eq!(arena.parent(arg), Some(call));
    assert_eq!(arena.parent(call), None);
    assert_eq!(arena.scope(call), Some(scope()));
    assert_eq!(arena.len(), 3);
}

#[test]
fn test_references_lists_only_reference_nodes() {
    let mut names = Interner::new();
    let mut arena = NodeArena::new();
    let int = arena.type_keyword(IntrinsicKind::Int32, scope());
    let list = arena.generic_reference(
        names.intern("List"),
        vec![int],
        &[1],
        ResolveCategory::Type,
        scope(),
    );
    let x = arena.reference(names.intern("x"), ResolveCategory::Expression, scope());

    assert_eq!(arena.references().collect::<Vec<_>>(), vec![list, x]);
    assert_eq!(arena.parent(int), Some(list));
    let node = arena.reference_node(list).unwrap();
    assert_eq!(node.array_ranks.as_slice(), &[1]);
    assert_eq!(node.category(), ResolveCategory::Type);
    assert!(!node.is_resolved());
}

#[test]
fn test_expect_reference_errors() {
    let mut arena = NodeArena::new();
    let lit = arena.literal(TypeId::BOOL, scope());
    assert_eq!(
        arena.expect_reference(lit).unwrap_err(),
        DomError::NotAReference(lit)
    );
    assert_eq!(
        arena.expect_reference(NodeIndex(9)).unwrap_err(),
        DomError::InvalidNode(NodeIndex(9))
    );
    assert_eq!(DomError::InvalidNode(NodeIndex(9)).to_string(), "node #9 does not exist");
}

#[test]
fn test_unresolve_keeps_parse_diagnostics() {
    let mut names = Interner::new();
    let mut arena = NodeArena::new();
    let name = names.intern("x");
    let x = arena.reference(name, ResolveCategory::Expression, scope());

    arena.reference_node_mut(x).unwrap().state = ReferenceState::Resolved(ResolvedReference {
        category: ResolveCategory::Expression,
        kind: DeclKind::Local,
        target: DeclId(7),
        type_args: TypeList::new(),
        value_type: TypeId::INT32,
        specialized: None,
    });
    arena.attach_parse_diagnostic(
        x,
        Diagnostic::from_code("#0".into(), 0, DiagnosticCategory::Warning, &["parse"]),
    );
    arena.attach_resolution_diagnostic(
        x,
        ResolveDiagnostic::new(ResolveErrorKind::UnknownName, name, ResolveCategory::Expression),
    );
    assert_eq!(arena.reference_node(x).unwrap().target(), Some(DeclId(7)));

    arena.unresolve(x).unwrap();
    let node = arena.reference_node(x).unwrap();
    assert!(!node.is_resolved());
    assert_eq!(node.category(), ResolveCategory::Expression);
    assert!(node.matches().is_none());
    assert_eq!(arena.resolution_diagnostics(x).count(), 0);
    assert_eq!(arena.parse_diagnostics(x).count(), 1);
}

#[test]
fn test_binary_op_symbols() {
    assert_eq!(BinaryOp::from_symbol("+"), Some(BinaryOp::Add));
    assert_eq!(BinaryOp::from_symbol("<="), Some(BinaryOp::LessEqual));
    assert_eq!(BinaryOp::from_symbol("<<"), None);
    assert_eq!(BinaryOp::Add.overload_name(), "op_Addition");
    assert!(BinaryOp::NotEqual.is_equality());
    assert!(BinaryOp::Greater.is_relational());
    assert!(BinaryOp::LogicalOr.is_logical());
    assert!(!BinaryOp::Multiply.is_relational());
}

#[test]
fn test_initializers_and_roots() {
    let mut arena = NodeArena::new();
    let lit = arena.literal(TypeId::STRING, scope());
    arena.set_initializer(DeclId(11), lit);
    arena.add_root(lit);
    assert_eq!(arena.initializer(DeclId(11)), Some(lit));
    assert_eq!(arena.initializer(DeclId(12)), None);
    assert_eq!(arena.roots(), &[lit]);
}
