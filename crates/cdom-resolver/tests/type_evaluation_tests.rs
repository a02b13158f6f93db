//! Types of resolved and unresolved references and of whole expressions.

mod common;

use cdom_resolver::{Argument, BinaryOp, NodeIndex, Resolution, ResolveCategory};
use cdom_types::{DeclBuilder, DeclId, DeclKind, Modifiers, RefKind, TypeId};
use common::Fixture;

fn program() -> (Fixture, DeclId, DeclId) {
    let mut f = Fixture::new();
    let global = f.global();
    let program = f.class("Program", global, &[]);
    let main = f.method(program, "Main", Vec::new(), TypeId::VOID);
    (f, program, main)
}

fn exact(f: &mut Fixture, idx: NodeIndex, without_constants: bool) -> TypeId {
    f.with_resolver(|r, arena| r.evaluate_type(arena, idx, without_constants))
        .expect("reference node")
}

fn minimum(f: &mut Fixture, idx: NodeIndex) -> TypeId {
    f.with_resolver(|r, arena| r.evaluate_to_minimum_type(arena, idx))
        .expect("reference node")
}

fn expr(f: &mut Fixture, idx: NodeIndex) -> TypeId {
    f.with_resolver(|r, arena| r.evaluate_expr(arena, idx))
        .expect("valid node")
}

#[test]
fn test_minimum_type_is_common_ancestor_of_return_types() {
    let (mut f, program, main) = program();
    let global = f.global();
    let base = f.class("Base", global, &[]);
    let base_ty = f.ty(base);
    let first = f.class("Derived1", global, &[base_ty]);
    let second = f.class("Derived2", global, &[base_ty]);
    let (first_ty, second_ty) = (f.ty(first), f.ty(second));
    let (p_int, p_string) = (f.param(TypeId::INT32), f.param(TypeId::STRING));
    f.method(program, "Make", vec![p_int], first_ty);
    f.method(program, "Make", vec![p_string], second_ty);

    let flag = f.literal(TypeId::BOOL, main);
    let (call, callee) = f.call(main, "Make", &[flag]);

    assert_eq!(f.resolve(callee), Resolution::Unresolved);
    assert_eq!(minimum(&mut f, callee), base_ty);

    let name = f.atom("Make");
    let unresolved = f.types.unresolved(name);
    assert_eq!(exact(&mut f, callee, false), unresolved);
    assert_eq!(expr(&mut f, call), unresolved);
}

#[test]
fn test_minimum_type_of_unrelated_types_is_object() {
    let (mut f, program, main) = program();
    let global = f.global();
    let left = f.class("Left", global, &[]);
    let right = f.class("Right", global, &[]);
    let (left_ty, right_ty) = (f.ty(left), f.ty(right));
    let (p_int, p_string) = (f.param(TypeId::INT32), f.param(TypeId::STRING));
    f.method(program, "Make", vec![p_int], left_ty);
    f.method(program, "Make", vec![p_string], right_ty);

    let flag = f.literal(TypeId::BOOL, main);
    let (_, callee) = f.call(main, "Make", &[flag]);
    f.resolve(callee);

    assert_eq!(minimum(&mut f, callee), TypeId::OBJECT);
}

#[test]
fn test_minimum_type_without_candidates_is_object() {
    let (mut f, _, main) = program();
    let (_, callee) = f.call(main, "Nowhere", &[]);
    f.resolve(callee);

    assert_eq!(minimum(&mut f, callee), TypeId::OBJECT);
}

#[test]
fn test_shared_return_type_survives_a_mismatch() {
    let (mut f, program, main) = program();
    let (p_int, p_string) = (f.param(TypeId::INT32), f.param(TypeId::STRING));
    f.method(program, "Parse", vec![p_int], TypeId::INT64);
    f.method(program, "Parse", vec![p_string], TypeId::INT64);

    let flag = f.literal(TypeId::BOOL, main);
    let (call, callee) = f.call(main, "Parse", &[flag]);
    f.resolve(callee);

    assert_eq!(expr(&mut f, call), TypeId::INT64);
}

#[test]
fn test_exact_type_requires_agreeing_candidates() {
    let (mut f, _, main) = program();
    let global = f.global();
    let base = f.class("Base", global, &[]);
    f.field(base, "value", TypeId::INT32);
    let base_ty = f.ty(base);
    let holder = f.class("Holder", global, &[base_ty]);
    f.field(holder, "value", TypeId::INT32);
    f.field(base, "label", TypeId::STRING);
    f.field(holder, "label", TypeId::BOOL);

    // Instance fields through the type name: category matches only.
    let access = |f: &mut Fixture, member: &str| {
        let receiver = f.name("Holder", ResolveCategory::Unspecified, main);
        let member = f.name(member, ResolveCategory::Expression, main);
        let node = f.arena.member_access(receiver, member);
        f.arena.add_root(node);
        member
    };

    let value = access(&mut f, "value");
    assert_eq!(f.resolve(value), Resolution::Unresolved);
    assert_eq!(
        f.reference(value).matches().expect("matches").len(),
        2,
        "both depths contribute"
    );
    assert_eq!(exact(&mut f, value, false), TypeId::INT32);

    let label = access(&mut f, "label");
    f.resolve(label);
    let name = f.atom("label");
    let unresolved = f.types.unresolved(name);
    assert_eq!(exact(&mut f, label, false), unresolved);
}

#[test]
fn test_constants_can_be_excluded() {
    let (mut f, _, main) = program();
    let global = f.global();
    let limits = f.class("Limits", global, &[]);
    let max = f.atom("Max");
    f.decls.add(
        DeclBuilder::new(max, DeclKind::Field)
            .parent(limits)
            .modifiers(Modifiers::CONST)
            .ty(TypeId::INT32)
            .build(),
    );
    let limits_ty = f.ty(limits);
    f.local(main, "l", Some(limits_ty));

    // A constant through an instance is a category match.
    let receiver = f.name("l", ResolveCategory::Unspecified, main);
    let member = f.name("Max", ResolveCategory::Expression, main);
    let node = f.arena.member_access(receiver, member);
    f.arena.add_root(node);

    assert_eq!(f.resolve(member), Resolution::Unresolved);
    assert_eq!(exact(&mut f, member, false), TypeId::INT32);
    assert_eq!(exact(&mut f, member, true), TypeId::INT32, "a lone constant keeps its type");
}

#[test]
fn test_excluded_constants_do_not_break_agreement() {
    let (mut f, _, main) = program();
    let global = f.global();
    let base = f.class("Base", global, &[]);
    let size = f.atom("Size");
    f.decls.add(
        DeclBuilder::new(size, DeclKind::Field)
            .parent(base)
            .static_member()
            .ty(TypeId::INT32)
            .build(),
    );
    let base_ty = f.ty(base);
    let holder = f.class("Holder", global, &[base_ty]);
    f.decls.add(
        DeclBuilder::new(size, DeclKind::Field)
            .parent(holder)
            .modifiers(Modifiers::CONST)
            .ty(TypeId::INT64)
            .build(),
    );
    let holder_ty = f.ty(holder);
    f.local(main, "h", Some(holder_ty));

    // Static members through an instance: category matches at both depths.
    let receiver = f.name("h", ResolveCategory::Unspecified, main);
    let member = f.name("Size", ResolveCategory::Expression, main);
    let node = f.arena.member_access(receiver, member);
    f.arena.add_root(node);

    assert_eq!(f.resolve(member), Resolution::Unresolved);
    assert_eq!(f.reference(member).matches().expect("matches").len(), 2);
    let unresolved = f.types.unresolved(size);
    assert_eq!(exact(&mut f, member, false), unresolved);
    assert_eq!(exact(&mut f, member, true), TypeId::INT32);
}

#[test]
fn test_constructor_mismatch_still_has_the_constructed_type() {
    let (mut f, _, main) = program();
    let global = f.global();
    let shape = f.class("Shape", global, &[]);
    let p = f.param(TypeId::INT32);
    f.constructor(shape, vec![p]);

    let text = f.literal(TypeId::STRING, main);
    let (node, target) = f.new_object(main, "Shape", &[text]);

    assert_eq!(f.resolve(target), Resolution::Unresolved);
    let shape_ty = f.ty(shape);
    assert_eq!(exact(&mut f, target, false), shape_ty);
    assert_eq!(expr(&mut f, node), shape_ty);
}

#[test]
fn test_method_group_evaluates_to_method_group_type() {
    let (mut f, program, main) = program();
    let p_int = f.param(TypeId::INT32);
    let p_string = f.param(TypeId::STRING);
    let first = f.method(program, "Print", vec![p_int], TypeId::VOID);
    let second = f.method(program, "Print", vec![p_string], TypeId::VOID);

    let group = f.name("Print", ResolveCategory::Expression, main);
    f.arena.add_root(group);

    assert_eq!(f.resolve(group), Resolution::MethodGroup);
    let expected = f.types.method_group(&[first, second]);
    assert_eq!(exact(&mut f, group, false), expected);
}

#[test]
fn test_predefined_operators_and_element_access() {
    let (mut f, _, main) = program();
    let numbers_ty = f.types.array(TypeId::FLOAT64, 1);
    f.local(main, "numbers", Some(numbers_ty));
    f.local(main, "text", Some(TypeId::STRING));

    let text = f.name("text", ResolveCategory::Expression, main);
    let one = f.literal(TypeId::INT32, main);
    let (concat, _) = f.binary(BinaryOp::Add, text, one);
    assert_eq!(expr(&mut f, concat), TypeId::STRING);

    let a = f.literal(TypeId::INT16, main);
    let b = f.literal(TypeId::UINT8, main);
    let (sum, _) = f.binary(BinaryOp::Multiply, a, b);
    assert_eq!(expr(&mut f, sum), TypeId::INT32);

    let a = f.literal(TypeId::INT32, main);
    let b = f.literal(TypeId::FLOAT64, main);
    let (less, _) = f.binary(BinaryOp::Less, a, b);
    assert_eq!(expr(&mut f, less), TypeId::BOOL);

    let numbers = f.name("numbers", ResolveCategory::Expression, main);
    let indexer = f.name("this[]", ResolveCategory::Indexer, main);
    let zero = f.literal(TypeId::INT32, main);
    let element = f.arena.index(numbers, indexer, vec![Argument::value(zero)]);
    f.arena.add_root(element);
    assert_eq!(expr(&mut f, element), TypeId::FLOAT64);
    assert_eq!(f.resolve(indexer), Resolution::Intrinsic);

    let text = f.name("text", ResolveCategory::Expression, main);
    let indexer = f.name("this[]", ResolveCategory::Indexer, main);
    let zero = f.literal(TypeId::INT32, main);
    let ch = f.arena.index(text, indexer, vec![Argument::value(zero)]);
    f.arena.add_root(ch);
    assert_eq!(expr(&mut f, ch), TypeId::CHAR);
}

#[test]
fn test_user_defined_indexer() {
    let (mut f, _, main) = program();
    let global = f.global();
    let table = f.class("Table", global, &[]);
    let key = f.param(TypeId::STRING);
    let item = {
        let name = f.atom("Item");
        f.decls.add(
            DeclBuilder::new(name, DeclKind::Indexer)
                .parent(table)
                .param(key)
                .ty(TypeId::DECIMAL)
                .build(),
        )
    };
    let table_ty = f.ty(table);
    f.local(main, "prices", Some(table_ty));

    let prices = f.name("prices", ResolveCategory::Expression, main);
    let indexer = f.name("Item", ResolveCategory::Indexer, main);
    let key = f.literal(TypeId::STRING, main);
    let node = f.arena.index(prices, indexer, vec![Argument::value(key)]);
    f.arena.add_root(node);

    assert_eq!(expr(&mut f, node), TypeId::DECIMAL);
    assert_eq!(f.target(indexer), Some(item));
}

#[test]
fn test_this_is_the_enclosing_type() {
    let (mut f, program, main) = program();
    let this = f.arena.this(main);
    assert_eq!(expr(&mut f, this), f.ty(program));
}

#[test]
fn test_out_argument_of_call_is_evaluated() {
    let (mut f, program, main) = program();
    let out = f.ref_param(TypeId::INT32, RefKind::Out);
    f.method(program, "TryParse", vec![out], TypeId::BOOL);
    f.local(main, "result", Some(TypeId::INT32));

    let result = f.name("result", ResolveCategory::Expression, main);
    let (call, _) = f.call_with(main, "TryParse", vec![Argument::by_ref(result, RefKind::Out)]);
    assert_eq!(expr(&mut f, call), TypeId::BOOL);
}
