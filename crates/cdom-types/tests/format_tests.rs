use super::*;
use crate::decl::{DeclBuilder, ParamDecl};

#[test]
fn test_format_intrinsics_and_arrays() {
    let names = Interner::new();
    let types = TypeInterner::new();
    let decls = DeclarationStore::new();
    let fmt = TypeFormatter::new(&types, &decls, &names);

    assert_eq!(fmt.format_type(TypeId::INT32), "int");
    assert_eq!(fmt.format_type(types.array(TypeId::STRING, 1)), "string[]");
    assert_eq!(fmt.format_type(types.array(TypeId::FLOAT64, 3)), "double[,,]");
    let jagged = types.array_of_ranks(TypeId::INT32, &[1, 2]);
    assert!(fmt.format_type(jagged).starts_with("int["));
}

#[test]
fn test_format_generic_types() {
    let mut names = Interner::new();
    let types = TypeInterner::new();
    let mut decls = DeclarationStore::new();
    let global = decls.global();
    let list = decls.add(
        DeclBuilder::new(names.intern("List"), DeclKind::Class)
            .parent(global)
            .type_param(names.intern("T"), Vec::new())
            .build(),
    );
    let fmt = TypeFormatter::new(&types, &decls, &names);

    assert_eq!(fmt.format_type(types.declared(list)), "List<T>");
    assert_eq!(fmt.format_type(types.type_param(list, 0)), "T");
    let list_int = types.application(list, &[TypeId::INT32]);
    assert_eq!(fmt.format_type(list_int), "List<int>");
    let nested = types.application(list, &[list_int]);
    assert_eq!(fmt.format_type(nested), "List<List<int>>");
}

#[test]
fn test_format_unresolved_uses_written_name() {
    let mut names = Interner::new();
    let missing = names.intern("Missing");
    let types = TypeInterner::new();
    let decls = DeclarationStore::new();
    let fmt = TypeFormatter::new(&types, &decls, &names);
    assert_eq!(fmt.format_type(types.unresolved(missing)), "Missing");
}

#[test]
fn test_format_signature() {
    let mut names = Interner::new();
    let types = TypeInterner::new();
    let mut decls = DeclarationStore::new();
    let global = decls.global();
    let ns = decls.add(
        DeclBuilder::new(names.intern("App"), DeclKind::Namespace)
            .parent(global)
            .build(),
    );
    let class = decls.add(
        DeclBuilder::new(names.intern("Program"), DeclKind::Class)
            .parent(ns)
            .build(),
    );
    let x = names.intern("x");
    let method = decls.add(
        DeclBuilder::new(names.intern("Run"), DeclKind::Method)
            .parent(class)
            .param(ParamDecl::new(x, TypeId::INT32))
            .param(ParamDecl::new(x, TypeId::STRING).by_ref(RefKind::Ref))
            .param(ParamDecl::new(x, types.array(TypeId::OBJECT, 1)).variadic())
            .build(),
    );
    let ctor = decls.add(
        DeclBuilder::new(names.intern(".ctor"), DeclKind::Constructor)
            .parent(class)
            .build(),
    );
    let field = decls.add(
        DeclBuilder::new(names.intern("count"), DeclKind::Field)
            .parent(class)
            .ty(TypeId::INT32)
            .build(),
    );
    let fmt = TypeFormatter::new(&types, &decls, &names);

    assert_eq!(
        fmt.format_signature(method),
        "App.Program.Run(int, ref string, params object[])"
    );
    assert_eq!(fmt.format_signature(ctor), "App.Program.Program()");
    assert_eq!(fmt.format_signature(field), "App.Program.count");
    assert_eq!(fmt.decl_name(ctor), "Program");
}
