//! Shared fixture for resolver integration tests: a declaration store and a
//! DOM built side by side, resolved with the scope-chain provider.

#![allow(dead_code)]

use cdom_common::{Atom, DiagnosticCategory, Interner};
use cdom_resolver::{
    Argument, BinaryOp, NodeArena, NodeIndex, ReferenceNode, Resolution, ResolutionSummary,
    ResolveCategory, ResolveDiagnostic, ResolveErrorKind, Resolver, ResolverOptions,
    ScopeChainProvider, SpecializationTable,
};
use cdom_types::{
    DeclBuilder, DeclId, DeclKind, DeclarationStore, Modifiers, ParamDecl, RefKind, TypeId,
    TypeInterner,
};

pub struct Fixture {
    pub names: Interner,
    pub types: TypeInterner,
    pub decls: DeclarationStore,
    pub arena: NodeArena,
    pub options: ResolverOptions,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            names: Interner::new(),
            types: TypeInterner::new(),
            decls: DeclarationStore::new(),
            arena: NodeArena::new(),
            options: ResolverOptions::default(),
        }
    }

    pub fn atom(&mut self, s: &str) -> Atom {
        self.names.intern(s)
    }

    pub fn global(&self) -> DeclId {
        self.decls.global()
    }

    pub fn ty(&self, decl: DeclId) -> TypeId {
        self.types.declared(decl)
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    pub fn declare(&mut self, name: &str, kind: DeclKind, parent: DeclId) -> DeclId {
        let name = self.atom(name);
        self.decls.add(DeclBuilder::new(name, kind).parent(parent).build())
    }

    pub fn namespace(&mut self, name: &str, parent: DeclId) -> DeclId {
        self.declare(name, DeclKind::Namespace, parent)
    }

    pub fn class(&mut self, name: &str, parent: DeclId, bases: &[TypeId]) -> DeclId {
        let name = self.atom(name);
        let mut builder = DeclBuilder::new(name, DeclKind::Class).parent(parent);
        for &base in bases {
            builder = builder.base(base);
        }
        self.decls.add(builder.build())
    }

    pub fn interface(&mut self, name: &str, parent: DeclId) -> DeclId {
        self.declare(name, DeclKind::Interface, parent)
    }

    pub fn param(&mut self, ty: TypeId) -> ParamDecl {
        let name = self.atom("arg");
        ParamDecl::new(name, ty)
    }

    pub fn ref_param(&mut self, ty: TypeId, ref_kind: RefKind) -> ParamDecl {
        self.param(ty).by_ref(ref_kind)
    }

    pub fn params_array(&mut self, element: TypeId) -> ParamDecl {
        let array = self.types.array(element, 1);
        self.param(array).variadic()
    }

    pub fn method(&mut self, parent: DeclId, name: &str, params: Vec<ParamDecl>, returns: TypeId) -> DeclId {
        let name = self.atom(name);
        self.decls.add(
            DeclBuilder::new(name, DeclKind::Method)
                .parent(parent)
                .params(params)
                .returns(returns)
                .build(),
        )
    }

    pub fn static_method(
        &mut self,
        parent: DeclId,
        name: &str,
        params: Vec<ParamDecl>,
        returns: TypeId,
    ) -> DeclId {
        let name = self.atom(name);
        self.decls.add(
            DeclBuilder::new(name, DeclKind::Method)
                .parent(parent)
                .modifiers(Modifiers::STATIC)
                .params(params)
                .returns(returns)
                .build(),
        )
    }

    pub fn constructor(&mut self, parent: DeclId, params: Vec<ParamDecl>) -> DeclId {
        let name = self.atom(".ctor");
        self.decls.add(
            DeclBuilder::new(name, DeclKind::Constructor)
                .parent(parent)
                .params(params)
                .build(),
        )
    }

    pub fn field(&mut self, parent: DeclId, name: &str, ty: TypeId) -> DeclId {
        let name = self.atom(name);
        self.decls.add(
            DeclBuilder::new(name, DeclKind::Field)
                .parent(parent)
                .ty(ty)
                .build(),
        )
    }

    pub fn local(&mut self, parent: DeclId, name: &str, ty: Option<TypeId>) -> DeclId {
        let name = self.atom(name);
        let mut builder = DeclBuilder::new(name, DeclKind::Local).parent(parent);
        if let Some(ty) = ty {
            builder = builder.ty(ty);
        }
        self.decls.add(builder.build())
    }

    // -------------------------------------------------------------------------
    // DOM
    // -------------------------------------------------------------------------

    pub fn name(&mut self, name: &str, category: ResolveCategory, scope: DeclId) -> NodeIndex {
        let name = self.atom(name);
        self.arena.reference(name, category, scope)
    }

    pub fn literal(&mut self, ty: TypeId, scope: DeclId) -> NodeIndex {
        self.arena.literal(ty, scope)
    }

    /// `name(args)`; returns the call node and the callee reference.
    pub fn call(&mut self, scope: DeclId, name: &str, args: &[NodeIndex]) -> (NodeIndex, NodeIndex) {
        let args = args.iter().map(|&a| Argument::value(a)).collect();
        self.call_with(scope, name, args)
    }

    pub fn call_with(&mut self, scope: DeclId, name: &str, args: Vec<Argument>) -> (NodeIndex, NodeIndex) {
        let callee = self.name(name, ResolveCategory::Method, scope);
        let call = self.arena.call(callee, args);
        self.arena.add_root(call);
        (call, callee)
    }

    /// `receiver.name(args)`; returns the call node and the member reference.
    pub fn member_call(
        &mut self,
        receiver: NodeIndex,
        name: &str,
        args: &[NodeIndex],
    ) -> (NodeIndex, NodeIndex) {
        let scope = self.arena.scope(receiver).unwrap_or(DeclId(0));
        let member = self.name(name, ResolveCategory::Method, scope);
        let access = self.arena.member_access(receiver, member);
        let args = args.iter().map(|&a| Argument::value(a)).collect();
        let call = self.arena.call(access, args);
        self.arena.add_root(call);
        (call, member)
    }

    /// `new name(args)`; returns the new node and the constructor reference.
    pub fn new_object(&mut self, scope: DeclId, name: &str, args: &[NodeIndex]) -> (NodeIndex, NodeIndex) {
        let target = self.name(name, ResolveCategory::Constructor, scope);
        let args = args.iter().map(|&a| Argument::value(a)).collect();
        let node = self.arena.new_object(target, args);
        self.arena.add_root(node);
        (node, target)
    }

    /// `left op right`; returns the binary node and the operator reference.
    pub fn binary(&mut self, op: BinaryOp, left: NodeIndex, right: NodeIndex) -> (NodeIndex, NodeIndex) {
        let scope = self.arena.scope(left).unwrap_or(DeclId(0));
        let overload = self.name(op.overload_name(), ResolveCategory::OperatorOverload, scope);
        let node = self.arena.binary(op, left, right, overload);
        self.arena.add_root(node);
        (node, overload)
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    pub fn resolve(&mut self, idx: NodeIndex) -> Resolution {
        let provider = ScopeChainProvider::new(&self.types, &self.decls, &self.names)
            .with_attribute_suffix(self.options.attribute_suffix);
        let mut resolver = Resolver::new(&self.types, &self.decls, &provider, self.options.clone());
        resolver
            .resolve_node(&mut self.arena, idx)
            .expect("reference node")
    }

    pub fn resolve_specialized(&mut self, idx: NodeIndex, table: &mut SpecializationTable) -> Resolution {
        let provider = ScopeChainProvider::new(&self.types, &self.decls, &self.names);
        let mut resolver = Resolver::new(&self.types, &self.decls, &provider, self.options.clone())
            .with_specializer(table);
        resolver
            .resolve_node(&mut self.arena, idx)
            .expect("reference node")
    }

    pub fn resolve_all(&mut self) -> ResolutionSummary {
        let provider = ScopeChainProvider::new(&self.types, &self.decls, &self.names)
            .with_attribute_suffix(self.options.attribute_suffix);
        let mut resolver = Resolver::new(&self.types, &self.decls, &provider, self.options.clone());
        resolver.resolve_all(&mut self.arena).expect("valid arena")
    }

    /// Run `f` with a resolver over the fixture's arena.
    pub fn with_resolver<T>(&mut self, f: impl FnOnce(&mut Resolver<'_>, &mut NodeArena) -> T) -> T {
        let provider = ScopeChainProvider::new(&self.types, &self.decls, &self.names);
        let mut resolver = Resolver::new(&self.types, &self.decls, &provider, self.options.clone());
        f(&mut resolver, &mut self.arena)
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn reference(&self, idx: NodeIndex) -> &ReferenceNode {
        self.arena.reference_node(idx).expect("reference node")
    }

    pub fn target(&self, idx: NodeIndex) -> Option<DeclId> {
        self.reference(idx).target()
    }

    pub fn diagnostics(&self, idx: NodeIndex) -> Vec<ResolveDiagnostic> {
        self.arena.resolution_diagnostics(idx).cloned().collect()
    }

    /// The single resolution diagnostic of a node.
    pub fn diagnostic(&self, idx: NodeIndex) -> ResolveDiagnostic {
        let diagnostics = self.diagnostics(idx);
        assert_eq!(diagnostics.len(), 1, "expected one diagnostic, got {diagnostics:?}");
        diagnostics[0].clone()
    }

    pub fn assert_diagnostic(&self, idx: NodeIndex, kind: ResolveErrorKind, severity: DiagnosticCategory) {
        let diagnostic = self.diagnostic(idx);
        assert_eq!(diagnostic.kind, kind, "{diagnostic:?}");
        assert_eq!(diagnostic.severity, severity, "{diagnostic:?}");
    }
}
