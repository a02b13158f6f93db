//! JSON project files.
//!
//! A project lists declarations as a tree (namespaces, types, members,
//! locals) and, per member, the expression trees of its body. Loading one
//! builds the declaration store and the node arena the resolver works on;
//! it is the stand-in for a real front end's tree builder.
//!
//! ```json
//! {
//!   "options": { "suppressCascadingErrors": true },
//!   "declarations": [
//!     { "name": "Program", "kind": "class", "members": [
//!       { "name": "F", "kind": "method", "type": "void",
//!         "params": [{ "name": "x", "type": "int" }] },
//!       { "name": "Main", "kind": "method", "type": "void", "body": [
//!         { "kind": "call", "callee": { "kind": "name", "name": "F" },
//!           "args": [{ "kind": "literal", "type": "int" }] }
//!       ]}
//!     ]}
//!   ]
//! }
//! ```
//!
//! Types are written as strings: keywords (`int`), declared names with
//! type arguments (`List<string>`), type parameters of an enclosing
//! declaration (`T`) and array ranks (`int[]`, `double[,]`).

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

use cdom_common::Interner;
use cdom_resolver::{
    Argument, BinaryOp, NodeArena, NodeIndex, ReferenceNode, ResolutionSummary, ResolveCategory,
    ResolveDiagnostic, Resolver, ResolverOptions, ScopeChainProvider, SpecializationTable,
};
use cdom_types::{
    DeclBuilder, DeclId, DeclKind, DeclarationStore, IntrinsicKind, Modifiers, ParamDecl, RefKind,
    TypeId, TypeInterner,
};

/// Name given to element-access references; indexers are found by kind.
const INDEXER_NAME: &str = "this[]";

// =============================================================================
// File format
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    #[serde(default)]
    pub options: ResolverOptions,
    #[serde(default)]
    pub declarations: Vec<DeclDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclDef {
    pub name: String,
    pub kind: DeclKind,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub type_params: Vec<TypeParamDef>,
    /// Variable type, or return type of methods, operators, indexers and
    /// delegates. Omitted on a local, the local is implicitly typed.
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDef>,
    #[serde(default)]
    pub bases: Vec<String>,
    /// Dotted paths of imported namespaces.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub members: Vec<DeclDef>,
    #[serde(default)]
    pub initializer: Option<ExprDef>,
    #[serde(default)]
    pub body: Vec<ExprDef>,
}

#[derive(Debug, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    #[serde(default)]
    pub constraints: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParamDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub mode: RefKind,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default)]
    pub optional: bool,
}

/// An expression. A missing `category` is taken from the position:
/// callees are methods, receivers are unspecified, the rest expressions.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExprDef {
    Literal {
        #[serde(rename = "type")]
        ty: String,
    },
    This,
    Name {
        name: String,
        #[serde(default)]
        category: Option<ResolveCategory>,
        #[serde(default, rename = "typeArgs")]
        type_args: Vec<String>,
    },
    Member {
        receiver: Box<ExprDef>,
        name: String,
        #[serde(default)]
        category: Option<ResolveCategory>,
        #[serde(default, rename = "typeArgs")]
        type_args: Vec<String>,
    },
    Call {
        callee: Box<ExprDef>,
        #[serde(default)]
        args: Vec<ArgDef>,
    },
    New {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        args: Vec<ArgDef>,
    },
    Index {
        target: Box<ExprDef>,
        #[serde(default)]
        args: Vec<ArgDef>,
    },
    Binary {
        op: String,
        left: Box<ExprDef>,
        right: Box<ExprDef>,
    },
    Attribute {
        name: String,
        #[serde(default)]
        args: Vec<ArgDef>,
    },
}

/// A call argument: an expression, or `{ "ref": "out", "expr": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ArgDef {
    ByRef {
        #[serde(rename = "ref")]
        mode: RefKind,
        expr: ExprDef,
    },
    Value(ExprDef),
}

// =============================================================================
// Type syntax
// =============================================================================

/// A parsed type string: `Outer.Name<Args>[,][]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSyntax {
    pub path: Vec<String>,
    pub args: Vec<TypeSyntax>,
    /// Outermost rank first.
    pub ranks: Vec<u32>,
}

impl TypeSyntax {
    pub fn parse(text: &str) -> Result<Self> {
        let mut parser = TypeParser { src: text, pos: 0 };
        let ty = parser.ty()?;
        parser.skip_ws();
        if parser.pos != text.len() {
            bail!("unexpected '{}' in type '{text}'", &text[parser.pos..]);
        }
        Ok(ty)
    }

    pub fn last(&self) -> &str {
        self.path.last().map_or("", String::as_str)
    }

    /// A built-in keyword without qualification or type arguments.
    pub fn keyword(&self) -> Option<IntrinsicKind> {
        if self.path.len() != 1 || !self.args.is_empty() {
            return None;
        }
        IntrinsicKind::from_keyword(self.last()).filter(|k| *k != IntrinsicKind::Undetermined)
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path.join("."))?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        for &rank in &self.ranks {
            write!(f, "[{}]", ",".repeat(rank.saturating_sub(1) as usize))?;
        }
        Ok(())
    }
}

struct TypeParser<'a> {
    src: &'a str,
    pos: usize,
}

impl TypeParser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek()
            && c.is_whitespace()
        {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<String> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek()
            && (c.is_alphanumeric() || c == '_')
        {
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            bail!("expected a name at offset {start} in type '{}'", self.src);
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn ty(&mut self) -> Result<TypeSyntax> {
        let mut path = vec![self.ident()?];
        while self.eat('.') {
            path.push(self.ident()?);
        }

        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.ty()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                bail!("unclosed type argument list in '{}'", self.src);
            }
        }

        let mut ranks = Vec::new();
        while self.eat('[') {
            let mut rank = 1;
            while self.eat(',') {
                rank += 1;
            }
            if !self.eat(']') {
                bail!("unclosed array rank in '{}'", self.src);
            }
            ranks.push(rank);
        }
        Ok(TypeSyntax { path, args, ranks })
    }
}

// =============================================================================
// Loaded project
// =============================================================================

/// Declarations and expression trees ready to resolve.
pub struct Project {
    pub names: Interner,
    pub types: TypeInterner,
    pub decls: DeclarationStore,
    pub arena: NodeArena,
    pub options: ResolverOptions,
    /// Generic targets bound to concrete type arguments, deduplicated.
    pub specializations: SpecializationTable,
}

/// State of every reference after a pass, for idempotence checks.
pub type Snapshot = Vec<(ReferenceNode, Vec<ResolveDiagnostic>)>;

impl Project {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("failed to load project {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: ProjectFile = serde_json::from_str(text).context("invalid project JSON")?;
        Self::build(file)
    }

    pub fn build(file: ProjectFile) -> Result<Self> {
        let mut builder = ProjectBuilder::new();
        let global = builder.decls.global();
        let declared = file
            .declarations
            .iter()
            .map(|def| builder.declare(def, global, ""))
            .collect::<Result<Vec<_>>>()?;
        for (def, declared) in file.declarations.iter().zip(&declared) {
            builder.define(def, declared)?;
        }
        debug!(
            declarations = builder.decls.len(),
            nodes = builder.arena.len(),
            roots = builder.arena.roots().len(),
            "project loaded"
        );
        Ok(Self {
            names: builder.names,
            types: builder.types,
            decls: builder.decls,
            arena: builder.arena,
            options: file.options,
            specializations: SpecializationTable::new(),
        })
    }

    /// Run one full resolution pass.
    pub fn resolve(&mut self) -> Result<ResolutionSummary> {
        let provider = ScopeChainProvider::new(&self.types, &self.decls, &self.names)
            .with_attribute_suffix(self.options.attribute_suffix);
        let mut resolver = Resolver::new(&self.types, &self.decls, &provider, self.options.clone())
            .with_specializer(&mut self.specializations);
        let summary = resolver
            .resolve_all(&mut self.arena)
            .context("resolution pass failed")?;
        Ok(summary)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.arena
            .references()
            .filter_map(|idx| {
                let reference = self.arena.reference_node(idx)?.clone();
                let diagnostics = self.arena.resolution_diagnostics(idx).cloned().collect();
                Some((reference, diagnostics))
            })
            .collect()
    }
}

/// Declaration ids in the shape of the file.
struct Declared {
    id: DeclId,
    members: Vec<Declared>,
}

struct ProjectBuilder {
    names: Interner,
    types: TypeInterner,
    decls: DeclarationStore,
    arena: NodeArena,
    /// Type declarations by simple name; the first declaration wins.
    type_names: FxHashMap<String, DeclId>,
    /// Namespaces by dotted path.
    namespaces: FxHashMap<String, DeclId>,
}

impl ProjectBuilder {
    fn new() -> Self {
        Self {
            names: Interner::new(),
            types: TypeInterner::new(),
            decls: DeclarationStore::new(),
            arena: NodeArena::new(),
            type_names: FxHashMap::default(),
            namespaces: FxHashMap::default(),
        }
    }

    /// First pass: create every declaration so types can refer forward.
    fn declare(&mut self, def: &DeclDef, parent: DeclId, path: &str) -> Result<Declared> {
        let mut modifiers = Modifiers::empty();
        for keyword in &def.modifiers {
            let Some(modifier) = Modifiers::from_keyword(keyword) else {
                bail!("unknown modifier '{keyword}' on '{}'", def.name);
            };
            modifiers |= modifier;
        }

        let name = self.names.intern(&def.name);
        let mut builder = DeclBuilder::new(name, def.kind)
            .parent(parent)
            .modifiers(modifiers);
        for tp in &def.type_params {
            let tp_name = self.names.intern(&tp.name);
            builder = builder.type_param(tp_name, Vec::new());
        }
        let id = self.decls.add(builder.build());

        let path = if path.is_empty() {
            def.name.clone()
        } else {
            format!("{path}.{}", def.name)
        };
        if def.kind == DeclKind::Namespace {
            self.namespaces.insert(path.clone(), id);
        } else if def.kind.is_type() {
            self.type_names.entry(def.name.clone()).or_insert(id);
        }

        let members = def
            .members
            .iter()
            .map(|member| self.declare(member, id, &path))
            .collect::<Result<Vec<_>>>()?;
        Ok(Declared { id, members })
    }

    /// Second pass: types, parameters, bases, imports and bodies.
    fn define(&mut self, def: &DeclDef, declared: &Declared) -> Result<()> {
        let id = declared.id;
        let ty = def
            .ty
            .as_deref()
            .map(|text| self.resolve_type(text, id))
            .transpose()?;

        let mut constraints = Vec::with_capacity(def.type_params.len());
        for tp in &def.type_params {
            let resolved = tp
                .constraints
                .iter()
                .map(|text| self.resolve_type(text, id))
                .collect::<Result<Vec<_>>>()?;
            constraints.push(resolved);
        }

        let mut params = Vec::with_capacity(def.params.len());
        for param in &def.params {
            let param_ty = self.resolve_type(&param.ty, id)?;
            let name = self.names.intern(&param.name);
            let mut decl = ParamDecl::new(name, param_ty).by_ref(param.mode);
            if param.variadic {
                decl = decl.variadic();
            }
            if param.optional {
                decl = decl.optional();
            }
            params.push(decl);
            if def.kind == DeclKind::Delegate {
                continue;
            }
            // Parameters are visible by name inside the body.
            self.decls.add(
                DeclBuilder::new(name, DeclKind::Parameter)
                    .parent(id)
                    .ty(param_ty)
                    .build(),
            );
        }

        let bases = def
            .bases
            .iter()
            .map(|text| self.resolve_type(text, id))
            .collect::<Result<Vec<_>>>()?;

        let mut imports = Vec::with_capacity(def.imports.len());
        for path in &def.imports {
            let Some(&ns) = self.namespaces.get(path) else {
                bail!("'{}' imports unknown namespace '{path}'", def.name);
            };
            imports.push(ns);
        }

        if let Some(decl) = self.decls.get_mut(id) {
            decl.ty = ty;
            decl.params = params;
            decl.base_types = bases;
            decl.imports = imports;
            for (tp, constraints) in decl.type_params.iter_mut().zip(constraints) {
                tp.constraints = constraints;
            }
        }

        for (member, declared) in def.members.iter().zip(&declared.members) {
            self.define(member, declared)?;
        }

        if let Some(init) = &def.initializer {
            let node = self.build_expr(init, id, ResolveCategory::Expression)?;
            self.arena.set_initializer(id, node);
        }
        for expr in &def.body {
            let node = self.build_expr(expr, id, ResolveCategory::Expression)?;
            self.arena.add_root(node);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    fn resolve_type(&mut self, text: &str, scope: DeclId) -> Result<TypeId> {
        let syntax = TypeSyntax::parse(text)?;
        self.type_of(&syntax, scope)
    }

    fn type_of(&self, syntax: &TypeSyntax, scope: DeclId) -> Result<TypeId> {
        let args = syntax
            .args
            .iter()
            .map(|arg| self.type_of(arg, scope))
            .collect::<Result<Vec<_>>>()?;
        let simple = syntax.path.len() == 1 && args.is_empty();

        let base = if let Some(kind) = syntax.keyword() {
            kind.type_id()
        } else if let Some(param) = simple
            .then(|| self.type_param_in_scope(syntax.last(), scope))
            .flatten()
        {
            param
        } else if let Some(&decl) = self.type_names.get(syntax.last()) {
            // Qualified names are looked up by their last segment.
            self.types.application(decl, &args)
        } else {
            bail!("unknown type '{syntax}'");
        };
        Ok(self.types.array_of_ranks(base, &syntax.ranks))
    }

    /// A type parameter named `name` on `scope` or an enclosing declaration.
    fn type_param_in_scope(&self, name: &str, scope: DeclId) -> Option<TypeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let decl = self.decls.get(id)?;
            if let Some(index) = decl
                .type_params
                .iter()
                .position(|tp| self.names.resolve(tp.name) == name)
            {
                return Some(self.types.type_param(id, index as u32));
            }
            current = decl.parent;
        }
        None
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn build_expr(
        &mut self,
        def: &ExprDef,
        scope: DeclId,
        position: ResolveCategory,
    ) -> Result<NodeIndex> {
        let node = match def {
            ExprDef::Literal { ty } => {
                let ty = self.resolve_type(ty, scope)?;
                self.arena.literal(ty, scope)
            }
            ExprDef::This => self.arena.this(scope),
            ExprDef::Name {
                name,
                category,
                type_args,
            } => self.name_node(name, category.unwrap_or(position), type_args, scope)?,
            ExprDef::Member {
                receiver,
                name,
                category,
                type_args,
            } => {
                let receiver = self.build_expr(receiver, scope, ResolveCategory::Unspecified)?;
                let member = self.name_node(name, category.unwrap_or(position), type_args, scope)?;
                self.arena.member_access(receiver, member)
            }
            ExprDef::Call { callee, args } => {
                let callee = self.build_expr(callee, scope, ResolveCategory::Method)?;
                let args = self.build_args(args, scope)?;
                self.arena.call(callee, args)
            }
            ExprDef::New { ty, args } => {
                let syntax = TypeSyntax::parse(ty)?;
                let target = self.type_node(&syntax, ResolveCategory::Constructor, scope);
                let args = self.build_args(args, scope)?;
                self.arena.new_object(target, args)
            }
            ExprDef::Index { target, args } => {
                let target = self.build_expr(target, scope, ResolveCategory::Expression)?;
                let name = self.names.intern(INDEXER_NAME);
                let indexer = self.arena.reference(name, ResolveCategory::Indexer, scope);
                let args = self.build_args(args, scope)?;
                self.arena.index(target, indexer, args)
            }
            ExprDef::Binary { op, left, right } => {
                let Some(op) = BinaryOp::from_symbol(op) else {
                    bail!("unknown binary operator '{op}'");
                };
                let left = self.build_expr(left, scope, ResolveCategory::Expression)?;
                let right = self.build_expr(right, scope, ResolveCategory::Expression)?;
                let name = self.names.intern(op.overload_name());
                let overload = self
                    .arena
                    .reference(name, ResolveCategory::OperatorOverload, scope);
                self.arena.binary(op, left, right, overload)
            }
            ExprDef::Attribute { name, args } => {
                let syntax = TypeSyntax::parse(name)?;
                let target = self.type_node(&syntax, ResolveCategory::Attribute, scope);
                let args = self.build_args(args, scope)?;
                self.arena.attribute(target, args)
            }
        };
        Ok(node)
    }

    fn build_args(&mut self, args: &[ArgDef], scope: DeclId) -> Result<Vec<Argument>> {
        args.iter()
            .map(|arg| match arg {
                ArgDef::Value(expr) => {
                    Ok(Argument::value(self.build_expr(expr, scope, ResolveCategory::Expression)?))
                }
                ArgDef::ByRef { mode, expr } => Ok(Argument::by_ref(
                    self.build_expr(expr, scope, ResolveCategory::Expression)?,
                    *mode,
                )),
            })
            .collect()
    }

    fn name_node(
        &mut self,
        name: &str,
        category: ResolveCategory,
        type_args: &[String],
        scope: DeclId,
    ) -> Result<NodeIndex> {
        let mut args = Vec::with_capacity(type_args.len());
        for text in type_args {
            let syntax = TypeSyntax::parse(text)?;
            args.push(self.type_node(&syntax, ResolveCategory::Type, scope));
        }
        let name = self.names.intern(name);
        Ok(self.arena.generic_reference(name, args, &[], category, scope))
    }

    /// A type written in an expression: a keyword, or a (qualified)
    /// reference whose last segment has `category`.
    fn type_node(
        &mut self,
        syntax: &TypeSyntax,
        category: ResolveCategory,
        scope: DeclId,
    ) -> NodeIndex {
        if let Some(kind) = syntax.keyword() {
            if syntax.ranks.is_empty() {
                return self.arena.type_keyword(kind, scope);
            }
            // A keyword array is fully known: a typed leaf stands in for it.
            let ty = self.types.array_of_ranks(kind.type_id(), &syntax.ranks);
            return self.arena.literal(ty, scope);
        }

        let args = syntax
            .args
            .iter()
            .map(|arg| self.type_node(arg, ResolveCategory::Type, scope))
            .collect();
        let last = self.names.intern(syntax.last());
        let target = self
            .arena
            .generic_reference(last, args, &syntax.ranks, category, scope);

        let Some((_, qualifier)) = syntax.path.split_last() else {
            return target;
        };
        let mut receiver: Option<NodeIndex> = None;
        for segment in qualifier {
            let name = self.names.intern(segment);
            let node = self
                .arena
                .reference(name, ResolveCategory::Unspecified, scope);
            receiver = Some(match receiver {
                Some(outer) => self.arena.member_access(outer, node),
                None => node,
            });
        }
        match receiver {
            Some(receiver) => self.arena.member_access(receiver, target),
            None => target,
        }
    }
}

#[cfg(test)]
#[path = "tests/project_tests.rs"]
mod tests;
