//! The candidate universe: every visible declaration sharing a name.
//!
//! Lookup does not look at signatures. It returns all same-named
//! declarations tagged with the scope depth they were found at, nearest
//! first, and leaves scoring to the classifier.

use crate::category::ResolveCategory;
use cdom_common::{Atom, Interner};
use cdom_types::{DeclId, DeclKind, DeclarationStore, Hierarchy, TypeId, TypeInterner};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::trace;

/// A declaration found by lookup and the scope depth it was found at
/// (0 = innermost).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub decl: DeclId,
    pub depth: u32,
}

/// Where lookup starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupBase {
    /// A simple name: walk the lexical scope chain outwards from a declaration.
    Scope(DeclId),
    /// `Type.Name` or `value.Name`: members of a type and its bases.
    Members(TypeId),
    /// `Namespace.Name`
    Namespace(DeclId),
    /// User-defined operators declared on the operand types.
    Operands(SmallVec<[TypeId; 2]>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupRequest {
    pub name: Atom,
    pub base: LookupBase,
    pub category: ResolveCategory,
}

pub trait CandidateProvider {
    /// Candidates in nearest-scope-first order, each declaration at most once.
    fn lookup(&self, request: &LookupRequest) -> Vec<Candidate>;
}

#[derive(Default)]
struct Collector {
    out: Vec<Candidate>,
    seen: FxHashSet<DeclId>,
}

impl Collector {
    fn push(&mut self, decl: DeclId, depth: u32) -> bool {
        if self.seen.insert(decl) {
            self.out.push(Candidate { decl, depth });
            true
        } else {
            false
        }
    }
}

/// Lookup over the declaration store's lexical nesting, inheritance and
/// namespace imports.
pub struct ScopeChainProvider<'a> {
    types: &'a TypeInterner,
    decls: &'a DeclarationStore,
    names: &'a Interner,
    attribute_suffix: bool,
}

impl<'a> ScopeChainProvider<'a> {
    pub fn new(types: &'a TypeInterner, decls: &'a DeclarationStore, names: &'a Interner) -> Self {
        Self {
            types,
            decls,
            names,
            attribute_suffix: true,
        }
    }

    #[must_use]
    pub fn with_attribute_suffix(mut self, enabled: bool) -> Self {
        self.attribute_suffix = enabled;
        self
    }

    /// The written name plus, for attributes, its `...Attribute` form.
    fn lookup_names(&self, request: &LookupRequest) -> SmallVec<[Atom; 2]> {
        let mut names = SmallVec::new();
        names.push(request.name);
        if request.category == ResolveCategory::Attribute && self.attribute_suffix {
            let written = self.names.resolve(request.name);
            if !written.ends_with("Attribute")
                && let Some(long) = self.names.lookup(&format!("{written}Attribute"))
            {
                names.push(long);
            }
        }
        names
    }

    /// Same-named members of one container, expanded for the category.
    /// Returns whether anything new was added.
    fn collect_members(
        &self,
        out: &mut Collector,
        container: DeclId,
        names: &[Atom],
        category: ResolveCategory,
        depth: u32,
    ) -> bool {
        let Some(decl) = self.decls.get(container) else {
            return false;
        };
        let mut added = false;
        if category == ResolveCategory::Indexer {
            for indexer in self.decls.indexers_of(container) {
                added |= out.push(indexer, depth);
            }
            return added;
        }
        for &name in names {
            for &member in decl.members_named(name) {
                for expanded in self.expand(member, category) {
                    added |= out.push(expanded, depth);
                }
            }
        }
        added
    }

    /// A type named in constructor or attribute position stands for its
    /// constructors; without declared ones it stands for itself.
    fn expand(&self, decl: DeclId, category: ResolveCategory) -> SmallVec<[DeclId; 4]> {
        let constructs = matches!(
            category,
            ResolveCategory::Constructor | ResolveCategory::Attribute
        );
        if constructs
            && matches!(
                self.decls.kind(decl),
                Some(DeclKind::Class | DeclKind::Struct)
            )
        {
            let ctors = self.decls.constructors_of(decl);
            if !ctors.is_empty() {
                return ctors.into_iter().collect();
            }
        }
        smallvec::smallvec![decl]
    }

    /// Members of a type (depth `start`) then of each inheritance level.
    /// Returns the next free depth.
    fn collect_type_chain(
        &self,
        out: &mut Collector,
        ty: TypeId,
        names: &[Atom],
        category: ResolveCategory,
        start: u32,
    ) -> u32 {
        let mut depth = start;
        if let Some(decl) = self.types.named_decl(ty) {
            self.collect_members(out, decl, names, category, depth);
        }
        depth += 1;
        let hierarchy = Hierarchy::new(self.types, self.decls);
        for level in hierarchy.ancestor_levels(ty) {
            for base in level {
                if let Some(base_decl) = self.types.named_decl(base) {
                    self.collect_members(out, base_decl, names, category, depth);
                }
            }
            depth += 1;
        }
        depth
    }

    /// Types whose members a receiver of type `ty` exposes. A type
    /// parameter exposes the members of its constraints.
    fn receiver_types(&self, ty: TypeId) -> SmallVec<[TypeId; 2]> {
        if let Some(param) = self.types.type_param_ref(ty) {
            return self
                .decls
                .get(param.owner)
                .and_then(|d| d.type_params.get(param.index as usize))
                .map(|tp| tp.constraints.iter().copied().collect())
                .unwrap_or_default();
        }
        smallvec::smallvec![ty]
    }

    fn lookup_scope(
        &self,
        out: &mut Collector,
        scope: DeclId,
        names: &[Atom],
        category: ResolveCategory,
    ) {
        let mut chain = vec![scope];
        chain.extend(self.decls.ancestors(scope));

        let mut depth = 0;
        for container in chain {
            let Some(decl) = self.decls.get(container) else {
                continue;
            };
            if decl.kind.is_type() {
                let ty = self.types.declared(container);
                depth = self.collect_type_chain(out, ty, names, category, depth);
            } else if decl.kind == DeclKind::Namespace {
                self.collect_members(out, container, names, category, depth);
                depth += 1;
                if !decl.imports.is_empty() {
                    for &import in &decl.imports {
                        self.collect_members(out, import, names, category, depth);
                    }
                    depth += 1;
                }
            } else {
                // Locals and parameters of a member body.
                self.collect_members(out, container, names, category, depth);
                depth += 1;
            }
        }
    }
}

impl CandidateProvider for ScopeChainProvider<'_> {
    fn lookup(&self, request: &LookupRequest) -> Vec<Candidate> {
        let names = self.lookup_names(request);
        let mut out = Collector::default();
        match &request.base {
            LookupBase::Scope(scope) => {
                self.lookup_scope(&mut out, *scope, &names, request.category);
            }
            LookupBase::Namespace(ns) => {
                self.collect_members(&mut out, *ns, &names, request.category, 0);
            }
            LookupBase::Members(ty) => {
                for receiver in self.receiver_types(*ty) {
                    self.collect_type_chain(&mut out, receiver, &names, request.category, 0);
                }
            }
            LookupBase::Operands(operands) => {
                for &operand in operands {
                    self.collect_type_chain(&mut out, operand, &names, request.category, 0);
                }
            }
        }
        out.out.sort_by_key(|c| c.depth);
        trace!(
            name = request.name.0,
            found = out.out.len(),
            "candidate lookup"
        );
        out.out
    }
}

#[cfg(test)]
#[path = "../tests/provider_tests.rs"]
mod tests;
