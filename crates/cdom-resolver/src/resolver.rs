//! Resolver orchestration.
//!
//! One pass over an unresolved reference runs
//! `Idle -> Resolving -> {Resolved | kept unresolved}`:
//!
//! 1. The `resolving` flag is checked and set; a nested attempt on the same
//!    node is a silent no-op.
//! 2. Match state and resolution diagnostics of the previous pass are cleared.
//! 3. Explicit type arguments, receiver and argument expressions are
//!    evaluated (resolving them on demand).
//! 4. The provider returns every same-named candidate, nearest scope first.
//! 5. Candidates are scored and accumulated depth by depth; the first depth
//!    that yields a complete match ends the walk.
//! 6. A single complete match rewrites the node in place; anything else
//!    leaves it unresolved with its matches and one diagnostic attached.

use crate::candidates::{MatchCandidate, MatchCandidates, MatchTier};
use crate::category::ResolveCategory;
use crate::classify::{CallSite, MatchClassifier, StaticMode};
use crate::diagnostics::{ResolveDiagnostic, ResolveErrorKind};
use crate::dom::{
    Argument, DomError, NodeArena, NodeIndex, NodeKind, ReferenceState, ResolvedReference,
};
use crate::options::ResolverOptions;
use crate::params::ArgInfo;
use crate::provider::{Candidate, CandidateProvider, LookupBase, LookupRequest};
use crate::specialize::Specializer;
use cdom_common::{Atom, DiagnosticCategory};
use cdom_types::{
    CycleGuard, DeclId, DeclKind, DeclarationStore, DepthCounter, TypeId, TypeInterner, TypeList,
    TypeRelation, contains_unresolved, instantiate_type,
};
use rustc_hash::FxHashSet;
use serde::Serialize;
use smallvec::SmallVec;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Outcome of one `resolve_node` call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(DeclId),
    /// A bare name of one or more methods; left for the invocation to pick.
    MethodGroup,
    /// An operator or element access with built-in semantics for its operands.
    Intrinsic,
    Unresolved,
    /// The node was already being resolved; its state is untouched.
    Reentrant,
}

/// Counts over every reference of an arena after `resolve_all`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionSummary {
    pub references: usize,
    pub resolved: usize,
    pub method_groups: usize,
    pub intrinsic: usize,
    pub unresolved: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ResolutionSummary {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Where a reference looks and what its candidates are matched against.
struct SiteContext {
    base: LookupBase,
    site: CallSite,
    /// The receiver or an operand is unresolved; no lookup can succeed.
    blocked: bool,
    /// Result type of the built-in operator or element access, if any.
    builtin: Option<TypeId>,
}

/// How a member access reaches its member.
enum Receiver {
    Namespace(DeclId),
    Type(TypeId),
    Value(TypeId),
    Unresolved,
}

pub struct Resolver<'a> {
    pub(crate) types: &'a TypeInterner,
    pub(crate) decls: &'a DeclarationStore,
    provider: &'a dyn CandidateProvider,
    options: ResolverOptions,
    specializer: Option<&'a mut dyn Specializer>,
    depth: DepthCounter,
    /// Implicitly typed locals whose initializer is being evaluated.
    initializer_guard: CycleGuard<DeclId>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        types: &'a TypeInterner,
        decls: &'a DeclarationStore,
        provider: &'a dyn CandidateProvider,
        options: ResolverOptions,
    ) -> Self {
        let max_depth = options.max_resolution_depth;
        Self {
            types,
            decls,
            provider,
            options,
            specializer: None,
            depth: DepthCounter::new(max_depth),
            initializer_guard: CycleGuard::new(max_depth),
        }
    }

    #[must_use]
    pub fn with_specializer(mut self, specializer: &'a mut dyn Specializer) -> Self {
        self.specializer = Some(specializer);
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Resolve every reference of the arena, inner expressions first.
    pub fn resolve_all(&mut self, arena: &mut NodeArena) -> Result<ResolutionSummary, DomError> {
        let references: Vec<NodeIndex> = arena.references().collect();
        for &idx in &references {
            self.resolve_node(arena, idx)?;
        }

        let mut summary = ResolutionSummary {
            references: references.len(),
            ..ResolutionSummary::default()
        };
        for &idx in &references {
            let reference = arena.expect_reference(idx)?;
            let mut diagnosed = false;
            for diagnostic in arena.resolution_diagnostics(idx) {
                diagnosed = true;
                match diagnostic.severity {
                    DiagnosticCategory::Error => summary.errors += 1,
                    DiagnosticCategory::Warning => summary.warnings += 1,
                    _ => {}
                }
            }
            match reference.matches() {
                _ if reference.is_resolved() => summary.resolved += 1,
                Some(m) if m.is_method_group() && m.has_complete_match() => {
                    summary.method_groups += 1;
                }
                _ if !diagnosed
                    && matches!(
                        reference.category(),
                        ResolveCategory::Indexer | ResolveCategory::OperatorOverload
                    ) =>
                {
                    summary.intrinsic += 1;
                }
                _ => summary.unresolved += 1,
            }
        }
        debug!(
            references = summary.references,
            resolved = summary.resolved,
            errors = summary.errors,
            warnings = summary.warnings,
            "resolution pass finished"
        );
        Ok(summary)
    }

    /// Resolve one reference node.
    ///
    /// Resolved nodes are returned as they are; a node already being
    /// resolved further up the stack is left untouched.
    pub fn resolve_node(
        &mut self,
        arena: &mut NodeArena,
        idx: NodeIndex,
    ) -> Result<Resolution, DomError> {
        let reference = arena.expect_reference_mut(idx)?;
        let state = match &mut reference.state {
            ReferenceState::Resolved(resolved) => return Ok(Resolution::Resolved(resolved.target)),
            ReferenceState::Unresolved(state) => state,
        };
        if state.resolving {
            trace!(node = %idx, "reentrant resolution skipped");
            return Ok(Resolution::Reentrant);
        }
        if !self.depth.enter() {
            debug!(node = %idx, depth = self.depth.depth(), "resolution depth limit reached");
            return Ok(Resolution::Unresolved);
        }
        state.resolving = true;
        state.matches = None;
        arena.clear_resolution_diagnostics(idx);

        let outcome = self.resolve_unresolved(arena, idx);

        if let Some(state) = arena
            .reference_node_mut(idx)
            .and_then(|r| r.as_unresolved_mut())
        {
            state.resolving = false;
        }
        self.depth.leave();
        outcome
    }

    // =========================================================================
    // One pass
    // =========================================================================

    fn resolve_unresolved(
        &mut self,
        arena: &mut NodeArena,
        idx: NodeIndex,
    ) -> Result<Resolution, DomError> {
        let reference = arena.expect_reference(idx)?;
        let name = reference.name;
        let category = reference.category();
        let type_arg_nodes = reference.type_args.clone();
        let ranks = reference.array_ranks.clone();

        let explicit_type_args = if type_arg_nodes.is_empty() {
            None
        } else {
            let mut args = TypeList::new();
            for node in type_arg_nodes {
                args.push(self.evaluate_expr(arena, node)?);
            }
            Some(args)
        };

        let context = self.site_context(arena, idx, category, explicit_type_args)?;
        if context.blocked {
            debug!(node = %idx, "receiver or operand unresolved, lookup skipped");
            let diagnostic =
                ResolveDiagnostic::new(ResolveErrorKind::UnresolvedCause, name, category)
                    .with_severity(self.cascade_severity());
            self.keep_unresolved(arena, idx, MatchCandidates::new(category), Some(diagnostic))?;
            return Ok(Resolution::Unresolved);
        }

        let request = LookupRequest {
            name,
            base: context.base.clone(),
            category,
        };
        let found = self.provider.lookup(&request);
        let mut matches = self.accumulate(&found, &context.site);
        trace!(
            node = %idx,
            found = found.len(),
            tier = ?matches.tier(),
            kept = matches.len(),
            "candidates accumulated"
        );

        if context.builtin.is_some() && !matches.has_complete_match() {
            self.keep_unresolved(arena, idx, matches, None)?;
            return Ok(Resolution::Intrinsic);
        }

        if matches.has_complete_match() {
            if matches.is_method_group() {
                self.keep_unresolved(arena, idx, matches, None)?;
                return Ok(Resolution::MethodGroup);
            }
            if matches.len() > 1 && self.options.prefer_better_conversions {
                narrow_to_best(&mut matches);
            }
            if let [candidate] = matches.iter().as_slice() {
                let candidate = candidate.clone();
                let resolved =
                    self.resolved_reference(arena, &candidate, &context.site, name, &ranks)?;
                debug!(node = %idx, target = candidate.target.0, "reference resolved");
                arena.expect_reference_mut(idx)?.state = ReferenceState::Resolved(resolved);
                return Ok(Resolution::Resolved(candidate.target));
            }
        }

        let diagnostic = self.diagnose(name, category, &matches);
        debug!(node = %idx, kind = ?diagnostic.kind, "reference left unresolved");
        self.keep_unresolved(arena, idx, matches, Some(diagnostic))?;
        Ok(Resolution::Unresolved)
    }

    /// Score candidates depth by depth, stopping after the first depth that
    /// holds a complete match.
    fn accumulate(&self, found: &[Candidate], site: &CallSite) -> MatchCandidates {
        let classifier = MatchClassifier::new(self.types, self.decls);
        let mut matches = MatchCandidates::new(site.category).with_receiver(site.receiver);
        for group in found.chunk_by(|a, b| a.depth == b.depth) {
            for found in group {
                if let Some(scored) = classifier.classify(found.decl, site) {
                    matches.add_match(scored.at_depth(found.depth));
                }
            }
            if matches.has_complete_match() {
                trace!(depth = group[0].depth, "complete match, farther scopes skipped");
                break;
            }
        }
        matches
    }

    fn keep_unresolved(
        &self,
        arena: &mut NodeArena,
        idx: NodeIndex,
        matches: MatchCandidates,
        diagnostic: Option<ResolveDiagnostic>,
    ) -> Result<(), DomError> {
        if let Some(state) = arena.expect_reference_mut(idx)?.as_unresolved_mut() {
            state.matches = Some(matches);
        }
        if let Some(diagnostic) = diagnostic {
            arena.attach_resolution_diagnostic(idx, diagnostic);
        }
        Ok(())
    }

    fn cascade_severity(&self) -> DiagnosticCategory {
        if self.options.suppress_cascading_errors {
            DiagnosticCategory::Warning
        } else {
            DiagnosticCategory::Error
        }
    }

    fn diagnose(
        &self,
        name: Atom,
        category: ResolveCategory,
        matches: &MatchCandidates,
    ) -> ResolveDiagnostic {
        let tier = matches.tier();
        let kind = match tier {
            None => ResolveErrorKind::UnknownName,
            Some(MatchTier::Complete) => ResolveErrorKind::AmbiguousMatch,
            Some(MatchTier::Category) if matches.has_unresolved_cause() => {
                ResolveErrorKind::UnresolvedCause
            }
            Some(MatchTier::Category) => ResolveErrorKind::SignatureMismatch,
            Some(MatchTier::NameOnly) => ResolveErrorKind::InvalidCategory,
        };
        let severity = if kind == ResolveErrorKind::UnresolvedCause {
            self.cascade_severity()
        } else {
            DiagnosticCategory::Error
        };
        let reason = matches.first().and_then(|c| c.failure.clone());
        ResolveDiagnostic::new(kind, name, category)
            .with_severity(severity)
            .with_matches(tier, matches.targets(), reason)
    }

    // =========================================================================
    // Call site
    // =========================================================================

    fn site_context(
        &mut self,
        arena: &mut NodeArena,
        idx: NodeIndex,
        category: ResolveCategory,
        explicit_type_args: Option<TypeList>,
    ) -> Result<SiteContext, DomError> {
        let scope = arena.scope(idx).ok_or(DomError::InvalidNode(idx))?;
        let mut site = CallSite::new(category);
        if let Some(args) = explicit_type_args {
            site = site.with_type_args(args);
        }
        let mut blocked = false;
        let mut builtin = None;

        let parent = arena.parent(idx);
        let parent_kind = parent.and_then(|p| arena.kind(p)).cloned();
        // The node whose parent supplies the argument list.
        let mut head = idx;

        let base = match (parent, parent_kind) {
            (Some(access), Some(NodeKind::MemberAccess { receiver, member })) if member == idx => {
                head = access;
                match self.receiver_of(arena, receiver)? {
                    Receiver::Namespace(ns) => LookupBase::Namespace(ns),
                    Receiver::Type(ty) => {
                        site = site.with_static_mode(StaticMode::StaticOnly).with_receiver(ty);
                        LookupBase::Members(ty)
                    }
                    Receiver::Value(ty) => {
                        site = site.with_static_mode(StaticMode::InstanceOnly).with_receiver(ty);
                        LookupBase::Members(ty)
                    }
                    Receiver::Unresolved => {
                        blocked = true;
                        LookupBase::Scope(scope)
                    }
                }
            }
            (_, Some(NodeKind::Index { target, indexer, args })) if indexer == idx => {
                let ty = self.evaluate_expr(arena, target)?;
                blocked = self.is_unresolved_type(ty);
                builtin = self.builtin_index(ty);
                site = site
                    .with_static_mode(StaticMode::InstanceOnly)
                    .with_receiver(ty)
                    .with_args(self.evaluate_args(arena, &args)?);
                LookupBase::Members(ty)
            }
            (_, Some(NodeKind::Binary { op, left, right, overload })) if overload == idx => {
                let left = self.evaluate_expr(arena, left)?;
                let right = self.evaluate_expr(arena, right)?;
                blocked = self.is_unresolved_type(left) || self.is_unresolved_type(right);
                builtin = self.builtin_binary(op, left, right);
                site = site.with_args(vec![ArgInfo::value(left), ArgInfo::value(right)]);
                let mut operands = SmallVec::new();
                operands.push(left);
                if right != left {
                    operands.push(right);
                }
                LookupBase::Operands(operands)
            }
            _ => {
                let (enclosing, in_static) = self.enclosing_context(scope);
                if let Some(ty) = enclosing {
                    site = site.with_receiver(ty);
                }
                if in_static {
                    site = site.with_static_mode(StaticMode::StaticOnly);
                }
                LookupBase::Scope(scope)
            }
        };

        if site.args.is_none() {
            let args = match arena.parent(head).and_then(|p| arena.kind(p)) {
                Some(NodeKind::Call { callee, args }) if *callee == head => Some(args.clone()),
                Some(NodeKind::New { target, args }) if *target == head => Some(args.clone()),
                Some(NodeKind::Attribute { target, args }) if *target == head => Some(args.clone()),
                _ => None,
            };
            if let Some(args) = args {
                site = site.with_args(self.evaluate_args(arena, &args)?);
            }
        }

        Ok(SiteContext {
            base,
            site,
            blocked,
            builtin,
        })
    }

    fn evaluate_args(
        &mut self,
        arena: &mut NodeArena,
        args: &[Argument],
    ) -> Result<Vec<ArgInfo>, DomError> {
        args.iter()
            .map(|arg| {
                Ok(ArgInfo {
                    ty: self.evaluate_expr(arena, arg.expr)?,
                    ref_kind: arg.ref_kind,
                })
            })
            .collect()
    }

    fn receiver_of(
        &mut self,
        arena: &mut NodeArena,
        receiver: NodeIndex,
    ) -> Result<Receiver, DomError> {
        let Some(reference) = reference_of(arena, receiver) else {
            let ty = self.evaluate_expr(arena, receiver)?;
            return Ok(self.value_receiver(ty));
        };
        self.resolve_node(arena, reference)?;
        let node = arena.expect_reference(reference)?;
        if let Some(resolved) = node.as_resolved() {
            return Ok(match resolved.kind {
                DeclKind::Namespace => Receiver::Namespace(resolved.target),
                kind if kind.is_type() => Receiver::Type(resolved.value_type),
                _ => self.value_receiver(resolved.value_type),
            });
        }
        let ty = self.evaluate_type(arena, reference, false)?;
        Ok(self.value_receiver(ty))
    }

    fn value_receiver(&self, ty: TypeId) -> Receiver {
        if self.is_unresolved_type(ty) {
            Receiver::Unresolved
        } else {
            Receiver::Value(ty)
        }
    }

    /// The enclosing type of a scope, and whether the innermost member on
    /// the way there is static.
    fn enclosing_context(&self, scope: DeclId) -> (Option<TypeId>, bool) {
        let mut in_static = false;
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(decl) = self.decls.get(id) else {
                break;
            };
            if decl.kind.is_type() {
                return (Some(self.types.declared(id)), in_static);
            }
            if matches!(
                decl.kind,
                DeclKind::Method
                    | DeclKind::Constructor
                    | DeclKind::Property
                    | DeclKind::Indexer
                    | DeclKind::Operator
                    | DeclKind::Field
            ) && decl.is_static()
            {
                in_static = true;
            }
            current = decl.parent;
        }
        (None, in_static)
    }

    pub(crate) fn is_unresolved_type(&self, ty: TypeId) -> bool {
        contains_unresolved(self.types, ty)
    }

    // =========================================================================
    // Resolved references
    // =========================================================================

    fn resolved_reference(
        &mut self,
        arena: &mut NodeArena,
        candidate: &MatchCandidate,
        site: &CallSite,
        name: Atom,
        ranks: &[u32],
    ) -> Result<ResolvedReference, DomError> {
        let kind = self.decls.kind(candidate.target).unwrap_or(DeclKind::Local);
        let value_type = self.value_type(arena, candidate, site, name, ranks)?;
        let type_args = candidate.inferred_type_arguments.clone();
        let specialized = match self.specializer.as_deref_mut() {
            Some(specializer) if !type_args.is_empty() => {
                Some(specializer.specialize(candidate.target, &type_args))
            }
            _ => None,
        };
        Ok(ResolvedReference {
            category: site.category,
            kind,
            target: candidate.target,
            type_args,
            value_type,
            specialized,
        })
    }

    /// Variable type, return type, constructed type or the type itself,
    /// with receiver-bound and explicit or inferred type arguments applied.
    fn value_type(
        &mut self,
        arena: &mut NodeArena,
        candidate: &MatchCandidate,
        site: &CallSite,
        name: Atom,
        ranks: &[u32],
    ) -> Result<TypeId, DomError> {
        let types = self.types;
        let decls = self.decls;
        let Some(decl) = decls.get(candidate.target) else {
            return Ok(types.unresolved(name));
        };
        let args = &candidate.inferred_type_arguments;
        let classifier = MatchClassifier::new(types, decls);
        let mut subst = classifier.receiver_substitution(candidate.target, site.receiver);
        let owner = if decl.kind == DeclKind::Constructor {
            decl.parent
        } else {
            Some(candidate.target)
        };
        if let Some(owner) = owner
            && !args.is_empty()
        {
            subst.bind_owner(owner, args);
        }

        let ty = match decl.kind {
            DeclKind::Namespace => TypeId::UNDETERMINED,
            kind if kind.is_type() => {
                types.array_of_ranks(types.application(candidate.target, args), ranks)
            }
            DeclKind::Constructor => decl
                .parent
                .map_or(TypeId::UNDETERMINED, |parent| types.application(parent, args)),
            DeclKind::EnumMember => decl
                .ty
                .or_else(|| decl.parent.map(|p| types.declared(p)))
                .unwrap_or(TypeId::UNDETERMINED),
            DeclKind::Local if decl.ty.is_none() => {
                self.implicit_local_type(arena, candidate.target, name)?
            }
            kind if kind.is_variable() => decl
                .ty
                .map_or(TypeId::UNDETERMINED, |ty| instantiate_type(types, ty, &subst)),
            _ => instantiate_type(types, decl.ty.unwrap_or(TypeId::VOID), &subst),
        };

        // Invoking a delegate-typed variable yields the delegate's result.
        if site.category == ResolveCategory::Method && decl.kind.is_variable() {
            let relation = TypeRelation::new(types, decls);
            if let Some(signature) = relation.delegate_signature(ty) {
                return Ok(signature.return_type);
            }
        }
        Ok(ty)
    }

    /// Type of an implicitly typed local: its initializer's type, or an
    /// unresolved type when the initializer depends on the local itself.
    fn implicit_local_type(
        &mut self,
        arena: &mut NodeArena,
        local: DeclId,
        name: Atom,
    ) -> Result<TypeId, DomError> {
        let Some(init) = arena.initializer(local) else {
            return Ok(self.types.unresolved(name));
        };
        match self.initializer_guard.enter(local) {
            Ok(()) => {
                let ty = self.evaluate_expr(arena, init);
                self.initializer_guard.leave(local);
                ty
            }
            Err(denied) => {
                debug!(local = local.0, ?denied, "initializer depends on its own local");
                Ok(self.types.unresolved(name))
            }
        }
    }
}

/// The reference node an expression names: itself, or the member of a
/// member access.
pub(crate) fn reference_of(arena: &NodeArena, idx: NodeIndex) -> Option<NodeIndex> {
    match arena.kind(idx)? {
        NodeKind::Reference(_) => Some(idx),
        NodeKind::MemberAccess { member, .. } => Some(*member),
        _ => None,
    }
}

/// Drop every complete match some other match beats.
fn narrow_to_best(matches: &mut MatchCandidates) {
    let losers: FxHashSet<DeclId> = matches
        .iter()
        .filter(|c| matches.iter().any(|o| o.target != c.target && is_better(o, c)))
        .map(|c| c.target)
        .collect();
    if !losers.is_empty() {
        trace!(dropped = losers.len(), "better conversions narrowed the match set");
        matches.retain(|c| !losers.contains(&c.target));
    }
}

/// `a` beats `b` when no argument converts worse and one converts better;
/// with equal conversions, non-expanded beats expanded, then non-generic
/// beats generic.
fn is_better(a: &MatchCandidate, b: &MatchCandidate) -> bool {
    let mut strictly = false;
    for (ca, cb) in a.conversions.iter().zip(&b.conversions) {
        match ca.cmp(cb) {
            Ordering::Less => strictly = true,
            Ordering::Greater => return false,
            Ordering::Equal => {}
        }
    }
    if strictly {
        return true;
    }
    if a.expanded_variadic != b.expanded_variadic {
        return !a.expanded_variadic;
    }
    !a.is_generic() && b.is_generic()
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
