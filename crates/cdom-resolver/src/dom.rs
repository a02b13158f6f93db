//! The code DOM: an arena of expression nodes whose name uses are
//! reference nodes, resolved or not.
//!
//! Nodes are addressed by `NodeIndex` and never move. Resolution mutates a
//! reference node in place (its `state`), so parents, scope and parse
//! diagnostics survive the switch from unresolved to resolved and back.

use crate::candidates::MatchCandidates;
use crate::category::ResolveCategory;
use crate::diagnostics::ResolveDiagnostic;
use crate::specialize::SpecializedId;
use cdom_common::{Atom, Diagnostic};
use cdom_types::{DeclId, DeclKind, IntrinsicKind, RefKind, TypeId, TypeList};
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One call-site argument with its passing mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub expr: NodeIndex,
    pub ref_kind: RefKind,
}

impl Argument {
    pub fn value(expr: NodeIndex) -> Self {
        Self {
            expr,
            ref_kind: RefKind::Value,
        }
    }

    pub fn by_ref(expr: NodeIndex, ref_kind: RefKind) -> Self {
        Self { expr, ref_kind }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    /// Member name of a user-defined overload of this operator.
    pub const fn overload_name(self) -> &'static str {
        match self {
            Self::Add => "op_Addition",
            Self::Subtract => "op_Subtraction",
            Self::Multiply => "op_Multiply",
            Self::Divide => "op_Division",
            Self::Remainder => "op_Modulus",
            Self::Equal => "op_Equality",
            Self::NotEqual => "op_Inequality",
            Self::Less => "op_LessThan",
            Self::LessEqual => "op_LessThanOrEqual",
            Self::Greater => "op_GreaterThan",
            Self::GreaterEqual => "op_GreaterThanOrEqual",
            Self::LogicalAnd => "op_LogicalAnd",
            Self::LogicalOr => "op_LogicalOr",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => Self::Add,
            "-" => Self::Subtract,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "%" => Self::Remainder,
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "<" => Self::Less,
            "<=" => Self::LessEqual,
            ">" => Self::Greater,
            ">=" => Self::GreaterEqual,
            "&&" => Self::LogicalAnd,
            "||" => Self::LogicalOr,
            _ => return None,
        })
    }

    pub const fn is_equality(self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    pub const fn is_relational(self) -> bool {
        matches!(
            self,
            Self::Less | Self::LessEqual | Self::Greater | Self::GreaterEqual
        )
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }
}

// =============================================================================
// Reference nodes
// =============================================================================

/// A reference bound to one declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedReference {
    /// Category the reference was resolved in, kept for `unresolve`.
    pub category: ResolveCategory,
    pub kind: DeclKind,
    pub target: DeclId,
    /// Explicit or inferred type arguments of the target's generic owner.
    pub type_args: TypeList,
    /// Type of the reference as a value: variable type, return type,
    /// constructed type, or the referenced type itself.
    pub value_type: TypeId,
    pub specialized: Option<SpecializedId>,
}

/// A name use that is not (yet) bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub category: ResolveCategory,
    /// Set while a resolution pass is running on this node.
    pub resolving: bool,
    /// Match state of the last pass; cleared at the start of every pass.
    pub matches: Option<MatchCandidates>,
}

impl UnresolvedReference {
    pub fn new(category: ResolveCategory) -> Self {
        Self {
            category,
            resolving: false,
            matches: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceState {
    Resolved(ResolvedReference),
    Unresolved(UnresolvedReference),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceNode {
    pub name: Atom,
    /// Explicit type-argument expressions (`f<int>`), themselves references
    /// or type keywords.
    pub type_args: Vec<NodeIndex>,
    /// Array ranks applied to a type reference, outermost first.
    pub array_ranks: SmallVec<[u32; 2]>,
    pub state: ReferenceState,
}

impl ReferenceNode {
    pub fn unresolved(name: Atom, category: ResolveCategory) -> Self {
        Self {
            name,
            type_args: Vec::new(),
            array_ranks: SmallVec::new(),
            state: ReferenceState::Unresolved(UnresolvedReference::new(category)),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, ReferenceState::Resolved(_))
    }

    pub fn category(&self) -> ResolveCategory {
        match &self.state {
            ReferenceState::Resolved(r) => r.category,
            ReferenceState::Unresolved(u) => u.category,
        }
    }

    pub fn as_resolved(&self) -> Option<&ResolvedReference> {
        match &self.state {
            ReferenceState::Resolved(r) => Some(r),
            ReferenceState::Unresolved(_) => None,
        }
    }

    pub fn as_unresolved(&self) -> Option<&UnresolvedReference> {
        match &self.state {
            ReferenceState::Unresolved(u) => Some(u),
            ReferenceState::Resolved(_) => None,
        }
    }

    pub fn as_unresolved_mut(&mut self) -> Option<&mut UnresolvedReference> {
        match &mut self.state {
            ReferenceState::Unresolved(u) => Some(u),
            ReferenceState::Resolved(_) => None,
        }
    }

    /// Match state of an unresolved reference after a pass.
    pub fn matches(&self) -> Option<&MatchCandidates> {
        self.as_unresolved().and_then(|u| u.matches.as_ref())
    }

    pub fn target(&self) -> Option<DeclId> {
        self.as_resolved().map(|r| r.target)
    }
}

// =============================================================================
// Nodes
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A literal of a known type (`1`, `"s"`, `null`).
    Literal(TypeId),
    /// A built-in type keyword in type position (`int`, `string`).
    TypeKeyword(IntrinsicKind),
    /// `this`
    This,
    Reference(ReferenceNode),
    /// `receiver.member`; `member` is a reference node.
    MemberAccess {
        receiver: NodeIndex,
        member: NodeIndex,
    },
    /// `callee(args)`; `callee` is a method reference or a member access.
    Call {
        callee: NodeIndex,
        args: Vec<Argument>,
    },
    /// `new target(args)`; `target` is a constructor-category reference.
    New {
        target: NodeIndex,
        args: Vec<Argument>,
    },
    /// `target[args]`; `indexer` is an indexer-category reference.
    Index {
        target: NodeIndex,
        indexer: NodeIndex,
        args: Vec<Argument>,
    },
    /// `left op right`; `overload` is an operator-category reference.
    Binary {
        op: BinaryOp,
        left: NodeIndex,
        right: NodeIndex,
        overload: NodeIndex,
    },
    /// `[target(args)]`
    Attribute {
        target: NodeIndex,
        args: Vec<Argument>,
    },
}

impl NodeKind {
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out = SmallVec::new();
        match self {
            NodeKind::Literal(_) | NodeKind::TypeKeyword(_) | NodeKind::This => {}
            NodeKind::Reference(r) => out.extend(r.type_args.iter().copied()),
            NodeKind::MemberAccess { receiver, member } => {
                out.push(*receiver);
                out.push(*member);
            }
            NodeKind::Call { callee: head, args }
            | NodeKind::New { target: head, args }
            | NodeKind::Attribute { target: head, args } => {
                out.push(*head);
                out.extend(args.iter().map(|a| a.expr));
            }
            NodeKind::Index {
                target,
                indexer,
                args,
            } => {
                out.push(*target);
                out.push(*indexer);
                out.extend(args.iter().map(|a| a.expr));
            }
            NodeKind::Binary {
                left,
                right,
                overload,
                ..
            } => {
                out.push(*left);
                out.push(*right);
                out.push(*overload);
            }
        }
        out
    }
}

/// Where a diagnostic attached to a node came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeDiagnostic {
    /// Produced by the tree builder; survives re-resolution.
    Parse(Diagnostic),
    /// Produced by the last resolution pass; cleared by the next one.
    Resolution(ResolveDiagnostic),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeIndex>,
    /// Innermost declaration enclosing the node (method, type, namespace).
    pub scope: DeclId,
    pub diagnostics: Vec<NodeDiagnostic>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomError {
    InvalidNode(NodeIndex),
    NotAReference(NodeIndex),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::InvalidNode(idx) => write!(f, "node {idx} does not exist"),
            DomError::NotAReference(idx) => write!(f, "node {idx} is not a reference"),
        }
    }
}

impl std::error::Error for DomError {}

// =============================================================================
// NodeArena
// =============================================================================

/// Owner of every node of one code DOM.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    /// Initializer expressions of implicitly typed locals.
    initializers: FxHashMap<DeclId, NodeIndex>,
    roots: Vec<NodeIndex>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node, making it the parent of its children.
    pub fn add(&mut self, kind: NodeKind, scope: DeclId) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.index()) {
                node.parent = Some(idx);
            }
        }
        self.nodes.push(Node {
            kind,
            parent: None,
            scope,
            diagnostics: Vec::new(),
        });
        idx
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.index())
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(idx.index())
    }

    pub fn kind(&self, idx: NodeIndex) -> Option<&NodeKind> {
        self.get(idx).map(|n| &n.kind)
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.get(idx).and_then(|n| n.parent)
    }

    pub fn scope(&self, idx: NodeIndex) -> Option<DeclId> {
        self.get(idx).map(|n| n.scope)
    }

    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.nodes.len() as u32).map(NodeIndex)
    }

    // -------------------------------------------------------------------------
    // Construction helpers
    // -------------------------------------------------------------------------

    pub fn literal(&mut self, ty: TypeId, scope: DeclId) -> NodeIndex {
        self.add(NodeKind::Literal(ty), scope)
    }

    pub fn type_keyword(&mut self, kind: IntrinsicKind, scope: DeclId) -> NodeIndex {
        self.add(NodeKind::TypeKeyword(kind), scope)
    }

    pub fn this(&mut self, scope: DeclId) -> NodeIndex {
        self.add(NodeKind::This, scope)
    }

    pub fn reference(&mut self, name: Atom, category: ResolveCategory, scope: DeclId) -> NodeIndex {
        self.add(
            NodeKind::Reference(ReferenceNode::unresolved(name, category)),
            scope,
        )
    }

    /// A reference with explicit type arguments and array ranks.
    pub fn generic_reference(
        &mut self,
        name: Atom,
        type_args: Vec<NodeIndex>,
        array_ranks: &[u32],
        category: ResolveCategory,
        scope: DeclId,
    ) -> NodeIndex {
        let mut node = ReferenceNode::unresolved(name, category);
        node.type_args = type_args;
        node.array_ranks = array_ranks.iter().copied().collect();
        self.add(NodeKind::Reference(node), scope)
    }

    pub fn member_access(&mut self, receiver: NodeIndex, member: NodeIndex) -> NodeIndex {
        let scope = self.scope_or_global(member);
        self.add(NodeKind::MemberAccess { receiver, member }, scope)
    }

    pub fn call(&mut self, callee: NodeIndex, args: Vec<Argument>) -> NodeIndex {
        let scope = self.scope_or_global(callee);
        self.add(NodeKind::Call { callee, args }, scope)
    }

    pub fn new_object(&mut self, target: NodeIndex, args: Vec<Argument>) -> NodeIndex {
        let scope = self.scope_or_global(target);
        self.add(NodeKind::New { target, args }, scope)
    }

    pub fn index(
        &mut self,
        target: NodeIndex,
        indexer: NodeIndex,
        args: Vec<Argument>,
    ) -> NodeIndex {
        let scope = self.scope_or_global(target);
        self.add(
            NodeKind::Index {
                target,
                indexer,
                args,
            },
            scope,
        )
    }

    pub fn binary(
        &mut self,
        op: BinaryOp,
        left: NodeIndex,
        right: NodeIndex,
        overload: NodeIndex,
    ) -> NodeIndex {
        let scope = self.scope_or_global(left);
        self.add(
            NodeKind::Binary {
                op,
                left,
                right,
                overload,
            },
            scope,
        )
    }

    pub fn attribute(&mut self, target: NodeIndex, args: Vec<Argument>) -> NodeIndex {
        let scope = self.scope_or_global(target);
        self.add(NodeKind::Attribute { target, args }, scope)
    }

    fn scope_or_global(&self, idx: NodeIndex) -> DeclId {
        self.scope(idx).unwrap_or(DeclId(0))
    }

    /// Record the initializer of an implicitly typed local.
    pub fn set_initializer(&mut self, local: DeclId, expr: NodeIndex) {
        self.initializers.insert(local, expr);
    }

    pub fn initializer(&self, local: DeclId) -> Option<NodeIndex> {
        self.initializers.get(&local).copied()
    }

    /// Mark a top-level expression for whole-tree passes.
    pub fn add_root(&mut self, idx: NodeIndex) {
        self.roots.push(idx);
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    // -------------------------------------------------------------------------
    // Reference access
    // -------------------------------------------------------------------------

    pub fn reference_node(&self, idx: NodeIndex) -> Option<&ReferenceNode> {
        match self.kind(idx)? {
            NodeKind::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn reference_node_mut(&mut self, idx: NodeIndex) -> Option<&mut ReferenceNode> {
        match &mut self.get_mut(idx)?.kind {
            NodeKind::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub(crate) fn expect_reference(&self, idx: NodeIndex) -> Result<&ReferenceNode, DomError> {
        match self.kind(idx) {
            Some(NodeKind::Reference(r)) => Ok(r),
            Some(_) => Err(DomError::NotAReference(idx)),
            None => Err(DomError::InvalidNode(idx)),
        }
    }

    pub(crate) fn expect_reference_mut(
        &mut self,
        idx: NodeIndex,
    ) -> Result<&mut ReferenceNode, DomError> {
        match self.get_mut(idx).map(|n| &mut n.kind) {
            Some(NodeKind::Reference(r)) => Ok(r),
            Some(_) => Err(DomError::NotAReference(idx)),
            None => Err(DomError::InvalidNode(idx)),
        }
    }

    /// Every reference node, in creation order.
    pub fn references(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n.kind, NodeKind::Reference(_)))
            .map(|(i, _)| NodeIndex(i as u32))
    }

    /// Turn a reference back into an unresolved one so an edited tree can be
    /// resolved again. Match state and resolution diagnostics are dropped.
    pub fn unresolve(&mut self, idx: NodeIndex) -> Result<(), DomError> {
        let reference = self.expect_reference_mut(idx)?;
        let category = reference.category();
        reference.state = ReferenceState::Unresolved(UnresolvedReference::new(category));
        self.clear_resolution_diagnostics(idx);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    pub fn attach_parse_diagnostic(&mut self, idx: NodeIndex, diagnostic: Diagnostic) {
        if let Some(node) = self.get_mut(idx) {
            node.diagnostics.push(NodeDiagnostic::Parse(diagnostic));
        }
    }

    pub(crate) fn attach_resolution_diagnostic(
        &mut self,
        idx: NodeIndex,
        diagnostic: ResolveDiagnostic,
    ) {
        if let Some(node) = self.get_mut(idx) {
            node.diagnostics.push(NodeDiagnostic::Resolution(diagnostic));
        }
    }

    pub fn clear_resolution_diagnostics(&mut self, idx: NodeIndex) {
        if let Some(node) = self.get_mut(idx) {
            node.diagnostics
                .retain(|d| !matches!(d, NodeDiagnostic::Resolution(_)));
        }
    }

    pub fn resolution_diagnostics(
        &self,
        idx: NodeIndex,
    ) -> impl Iterator<Item = &ResolveDiagnostic> {
        self.get(idx)
            .into_iter()
            .flat_map(|n| n.diagnostics.iter())
            .filter_map(|d| match d {
                NodeDiagnostic::Resolution(r) => Some(r),
                NodeDiagnostic::Parse(_) => None,
            })
    }

    pub fn parse_diagnostics(&self, idx: NodeIndex) -> impl Iterator<Item = &Diagnostic> {
        self.get(idx)
            .into_iter()
            .flat_map(|n| n.diagnostics.iter())
            .filter_map(|d| match d {
                NodeDiagnostic::Parse(p) => Some(p),
                NodeDiagnostic::Resolution(_) => None,
            })
    }
}

#[cfg(test)]
#[path = "../tests/dom_tests.rs"]
mod tests;
