//! Name and overload resolution over a mutable code DOM.
//!
//! A reference node starts unresolved. The [`Resolver`] asks a
//! [`CandidateProvider`] for every visible declaration sharing its name,
//! scores each against the call site with the [`MatchClassifier`] (kind,
//! static mode, generic arity and constraints, then the
//! [`ParameterMatcher`]), and keeps only the best tier in
//! [`MatchCandidates`]. A single complete match rewrites the node in place;
//! anything else leaves it unresolved with its matches and a
//! [`ResolveDiagnostic`] attached, so analysis can continue past it.
//!
//! Unresolved names are a normal state of a partially analyzed tree:
//! failures are data on the node, never `Err`.

pub mod candidates;
pub mod category;
pub mod classify;
pub mod diagnostics;
pub mod dom;
mod evaluate;
pub mod infer;
pub mod options;
pub mod params;
pub mod provider;
pub mod resolver;
pub mod specialize;

pub use candidates::{MatchCandidate, MatchCandidates, MatchTier};
pub use category::ResolveCategory;
pub use classify::{CallSite, MatchClassifier, StaticMode};
pub use diagnostics::{MismatchReason, ResolveDiagnostic, ResolveErrorKind};
pub use dom::{
    Argument, BinaryOp, DomError, Node, NodeArena, NodeDiagnostic, NodeIndex, NodeKind,
    ReferenceNode, ReferenceState, ResolvedReference, UnresolvedReference,
};
pub use infer::{InferenceError, InferenceSlots, Inferencer};
pub use options::ResolverOptions;
pub use params::{ArgInfo, ParameterMatcher, SignatureMatch};
pub use provider::{Candidate, CandidateProvider, LookupBase, LookupRequest, ScopeChainProvider};
pub use resolver::{Resolution, ResolutionSummary, Resolver};
pub use specialize::{SpecializationTable, SpecializedId, Specializer};
