//! Resolution diagnostics recorded on unresolved reference nodes.
//!
//! Failures are data: an unresolved name is an expected, recoverable state
//! of a partially analysed tree, so nothing here is ever returned as `Err`.
//! Front ends turn these records into text with
//! `cdom_common::diagnostics::format_message`.

use crate::candidates::MatchTier;
use crate::category::ResolveCategory;
use cdom_common::{Atom, DiagnosticCategory, diagnostic_codes};
use cdom_types::{DeclId, DeclKind, RefKind, TypeId};

/// Why a reference failed to resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolveErrorKind {
    /// No candidate shares the name in any visible scope.
    UnknownName,
    /// More than one complete, non-method-group match survived.
    AmbiguousMatch,
    /// Right kind of entity, wrong arity/types/static mode.
    SignatureMismatch,
    /// A signature mismatch traced back to an unresolved argument.
    UnresolvedCause,
    /// Only entities of the wrong kind share the name.
    InvalidCategory,
}

impl ResolveErrorKind {
    pub const fn code(self) -> u32 {
        match self {
            Self::UnknownName => diagnostic_codes::UNKNOWN_NAME,
            Self::AmbiguousMatch => diagnostic_codes::AMBIGUOUS_MATCH,
            Self::SignatureMismatch => diagnostic_codes::SIGNATURE_MISMATCH,
            Self::UnresolvedCause => diagnostic_codes::UNRESOLVED_CAUSE,
            Self::InvalidCategory => diagnostic_codes::INVALID_CATEGORY,
        }
    }
}

/// The first reason a candidate fell short of a complete match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MismatchReason {
    /// The declaration is not the kind of entity the position expects.
    WrongCategory { kind: DeclKind },
    StaticMode { requires_instance: bool },
    TypeArgumentCount { expected: usize, actual: usize },
    ArgumentCount {
        expected_min: usize,
        expected_max: Option<usize>,
        actual: usize,
    },
    ArgumentType {
        index: usize,
        expected: TypeId,
        actual: TypeId,
    },
    RefKind {
        index: usize,
        expected: RefKind,
        actual: RefKind,
    },
    CannotInferTypeArguments { type_param: usize },
    ConstraintViolation {
        type_param: usize,
        type_arg: TypeId,
        constraint: TypeId,
    },
    /// Argument `index` has an unknown type.
    UnresolvedArgument { index: usize },
}

impl MismatchReason {
    pub const fn code(&self) -> u32 {
        match self {
            Self::WrongCategory { .. } => diagnostic_codes::INVALID_CATEGORY,
            Self::StaticMode { .. } => diagnostic_codes::STATIC_MODE_MISMATCH,
            Self::TypeArgumentCount { .. } => diagnostic_codes::TYPE_ARGUMENT_COUNT_MISMATCH,
            Self::ArgumentCount { .. } => diagnostic_codes::ARGUMENT_COUNT_MISMATCH,
            Self::ArgumentType { .. } => diagnostic_codes::ARGUMENT_TYPE_MISMATCH,
            Self::RefKind { .. } => diagnostic_codes::REF_KIND_MISMATCH,
            Self::CannotInferTypeArguments { .. } => diagnostic_codes::CANNOT_INFER_TYPE_ARGUMENTS,
            Self::ConstraintViolation { .. } => diagnostic_codes::CONSTRAINT_VIOLATION,
            Self::UnresolvedArgument { .. } => diagnostic_codes::UNRESOLVED_CAUSE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveDiagnostic {
    pub kind: ResolveErrorKind,
    pub severity: DiagnosticCategory,
    pub name: Atom,
    pub category: ResolveCategory,
    /// Best tier reached; `None` when nothing was found.
    pub tier: Option<MatchTier>,
    /// Surviving candidates, nearest scope first.
    pub candidates: Vec<DeclId>,
    /// First failure of the first surviving candidate.
    pub reason: Option<MismatchReason>,
}

impl ResolveDiagnostic {
    pub fn new(kind: ResolveErrorKind, name: Atom, category: ResolveCategory) -> Self {
        Self {
            kind,
            severity: DiagnosticCategory::Error,
            name,
            category,
            tier: None,
            candidates: Vec::new(),
            reason: None,
        }
    }

    #[must_use]
    pub fn with_severity(mut self, severity: DiagnosticCategory) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_matches(
        mut self,
        tier: Option<MatchTier>,
        candidates: Vec<DeclId>,
        reason: Option<MismatchReason>,
    ) -> Self {
        self.tier = tier;
        self.candidates = candidates;
        self.reason = reason;
        self
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticCategory::Error
    }

    pub const fn code(&self) -> u32 {
        self.kind.code()
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
