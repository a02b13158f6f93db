//! Scored candidates and the tier-ratcheting accumulator.

use crate::category::ResolveCategory;
use crate::diagnostics::MismatchReason;
use cdom_types::{Conversion, DeclId, TypeId, TypeList};
use serde::Serialize;
use smallvec::SmallVec;
use tracing::trace;

/// Confidence tier of a match, ordered worst-first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchTier {
    NameOnly,
    Category,
    Complete,
}

/// One candidate declaration scored against one call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchCandidate {
    pub target: DeclId,
    pub is_complete_match: bool,
    pub is_category_match: bool,
    pub is_method: bool,
    /// Indexed by type-parameter position of the candidate's generic owner.
    pub inferred_type_arguments: TypeList,
    /// Matching failed because an argument was itself unresolved.
    pub unresolved_cause: bool,
    /// Per-argument conversion, in argument order (complete matches only).
    pub conversions: SmallVec<[Conversion; 4]>,
    pub expanded_variadic: bool,
    pub failure: Option<MismatchReason>,
    /// Scope depth the candidate was found at (0 = innermost).
    pub depth: u32,
}

impl MatchCandidate {
    pub fn name_only(target: DeclId, is_method: bool, failure: MismatchReason) -> Self {
        Self {
            target,
            is_complete_match: false,
            is_category_match: false,
            is_method,
            inferred_type_arguments: TypeList::new(),
            unresolved_cause: false,
            conversions: SmallVec::new(),
            expanded_variadic: false,
            failure: Some(failure),
            depth: 0,
        }
    }

    pub fn category(target: DeclId, is_method: bool, failure: MismatchReason) -> Self {
        Self {
            is_category_match: true,
            ..Self::name_only(target, is_method, failure)
        }
    }

    pub fn complete(target: DeclId, is_method: bool) -> Self {
        Self {
            target,
            is_complete_match: true,
            is_category_match: true,
            is_method,
            inferred_type_arguments: TypeList::new(),
            unresolved_cause: false,
            conversions: SmallVec::new(),
            expanded_variadic: false,
            failure: None,
            depth: 0,
        }
    }

    #[must_use]
    pub fn at_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn tier(&self) -> MatchTier {
        if self.is_complete_match {
            MatchTier::Complete
        } else if self.is_category_match {
            MatchTier::Category
        } else {
            MatchTier::NameOnly
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.inferred_type_arguments.is_empty()
    }
}

/// The best tier of matches seen so far for one unresolved reference.
///
/// Every member shares one tier; a strictly better candidate replaces the
/// whole collection and a worse one is dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchCandidates {
    category: ResolveCategory,
    candidates: Vec<MatchCandidate>,
    is_method_group: bool,
    is_category_match: bool,
    is_complete_match: bool,
    /// Whether method-group mode has been decided by a first candidate.
    mode_decided: bool,
    /// Type of the member access receiver the candidates were looked up on.
    receiver: Option<TypeId>,
}

impl MatchCandidates {
    pub fn new(category: ResolveCategory) -> Self {
        Self {
            category,
            candidates: Vec::new(),
            is_method_group: false,
            is_category_match: false,
            is_complete_match: false,
            mode_decided: false,
            receiver: None,
        }
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: Option<TypeId>) -> Self {
        self.receiver = receiver;
        self
    }

    pub fn receiver(&self) -> Option<TypeId> {
        self.receiver
    }

    /// Add a scored candidate. Returns whether at least one complete match
    /// is now held; ambiguity is checked separately.
    pub fn add_match(&mut self, candidate: MatchCandidate) -> bool {
        if !self.mode_decided {
            self.mode_decided = true;
            self.is_method_group =
                self.category == ResolveCategory::Expression && candidate.is_method;
        }
        if self.is_method_group && !candidate.is_method {
            trace!(target = candidate.target.0, "non-method ignored in method group");
            return self.has_complete_match();
        }

        if candidate.is_complete_match {
            if !self.is_complete_match {
                self.candidates.clear();
                self.is_complete_match = true;
                self.is_category_match = true;
            }
            self.candidates.push(candidate);
        } else if candidate.is_category_match && !self.is_complete_match {
            if !self.is_category_match {
                self.candidates.clear();
                self.is_category_match = true;
            }
            self.candidates.push(candidate);
        } else if !self.is_complete_match && !self.is_category_match {
            self.candidates.push(candidate);
        } else {
            trace!(target = candidate.target.0, "inferior candidate discarded");
        }
        self.has_complete_match()
    }

    pub fn has_complete_match(&self) -> bool {
        self.is_complete_match && !self.candidates.is_empty()
    }

    pub fn category(&self) -> ResolveCategory {
        self.category
    }

    pub fn is_method_group(&self) -> bool {
        self.is_method_group
    }

    pub fn is_category_match(&self) -> bool {
        self.is_category_match
    }

    pub fn is_complete_match(&self) -> bool {
        self.is_complete_match
    }

    /// Tier of the held candidates, `None` while empty.
    pub fn tier(&self) -> Option<MatchTier> {
        if self.candidates.is_empty() {
            None
        } else if self.is_complete_match {
            Some(MatchTier::Complete)
        } else if self.is_category_match {
            Some(MatchTier::Category)
        } else {
            Some(MatchTier::NameOnly)
        }
    }

    /// More than one complete match outside method-group mode.
    pub fn is_ambiguous(&self) -> bool {
        self.is_complete_match && !self.is_method_group && self.candidates.len() > 1
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchCandidate> {
        self.candidates.iter()
    }

    pub fn first(&self) -> Option<&MatchCandidate> {
        self.candidates.first()
    }

    pub fn targets(&self) -> Vec<DeclId> {
        self.candidates.iter().map(|c| c.target).collect()
    }

    /// Whether any held candidate failed only because of an unresolved operand.
    pub fn has_unresolved_cause(&self) -> bool {
        self.candidates.iter().any(|c| c.unresolved_cause)
    }

    /// Keep only candidates for which `keep` returns true. Tier flags are
    /// unchanged; used to narrow an ambiguous complete set.
    pub fn retain(&mut self, keep: impl FnMut(&MatchCandidate) -> bool) {
        self.candidates.retain(keep);
    }
}

impl<'a> IntoIterator for &'a MatchCandidates {
    type Item = &'a MatchCandidate;
    type IntoIter = std::slice::Iter<'a, MatchCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
#[path = "../tests/candidates_tests.rs"]
mod tests;
