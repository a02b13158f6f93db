use super::*;
use cdom_types::Conversion;

fn complete(target: u32, conversions: &[Conversion]) -> MatchCandidate {
    let mut candidate = MatchCandidate::complete(DeclId(target), true);
    candidate.conversions = conversions.iter().copied().collect();
    candidate
}

#[test]
fn test_identity_beats_implicit() {
    let exact = complete(1, &[Conversion::Identity]);
    let widened = complete(2, &[Conversion::Implicit]);
    assert!(is_better(&exact, &widened));
    assert!(!is_better(&widened, &exact));
}

#[test]
fn test_crossed_conversions_are_incomparable() {
    let a = complete(1, &[Conversion::Identity, Conversion::Implicit]);
    let b = complete(2, &[Conversion::Implicit, Conversion::Identity]);
    assert!(!is_better(&a, &b));
    assert!(!is_better(&b, &a));
}

#[test]
fn test_tie_breaks_prefer_normal_form_then_non_generic() {
    let normal = complete(1, &[Conversion::Identity]);
    let mut expanded = complete(2, &[Conversion::Identity]);
    expanded.expanded_variadic = true;
    assert!(is_better(&normal, &expanded));
    assert!(!is_better(&expanded, &normal));

    let mut generic = complete(3, &[Conversion::Identity]);
    generic.inferred_type_arguments.push(TypeId::INT32);
    assert!(is_better(&normal, &generic));
    assert!(!is_better(&generic, &normal));
}

#[test]
fn test_narrow_keeps_identical_signatures_ambiguous() {
    let mut matches = MatchCandidates::new(ResolveCategory::Method);
    matches.add_match(complete(1, &[Conversion::Identity]));
    matches.add_match(complete(2, &[Conversion::Identity]));
    matches.add_match(complete(3, &[Conversion::Implicit]));
    narrow_to_best(&mut matches);
    assert_eq!(matches.targets(), vec![DeclId(1), DeclId(2)]);
    assert!(matches.is_ambiguous());
}

#[test]
fn test_summary_reports_errors() {
    let summary = ResolutionSummary {
        errors: 1,
        ..ResolutionSummary::default()
    };
    assert!(summary.has_errors());
    assert!(!ResolutionSummary::default().has_errors());
}
