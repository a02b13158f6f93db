use super::*;
use cdom_common::get_message_template;

#[test]
fn test_every_kind_has_a_message_template() {
    for kind in [
        ResolveErrorKind::UnknownName,
        ResolveErrorKind::AmbiguousMatch,
        ResolveErrorKind::SignatureMismatch,
        ResolveErrorKind::UnresolvedCause,
        ResolveErrorKind::InvalidCategory,
    ] {
        assert!(get_message_template(kind.code()).is_some(), "{kind:?}");
    }
}

#[test]
fn test_reason_codes_have_templates() {
    let reasons = [
        MismatchReason::StaticMode {
            requires_instance: true,
        },
        MismatchReason::ArgumentCount {
            expected_min: 1,
            expected_max: Some(1),
            actual: 2,
        },
        MismatchReason::ArgumentType {
            index: 0,
            expected: TypeId::INT32,
            actual: TypeId::STRING,
        },
        MismatchReason::CannotInferTypeArguments { type_param: 0 },
    ];
    for reason in reasons {
        assert!(get_message_template(reason.code()).is_some(), "{reason:?}");
    }
}

#[test]
fn test_builder_defaults_to_error() {
    let diag = ResolveDiagnostic::new(
        ResolveErrorKind::SignatureMismatch,
        Atom(1),
        ResolveCategory::Method,
    );
    assert!(diag.is_error());
    assert_eq!(diag.candidate_count(), 0);

    let diag = diag
        .with_severity(DiagnosticCategory::Warning)
        .with_matches(Some(MatchTier::Category), vec![DeclId(3)], None);
    assert!(!diag.is_error());
    assert_eq!(diag.candidate_count(), 1);
    assert_eq!(diag.code(), diagnostic_codes::SIGNATURE_MISMATCH);
}
