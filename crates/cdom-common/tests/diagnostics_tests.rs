use super::*;

#[test]
fn test_format_message_replaces_placeholders() {
    let text = format_message("'{0}' is a {1} but is used like a {2}.", &["Foo", "type", "variable"]);
    assert_eq!(text, "'Foo' is a type but is used like a variable.");
}

#[test]
fn test_format_message_leaves_missing_args() {
    assert_eq!(format_message("{0} and {1}", &["a"]), "a and {1}");
}

#[test]
fn test_every_code_is_registered_once() {
    let mut codes: Vec<u32> = DIAGNOSTIC_MESSAGES.iter().map(|m| m.code).collect();
    let len = codes.len();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), len, "duplicate diagnostic codes");
    assert!(get_message_template(diagnostic_codes::UNKNOWN_NAME).is_some());
    assert!(get_message_template(diagnostic_codes::REF_KIND_MISMATCH).is_some());
}

#[test]
fn test_from_code_formats_template() {
    let diag = Diagnostic::from_code(
        "Program.Main".to_string(),
        diagnostic_codes::UNKNOWN_NAME,
        DiagnosticCategory::Error,
        &["missing"],
    );
    assert!(diag.is_error());
    assert_eq!(
        diag.message_text,
        "The name 'missing' does not exist in the current context."
    );
}

#[test]
fn test_from_code_unknown_code_joins_args() {
    let diag = Diagnostic::from_code(String::new(), 9, DiagnosticCategory::Warning, &["a", "b"]);
    assert_eq!(diag.message_text, "a b");
    assert!(!diag.is_error());
}

#[test]
fn test_related_information_serializes() {
    let diag = Diagnostic::from_code(
        "X".to_string(),
        diagnostic_codes::AMBIGUOUS_MATCH,
        DiagnosticCategory::Error,
        &["f", "2"],
    )
    .with_related("I1.f(int)".to_string());
    let json = serde_json::to_value(&diag).expect("serializable");
    assert_eq!(json["related_information"][0]["message_text"], "I1.f(int)");
    assert_eq!(json["category"], "Error");
}
