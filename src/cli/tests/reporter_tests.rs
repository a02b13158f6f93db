use super::project::Project;
use super::reporter::{Outcome, Report, Reporter};
use cdom_common::DiagnosticCategory;
use serde_json::json;

fn report(value: serde_json::Value) -> Report {
    let mut project = Project::from_json(&value.to_string()).expect("project should load");
    let summary = project.resolve().expect("resolves");
    Report::build(&project, summary)
}

fn shapes() -> serde_json::Value {
    json!({
        "declarations": [
            { "name": "App", "kind": "namespace", "members": [
                { "name": "Program", "kind": "class", "members": [
                    { "name": "Area", "kind": "method", "type": "double",
                      "params": [{ "name": "side", "type": "int" }] },
                    { "name": "Main", "kind": "method", "type": "void", "body": [
                        { "kind": "call", "callee": { "kind": "name", "name": "Area" },
                          "args": [{ "kind": "literal", "type": "int" }] },
                        { "kind": "call", "callee": { "kind": "name", "name": "Area" },
                          "args": [{ "kind": "literal", "type": "string" }] },
                        { "kind": "name", "name": "missing" }
                    ]}
                ]}
            ]}
        ]
    })
}

#[test]
fn test_report_lists_every_reference() {
    let report = report(shapes());

    assert_eq!(report.summary.references, 3);
    assert_eq!(report.references.len(), 3);
    let first = &report.references[0];
    assert_eq!(first.location, "App.Program.Main");
    assert_eq!(first.name, "Area");
    assert_eq!(first.outcome, Outcome::Resolved);
    assert_eq!(first.target.as_deref(), Some("App.Program.Area(int)"));
    assert_eq!(first.value_type.as_deref(), Some("double"));

    let second = &report.references[1];
    assert_eq!(second.outcome, Outcome::Unresolved);
    assert!(second.target.is_none());
}

#[test]
fn test_signature_mismatch_carries_reason_and_candidates() {
    let report = report(shapes());

    let mismatch = report
        .diagnostics
        .iter()
        .find(|d| d.code == 1003)
        .expect("signature mismatch");
    assert_eq!(mismatch.category, DiagnosticCategory::Error);
    assert_eq!(mismatch.location, "App.Program.Main");
    assert_eq!(
        mismatch.message_text,
        "No method named 'Area' matches the supplied arguments (1 candidates)."
    );
    let related: Vec<&str> = mismatch
        .related_information
        .iter()
        .map(|r| r.message_text.as_str())
        .collect();
    assert_eq!(related.len(), 2);
    assert!(related[0].contains("argument 1"), "{related:?}");
    assert!(related[0].contains("Expected 'int', found 'string'."), "{related:?}");
    assert_eq!(related[1], "candidate: App.Program.Area(int)");
}

#[test]
fn test_unknown_name_message() {
    let report = report(shapes());

    let unknown = report
        .diagnostics
        .iter()
        .find(|d| d.code == 1001)
        .expect("unknown name");
    assert_eq!(
        unknown.message_text,
        "The name 'missing' does not exist in the current context."
    );
    assert!(unknown.related_information.is_empty());
}

#[test]
fn test_cascade_is_reported_as_warning() {
    let report = report(json!({
        "declarations": [
            { "name": "Program", "kind": "class", "members": [
                { "name": "F", "kind": "method", "type": "void",
                  "params": [{ "name": "a", "type": "int" }] },
                { "name": "Main", "kind": "method", "type": "void", "body": [
                    { "kind": "call", "callee": { "kind": "name", "name": "F" },
                      "args": [{ "kind": "name", "name": "undeclared" }] }
                ]}
            ]}
        ]
    }));

    let cascade = report
        .diagnostics
        .iter()
        .find(|d| d.code == 1004)
        .expect("cascade");
    assert_eq!(cascade.category, DiagnosticCategory::Warning);
    assert_eq!(report.summary.warnings, 1);
    assert_eq!(report.summary.errors, 1);
}

#[test]
fn test_text_rendering_without_color() {
    let report = report(shapes());
    let text = Reporter::new(false).render(&report);

    assert!(
        text.contains("App.Program.Main #0 'Area' (method): resolved -> App.Program.Area(int): double"),
        "{text}"
    );
    assert!(
        text.contains("App.Program.Main - error CD1001: The name 'missing' does not exist"),
        "{text}"
    );
    assert!(text.contains("  Related: candidate: App.Program.Area(int)"), "{text}");
    assert!(
        text.ends_with(
            "3 references: 1 resolved, 0 method groups, 0 intrinsic, 2 unresolved (2 errors, 0 warnings)"
        ),
        "{text}"
    );
}

#[test]
fn test_json_report_shape() {
    let report = report(shapes());
    let value = serde_json::to_value(&report).expect("serializes");

    assert_eq!(value["summary"]["references"], 3);
    assert_eq!(value["summary"]["methodGroups"], 0);
    assert_eq!(value["references"][0]["outcome"], "resolved");
    assert_eq!(value["references"][0]["category"], "method");
    assert_eq!(value["references"][0]["valueType"], "double");
    assert!(value["references"][1].get("target").is_none());
    assert_eq!(value["diagnostics"][0]["code"], 1003);
}
