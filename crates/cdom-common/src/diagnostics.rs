//! Diagnostic types and message lookup for name resolution.
//!
//! The resolver records diagnostics as data on the reference node; message
//! text is produced here from code-keyed templates when a front end renders
//! them.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl DiagnosticCategory {
    /// Lower-case label used by text reporters.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Suggestion => "suggestion",
            Self::Message => "message",
        }
    }
}

/// Related information for a diagnostic (e.g., a candidate declaration).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A rendered diagnostic with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Display path of the node the diagnostic is attached to
    pub location: String,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Related information (e.g. the candidates of an ambiguous match)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a diagnostic from a registered code, formatting its template.
    ///
    /// Unknown codes fall back to the raw argument list so nothing is lost.
    #[must_use]
    pub fn from_code(
        location: String,
        code: u32,
        category: DiagnosticCategory,
        args: &[&str],
    ) -> Self {
        let message_text = match get_message_template(code) {
            Some(template) => format_message(template, args),
            None => args.join(" "),
        };
        Self {
            location,
            message_text,
            category,
            code,
            related_information: Vec::new(),
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            message_text: message,
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const UNKNOWN_NAME: u32 = 1001;
    pub const AMBIGUOUS_MATCH: u32 = 1002;
    pub const SIGNATURE_MISMATCH: u32 = 1003;
    pub const UNRESOLVED_CAUSE: u32 = 1004;
    pub const INVALID_CATEGORY: u32 = 1005;
    pub const ARGUMENT_COUNT_MISMATCH: u32 = 1101;
    pub const ARGUMENT_TYPE_MISMATCH: u32 = 1102;
    pub const STATIC_MODE_MISMATCH: u32 = 1103;
    pub const TYPE_ARGUMENT_COUNT_MISMATCH: u32 = 1104;
    pub const CANNOT_INFER_TYPE_ARGUMENTS: u32 = 1105;
    pub const CONSTRAINT_VIOLATION: u32 = 1106;
    pub const REF_KIND_MISMATCH: u32 = 1107;
}

/// Registered message templates, keyed by code.
pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::UNKNOWN_NAME,
        category: DiagnosticCategory::Error,
        message: "The name '{0}' does not exist in the current context.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::AMBIGUOUS_MATCH,
        category: DiagnosticCategory::Error,
        message: "The reference '{0}' is ambiguous between {1} candidates.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::SIGNATURE_MISMATCH,
        category: DiagnosticCategory::Error,
        message: "No {1} named '{0}' matches the supplied arguments ({2} candidates).",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_CAUSE,
        category: DiagnosticCategory::Warning,
        message: "'{0}' could not be matched because an argument is itself unresolved.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::INVALID_CATEGORY,
        category: DiagnosticCategory::Error,
        message: "'{0}' is a {1} but is used like a {2}.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::ARGUMENT_COUNT_MISMATCH,
        category: DiagnosticCategory::Message,
        message: "'{0}' does not take {1} arguments.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::ARGUMENT_TYPE_MISMATCH,
        category: DiagnosticCategory::Message,
        message: "'{0}': argument {1} is not convertible to the parameter type.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::STATIC_MODE_MISMATCH,
        category: DiagnosticCategory::Message,
        message: "'{0}' cannot be accessed with this static/instance mode.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPE_ARGUMENT_COUNT_MISMATCH,
        category: DiagnosticCategory::Message,
        message: "'{0}' requires {1} type arguments.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::CANNOT_INFER_TYPE_ARGUMENTS,
        category: DiagnosticCategory::Message,
        message: "The type arguments for '{0}' cannot be inferred from the usage.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::CONSTRAINT_VIOLATION,
        category: DiagnosticCategory::Message,
        message: "A type argument of '{0}' does not satisfy the constraint of type parameter {1}.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::REF_KIND_MISMATCH,
        category: DiagnosticCategory::Message,
        message: "'{0}': argument {1} must be passed with the matching ref/out modifier.",
    },
];

/// Look up a diagnostic message definition by code.
///
/// Returns the `DiagnosticMessage` with template string containing `{0}`, `{1}`, etc. placeholders.
/// Use `format_message()` to fill in the placeholders.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
