use colored::Colorize;
use serde::Serialize;

use cdom_common::{Diagnostic, DiagnosticCategory, get_message_template};
use cdom_resolver::{
    MismatchReason, NodeIndex, ReferenceNode, ResolutionSummary, ResolveCategory,
    ResolveDiagnostic, ResolveErrorKind,
};
use cdom_types::{DeclId, TypeFormatter};

use super::project::Project;

/// What a reference ended up as after a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Resolved,
    MethodGroup,
    /// Built-in operator or element access; no declaration involved.
    Intrinsic,
    Unresolved,
}

impl Outcome {
    fn of(reference: &ReferenceNode, diagnosed: bool) -> Self {
        if reference.is_resolved() {
            return Self::Resolved;
        }
        match reference.matches() {
            Some(m) if m.is_method_group() && m.has_complete_match() => Self::MethodGroup,
            _ if !diagnosed
                && matches!(
                    reference.category(),
                    ResolveCategory::Indexer | ResolveCategory::OperatorOverload
                ) =>
            {
                Self::Intrinsic
            }
            _ => Self::Unresolved,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::MethodGroup => "method group",
            Self::Intrinsic => "intrinsic",
            Self::Unresolved => "unresolved",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceReport {
    pub node: NodeIndex,
    /// Qualified name of the enclosing declaration.
    pub location: String,
    pub name: String,
    pub category: ResolveCategory,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

/// Everything a resolution run produced, ready to print.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: ResolutionSummary,
    pub references: Vec<ReferenceReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn build(project: &Project, summary: ResolutionSummary) -> Self {
        let formatter = TypeFormatter::new(&project.types, &project.decls, &project.names);
        let mut references = Vec::new();
        let mut diagnostics = Vec::new();

        for idx in project.arena.references() {
            let Some(reference) = project.arena.reference_node(idx) else {
                continue;
            };
            let location = location_of(&formatter, project.arena.scope(idx));
            let mut diagnosed = false;
            for parse in project.arena.parse_diagnostics(idx) {
                diagnostics.push(parse.clone());
            }
            for diagnostic in project.arena.resolution_diagnostics(idx) {
                diagnosed = true;
                diagnostics.push(to_diagnostic(project, &formatter, &location, diagnostic));
            }

            let resolved = reference.as_resolved();
            references.push(ReferenceReport {
                node: idx,
                location,
                name: project.names.resolve(reference.name).to_string(),
                category: reference.category(),
                outcome: Outcome::of(reference, diagnosed),
                target: resolved.map(|r| formatter.format_signature(r.target)),
                value_type: resolved.map(|r| formatter.format_type(r.value_type)),
            });
        }

        Self {
            summary,
            references,
            diagnostics,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.summary.has_errors()
    }
}

fn location_of(formatter: &TypeFormatter<'_>, scope: Option<DeclId>) -> String {
    scope
        .map(|id| formatter.qualified_name(id))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "<global>".to_string())
}

/// Render one resolution record as a message-bearing diagnostic.
///
/// The first surviving candidate's failure and every candidate's
/// signature become related information.
pub fn to_diagnostic(
    project: &Project,
    formatter: &TypeFormatter<'_>,
    location: &str,
    diagnostic: &ResolveDiagnostic,
) -> Diagnostic {
    let name = project.names.resolve(diagnostic.name);
    let count = diagnostic.candidate_count().to_string();
    let used_as = diagnostic.category.describe();
    let found_as = match &diagnostic.reason {
        Some(MismatchReason::WrongCategory { kind }) => kind.describe(),
        _ => "name",
    };
    let args: Vec<&str> = match diagnostic.kind {
        ResolveErrorKind::UnknownName | ResolveErrorKind::UnresolvedCause => vec![name],
        ResolveErrorKind::AmbiguousMatch => vec![name, count.as_str()],
        ResolveErrorKind::SignatureMismatch => vec![name, used_as, count.as_str()],
        ResolveErrorKind::InvalidCategory => vec![name, found_as, used_as],
    };
    let mut rendered = Diagnostic::from_code(
        location.to_string(),
        diagnostic.kind.code(),
        diagnostic.severity,
        &args,
    );

    if let Some(reason) = &diagnostic.reason
        && !matches!(reason, MismatchReason::WrongCategory { .. })
    {
        let first = diagnostic.candidates.first().copied();
        rendered = rendered.with_related(reason_text(project, formatter, name, first, reason));
    }
    for &candidate in &diagnostic.candidates {
        rendered = rendered.with_related(format!(
            "candidate: {}",
            formatter.format_signature(candidate)
        ));
    }
    rendered
}

fn reason_text(
    project: &Project,
    formatter: &TypeFormatter<'_>,
    name: &str,
    candidate: Option<DeclId>,
    reason: &MismatchReason,
) -> String {
    let subject = candidate.map_or_else(|| name.to_string(), |id| formatter.format_signature(id));
    let (args, detail): (Vec<String>, Option<String>) = match reason {
        MismatchReason::ArgumentCount { actual, .. } => (vec![subject, actual.to_string()], None),
        MismatchReason::ArgumentType {
            index,
            expected,
            actual,
        } => (
            vec![subject, (index + 1).to_string()],
            Some(format!(
                "Expected '{}', found '{}'.",
                formatter.format_type(*expected),
                formatter.format_type(*actual)
            )),
        ),
        MismatchReason::RefKind { index, .. } => (vec![subject, (index + 1).to_string()], None),
        MismatchReason::TypeArgumentCount { expected, .. } => {
            (vec![subject, expected.to_string()], None)
        }
        MismatchReason::ConstraintViolation {
            type_param,
            type_arg,
            constraint,
        } => {
            let param = candidate
                .and_then(|id| project.decls.get(id))
                .and_then(|d| d.type_params.get(*type_param))
                .map_or_else(
                    || type_param.to_string(),
                    |tp| project.names.resolve(tp.name).to_string(),
                );
            (
                vec![subject, param],
                Some(format!(
                    "'{}' does not satisfy '{}'.",
                    formatter.format_type(*type_arg),
                    formatter.format_type(*constraint)
                )),
            )
        }
        MismatchReason::UnresolvedArgument { .. }
        | MismatchReason::StaticMode { .. }
        | MismatchReason::CannotInferTypeArguments { .. }
        | MismatchReason::WrongCategory { .. } => (vec![subject], None),
    };

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let mut text = match get_message_template(reason.code()) {
        Some(template) => cdom_common::format_message(template, &args),
        None => args.join(" "),
    };
    if let Some(detail) = detail {
        text.push(' ');
        text.push_str(&detail);
    }
    text
}

// =============================================================================
// Text output
// =============================================================================

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render(&self, report: &Report) -> String {
        let mut out = String::new();
        for reference in &report.references {
            out.push_str(&self.format_reference(reference));
            out.push('\n');
        }
        if !report.diagnostics.is_empty() {
            out.push('\n');
        }
        for diagnostic in &report.diagnostics {
            out.push_str(&self.format_diagnostic(diagnostic));
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.format_summary(&report.summary));
        out
    }

    pub fn format_reference(&self, reference: &ReferenceReport) -> String {
        let outcome = self.format_outcome(reference.outcome);
        let mut line = format!(
            "{} {} '{}' ({}): {}",
            reference.location,
            reference.node,
            reference.name,
            reference.category.describe(),
            outcome
        );
        if let Some(target) = &reference.target {
            line.push_str(" -> ");
            line.push_str(target);
        }
        if let Some(ty) = &reference.value_type {
            line.push_str(": ");
            line.push_str(ty);
        }
        line
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        output.push_str(&diagnostic.location);
        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        let code = self.format_code(diagnostic.code);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        for related in &diagnostic.related_information {
            output.push('\n');
            let prefix = if self.color {
                "  Related".dimmed().to_string()
            } else {
                "  Related".to_string()
            };
            output.push_str(&format!("{prefix}: {}", related.message_text));
        }
        output
    }

    pub fn format_summary(&self, summary: &ResolutionSummary) -> String {
        let line = format!(
            "{} references: {} resolved, {} method groups, {} intrinsic, {} unresolved ({} errors, {} warnings)",
            summary.references,
            summary.resolved,
            summary.method_groups,
            summary.intrinsic,
            summary.unresolved,
            summary.errors,
            summary.warnings
        );
        if !self.color {
            return line;
        }
        if summary.has_errors() {
            line.red().to_string()
        } else {
            line.green().to_string()
        }
    }

    fn format_outcome(&self, outcome: Outcome) -> String {
        let label = outcome.label();
        if !self.color {
            return label.to_string();
        }
        match outcome {
            Outcome::Resolved => label.green().to_string(),
            Outcome::MethodGroup | Outcome::Intrinsic => label.cyan().to_string(),
            Outcome::Unresolved => label.red().to_string(),
        }
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.label();
        if !self.color {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }

        let label = format!("CD{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}
