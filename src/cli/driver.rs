use anyhow::{Result, bail};
use tracing::{debug, info_span};

use crate::cli::args::ResolveArgs;
use crate::cli::project::Project;
use crate::cli::reporter::Report;

/// Exit status when every reference was checked without errors.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status when resolution recorded at least one error.
pub const EXIT_RESOLUTION_ERRORS: i32 = 2;

/// Load a project, resolve it and build the report.
///
/// With `--twice` the whole tree is resolved again and any change in node
/// state or counts is an error: a second pass over a finished tree must
/// be a no-op.
pub fn resolve_project(args: &ResolveArgs) -> Result<Report> {
    let _span = info_span!("resolve_project", project = %args.project.display()).entered();

    let mut project = Project::load(&args.project)?;
    args.apply(&mut project.options);
    debug!(options = ?project.options, "resolver options");

    let summary = project.resolve()?;
    if args.twice {
        let before = project.snapshot();
        let again = project.resolve()?;
        if again != summary {
            bail!("second resolution pass changed the summary: {summary:?} -> {again:?}");
        }
        if project.snapshot() != before {
            bail!("second resolution pass changed reference state");
        }
    }

    Ok(Report::build(&project, summary))
}

pub fn exit_code(report: &Report) -> i32 {
    if report.has_errors() {
        EXIT_RESOLUTION_ERRORS
    } else {
        EXIT_SUCCESS
    }
}
