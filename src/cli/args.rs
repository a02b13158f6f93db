use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use cdom_resolver::ResolverOptions;

/// CLI arguments for the cdom binary.
#[derive(Parser, Debug)]
#[command(
    name = "cdom",
    version,
    about = "Name and overload resolution over a code DOM"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve every reference of a JSON project and report the outcome.
    Resolve(ResolveArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Project file with declarations and expression trees.
    pub project: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Report mismatches caused by unresolved arguments as errors.
    #[arg(long = "no-cascade-suppression")]
    pub no_cascade_suppression: bool,

    /// Keep every complete match ambiguous instead of preferring better conversions.
    #[arg(long = "strict-ambiguity")]
    pub strict_ambiguity: bool,

    /// Resolve a second time and fail if anything changed.
    #[arg(long)]
    pub twice: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl ResolveArgs {
    /// Apply command-line overrides on top of the project's options.
    pub fn apply(&self, options: &mut ResolverOptions) {
        if self.no_cascade_suppression {
            options.suppress_cascading_errors = false;
        }
        if self.strict_ambiguity {
            options.prefer_better_conversions = false;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
