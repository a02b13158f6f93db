use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use cdom::cli::args::{CliArgs, Command, OutputFormat};
use cdom::cli::driver;
use cdom::cli::reporter::Reporter;

fn main() -> Result<()> {
    // Initialize tracing if CDOM_LOG or RUST_LOG is set (zero cost otherwise).
    // Supports CDOM_LOG_FORMAT=tree|json|text (see src/tracing_config.rs).
    cdom::tracing_config::init_tracing();

    let args = CliArgs::parse();
    match args.command {
        Command::Resolve(resolve) => {
            let report = driver::resolve_project(&resolve)?;
            match resolve.format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report)
                        .context("failed to serialize report")?;
                    println!("{json}");
                }
                OutputFormat::Text => {
                    let color = !resolve.no_color && std::io::stdout().is_terminal();
                    let reporter = Reporter::new(color);
                    println!("{}", reporter.render(&report));
                }
            }
            let code = driver::exit_code(&report);
            if code != driver::EXIT_SUCCESS {
                std::process::exit(code);
            }
        }
    }
    Ok(())
}
