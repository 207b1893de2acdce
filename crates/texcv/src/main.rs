//! texcv - build a one-page LaTeX CV from a TOML file.
//!
//! ```text
//! texcv                     # same as `texcv build`
//! texcv render              # output/<stem>.tex only
//! texcv build --force       # render and compile even if up to date
//! texcv watch               # rebuild on every change
//! texcv clean               # remove generated files
//! texcv context             # dump the template context as JSON
//! texcv templates --export templates
//! ```

mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::commands::BuildOutcome;
use crate::config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", style("error:").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr. `RUST_LOG` takes precedence over the flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::discover(cli.config.as_deref())?;

    match cli.command.unwrap_or_default() {
        Command::Render(input) => {
            config.apply(&input);
            let path = commands::render(&config)?;
            println!("{} Rendered: {}", style("✓").green(), path.display());
        }
        Command::Build(args) => {
            config.apply(&args.input);
            print_build(commands::build(&config, args.force)?);
        }
        Command::Clean(input) => {
            config.apply(&input);
            let removed = commands::clean_outputs(&config)?;
            if removed.is_empty() {
                println!("{}", style("Nothing to clean").dim());
            }
            for path in removed {
                println!("{} Removed: {}", style("✓").green(), path.display());
            }
        }
        Command::Watch(input) => {
            config.apply(&input);
            commands::watch(&config, |outcome| match outcome {
                Ok(outcome) => print_build(outcome),
                Err(err) => eprintln!("{} {:#}", style("error:").red().bold(), err),
            })?;
        }
        Command::Context(input) => {
            config.apply(&input);
            println!("{}", commands::context_json(&config)?);
        }
        Command::Templates(args) => {
            config.apply(&args.input);
            match &args.export {
                Some(dir) => {
                    for path in commands::export_templates(dir, args.force)? {
                        println!("{} Exported: {}", style("✓").green(), path.display());
                    }
                }
                None => {
                    for name in commands::template_names(&config)? {
                        println!("{}", name);
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_build(outcome: BuildOutcome) {
    match outcome {
        BuildOutcome::UpToDate(artifact) => {
            println!("{} Up to date: {}", style("✓").green(), artifact.display());
        }
        BuildOutcome::Built(report) => {
            println!("{} Built: {}", style("✓").green(), report.artifact.display());
            if !report.warnings.is_empty() {
                println!(
                    "  {} {} warning(s), see {}",
                    style("!").yellow(),
                    report.warnings.len(),
                    report.log.display()
                );
            }
        }
    }
}
