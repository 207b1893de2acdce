//! Command-line definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Render a TOML CV to LaTeX and compile it to PDF.
#[derive(Debug, Parser)]
#[command(name = "texcv", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./texcv.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the LaTeX source without compiling it
    Render(InputArgs),
    /// Render and compile when inputs changed (default)
    Build(BuildArgs),
    /// Remove generated and auxiliary files
    Clean(InputArgs),
    /// Build, then rebuild whenever an input changes
    Watch(InputArgs),
    /// Print the template context as JSON
    Context(InputArgs),
    /// List templates, or export the built-in ones for editing
    Templates(TemplatesArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Build(BuildArgs::default())
    }
}

/// Overrides for the paths in the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// CV data file
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Directory with template overrides
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Directory for generated files
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Rebuild even if the PDF is up to date
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct TemplatesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the built-in templates into DIR
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Overwrite existing files when exporting
    #[arg(long, requires = "export")]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["texcv"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command.unwrap_or_default(),
            Command::Build(BuildArgs { force: false, .. })
        ));
    }

    #[test]
    fn test_build_flags() {
        let cli = Cli::try_parse_from(["texcv", "build", "--force", "--data", "me.toml"]).unwrap();
        match cli.command {
            Some(Command::Build(args)) => {
                assert!(args.force);
                assert_eq!(args.input.data, Some(PathBuf::from("me.toml")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["texcv", "render", "-vv", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["texcv", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_templates_force_requires_export() {
        assert!(Cli::try_parse_from(["texcv", "templates", "--force"]).is_err());
        let cli = Cli::try_parse_from(["texcv", "templates", "--export", "tpl", "--force"]).unwrap();
        match cli.command {
            Some(Command::Templates(args)) => {
                assert_eq!(args.export, Some(PathBuf::from("tpl")));
                assert!(args.force);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
