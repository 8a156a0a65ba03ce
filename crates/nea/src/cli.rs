//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// nea - keep NotEnoughAddons up to date
#[derive(Parser, Debug)]
#[command(name = "nea")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding nea-runtime.yaml (defaults to ~/.nea)
    #[arg(long, global = true, env = "NEA_CONFIG_DIR")]
    pub config_dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Run one update cycle against a plugin directory
    Start(StartArgs),

    /// Report whether a newer build exists, without downloading it
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Plugin directory of the server
    #[arg(short, long, default_value = "plugins")]
    pub plugin_dir: Utf8PathBuf,

    /// Build number of the running plugin
    #[arg(short = 'c', long)]
    pub current_version: Option<String>,

    /// Only install a missing artifact, never stage updates
    #[arg(long)]
    pub no_auto_update: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Build number to compare against
    pub current_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_defaults() {
        let cli = Cli::try_parse_from(["nea", "start"]).unwrap();
        match cli.command {
            Commands::Start(args) => {
                assert_eq!(args.plugin_dir, Utf8PathBuf::from("plugins"));
                assert!(args.current_version.is_none());
                assert!(!args.no_auto_update);
            }
            other => panic!("expected start, got {:?}", other),
        }
    }

    #[test]
    fn test_start_with_flags() {
        let cli = Cli::try_parse_from([
            "nea",
            "-vv",
            "start",
            "--plugin-dir",
            "/srv/mc/plugins",
            "-c",
            "40",
            "--no-auto-update",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Start(args) => {
                assert_eq!(args.plugin_dir, Utf8PathBuf::from("/srv/mc/plugins"));
                assert_eq!(args.current_version.as_deref(), Some("40"));
                assert!(args.no_auto_update);
            }
            other => panic!("expected start, got {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_version() {
        assert!(Cli::try_parse_from(["nea", "check"]).is_err());

        let cli = Cli::try_parse_from(["nea", "check", "41"]).unwrap();
        assert!(matches!(cli.command, Commands::Check(ref a) if a.current_version == "41"));
    }
}
