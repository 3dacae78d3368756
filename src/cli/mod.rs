//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `scanplate scan [target]` - Run one scan template against a target
//! - `scanplate templates` - List the template table

mod scan;
mod templates;

pub use scan::ScanCommand;
pub use templates::TemplatesCommand;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scanplate - numbered nmap scan templates.
///
/// Each template id (1-30) selects a fixed nmap invocation. Ports select an
/// OS detection scan on those ports, a domain selects the dns-brute script,
/// and with neither a TCP SYN scan is run.
#[derive(Parser, Debug)]
#[command(name = "scanplate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run numbered nmap scan templates", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scan template against a target
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// List the available scan templates
    #[command(alias = "t")]
    Templates(TemplatesCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// Syntax-highlighted JSON
    Json,
    /// CSV format for data analysis
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Json
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::try_parse_from(["scanplate", "scan"]).unwrap();
        match cli.command {
            Commands::Scan(cmd) => {
                assert_eq!(cmd.target, "localhost");
                assert!(cmd.ports.is_none());
                assert!(cmd.domain.is_none());
                assert!(cmd.template.is_none());
                assert!(cmd.output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_scan_flags() {
        let cli = Cli::try_parse_from([
            "scanplate", "-v", "scan", "10.0.0.1", "-t", "24", "-p", "22,80", "-o", "csv",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Scan(cmd) => {
                assert_eq!(cmd.target, "10.0.0.1");
                assert_eq!(cmd.template.map(|t| t.get()), Some(24));
                assert_eq!(cmd.ports.as_deref(), Some("22,80"));
                assert_eq!(cmd.output, Some(OutputFormat::Csv));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_template_id_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["scanplate", "scan", "-t", "0"]).is_err());
        assert!(Cli::try_parse_from(["scanplate", "scan", "-t", "31"]).is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["scanplate", "-v", "-q", "templates"]).is_err());
    }

    #[test]
    fn test_output_format_serde() {
        let json = serde_json::to_string(&OutputFormat::Csv).unwrap();
        assert_eq!(json, "\"csv\"");
        let parsed: OutputFormat = serde_json::from_str("\"plain\"").unwrap();
        assert_eq!(parsed, OutputFormat::Plain);
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }
}
