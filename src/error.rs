//! Error types for scanplate.
//!
//! Uses `thiserror` for ergonomic error definitions.

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scan operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Not a scan technique: {0:?}")]
    UnknownFlag(String),

    #[error("No ports given for a port-selection scan")]
    MissingPorts,

    #[error("No target given")]
    MissingTarget,

    #[error("Idle scan needs a zombie host (use --zombie)")]
    MissingZombie,

    #[error("nmap not found: {0}")]
    NmapNotFound(String),

    #[error("nmap exited with {code}: {stderr}")]
    NmapFailed { code: String, stderr: String },

    #[error("nmap did not finish within {0}s")]
    Timeout(u64),

    #[error("Invalid nmap report: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine a home directory for configuration")]
    DirectoryNotFound,

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Invalid settings file: {0}")]
    InvalidFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors surfaced by CLI subcommands.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
