//! Application settings and paths.
//!
//! Settings live in an XDG-compliant config directory and are all optional;
//! command-line flags take precedence over them.

use crate::cli::OutputFormat;
use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

static PATHS: OnceLock<Option<Paths>> = OnceLock::new();

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/scanplate)
    pub config_dir: PathBuf,
}

impl Paths {
    /// The global paths, or `None` when no home directory can be determined.
    pub fn get() -> Option<&'static Paths> {
        PATHS.get_or_init(Self::new).as_ref()
    }

    fn new() -> Option<Self> {
        let project = ProjectDirs::from("com", "scanplate", "scanplate")?;
        Some(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// User settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// nmap binary; searched on `PATH` when unset.
    pub nmap_path: Option<PathBuf>,
    /// Kill nmap after this many seconds, 0 for no limit.
    pub timeout_secs: u64,
    /// Output format when `--output` is not given.
    pub default_output_format: OutputFormat,
    /// Syntax-highlight JSON output on terminals.
    pub color: bool,
    /// Zombie host for the idle scan.
    pub idle_zombie: Option<String>,
    /// Enable verbose logging by default.
    pub verbose: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            nmap_path: None,
            timeout_secs: 0,
            default_output_format: OutputFormat::Json,
            color: true,
            idle_zombie: None,
            verbose: false,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults.
    pub fn load() -> ConfigResult<Self> {
        let paths = Paths::get().ok_or(ConfigError::DirectoryNotFound)?;
        let file = paths.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// The nmap timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
