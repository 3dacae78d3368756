//! Running the nmap binary.
//!
//! [`NmapRunner`] is the seam between the capability objects and the outside
//! world: it takes an argument vector and returns nmap's XML output.

use crate::error::{ScanError, ScanResult};
use async_trait::async_trait;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Executes nmap with the given arguments and returns its stdout.
#[async_trait]
pub trait NmapRunner: Send + Sync {
    async fn run(&self, args: &[String]) -> ScanResult<String>;
}

/// Runs the real nmap binary as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub const BINARY: &'static str = "nmap";

    /// Use an explicit binary path.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Find nmap: the configured path if given, otherwise the first match on `PATH`.
    pub fn locate(configured: Option<&Path>) -> ScanResult<Self> {
        if let Some(path) = configured {
            if path.is_file() {
                return Ok(Self::new(path));
            }
            return Err(ScanError::NmapNotFound(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let path_var = env::var_os("PATH").unwrap_or_default();
        find_in_path(Self::BINARY, &path_var)
            .map(Self::new)
            .ok_or_else(|| {
                ScanError::NmapNotFound(format!(
                    "no `{}` on PATH; install nmap or set --nmap",
                    Self::BINARY
                ))
            })
    }

    /// Kill nmap if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

#[async_trait]
impl NmapRunner for ProcessRunner {
    async fn run(&self, args: &[String]) -> ScanResult<String> {
        info!(binary = %self.binary.display(), args = %args.join(" "), "running nmap");

        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ScanError::NmapNotFound(self.binary.display().to_string())
                }
                _ => ScanError::Io(e),
            })?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ScanError::Timeout(limit.as_secs()))??,
            None => child.wait_with_output().await?,
        };

        debug!(status = %output.status, bytes = output.stdout.len(), "nmap finished");

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "a signal".to_string(), |c| format!("status {}", c));
            return Err(ScanError::NmapFailed {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// First `name` found in a `PATH`-style list of directories.
fn find_in_path(name: &str, path_var: &std::ffi::OsStr) -> Option<PathBuf> {
    env::split_paths(path_var)
        .flat_map(|dir| {
            let plain = dir.join(name);
            let exe = dir.join(format!("{}.exe", name));
            [plain, exe]
        })
        .find(|candidate| candidate.is_file())
}
