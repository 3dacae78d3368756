//! Capability objects: one method per nmap scan.
//!
//! Three objects group the scans the same way the template table does:
//! [`ScanTechniques`], [`HostDiscovery`] and [`Nmap`] (named commands). Each
//! implements a trait so dispatchers can be driven by test doubles.
//!
//! Every method runs `nmap -oX - <flags> [extra args] <target>` and parses the
//! XML into a [`Report`]. Extra args are split on whitespace.

use super::report::Report;
use super::runner::NmapRunner;
use super::xml::parse_report;
use crate::error::{ScanError, ScanResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Port count for the plain top-ports scan.
pub const DEFAULT_TOP_PORTS: u16 = 1000;

/// Raw scan techniques.
#[async_trait]
pub trait TechniqueScans: Send + Sync {
    async fn fin_scan(&self, target: &str) -> ScanResult<Report>;
    async fn idle_scan(&self, target: &str) -> ScanResult<Report>;
    async fn ping_scan(&self, target: &str) -> ScanResult<Report>;
    async fn syn_scan(&self, target: &str, args: Option<&str>) -> ScanResult<Report>;
    async fn tcp_scan(&self, target: &str) -> ScanResult<Report>;
    async fn udp_scan(&self, target: &str) -> ScanResult<Report>;
}

/// Host discovery options.
#[async_trait]
pub trait DiscoveryScans: Send + Sync {
    async fn portscan_only(&self, target: &str, args: Option<&str>) -> ScanResult<Report>;
    async fn no_portscan(&self, target: &str, args: Option<&str>) -> ScanResult<Report>;
    async fn disable_dns(&self, target: &str) -> ScanResult<Report>;
}

/// Named scan commands.
#[async_trait]
pub trait CommandScans: Send + Sync {
    async fn detect_firewall(&self, target: &str) -> ScanResult<Report>;
    async fn os_detection(&self, target: &str) -> ScanResult<Report>;
    async fn scan_top_ports(&self, target: &str, count: u16, args: Option<&str>)
        -> ScanResult<Report>;
    async fn dns_brute_script(&self, domain: &str) -> ScanResult<Report>;
    async fn list_scan(&self, target: &str) -> ScanResult<Report>;
    async fn subnet_scan(&self, target: &str) -> ScanResult<Report>;
    async fn version_detection(&self, target: &str, args: Option<&str>) -> ScanResult<Report>;
}

/// Shared plumbing: build the command line, run it, parse the result.
#[derive(Clone)]
struct Binding {
    runner: Arc<dyn NmapRunner>,
}

impl Binding {
    async fn scan(&self, flags: &[&str], args: Option<&str>, target: &str) -> ScanResult<Report> {
        let argv = command_line(flags, args, target);
        let xml = self.runner.run(&argv).await?;
        let report = parse_report(&xml)?;
        debug!(hosts = report.host_count(), "report parsed");
        Ok(report)
    }
}

/// `-oX - <flags> [args] <target>`
pub fn command_line(flags: &[&str], args: Option<&str>, target: &str) -> Vec<String> {
    let mut argv: Vec<String> = vec!["-oX".to_string(), "-".to_string()];
    argv.extend(flags.iter().map(|f| f.to_string()));
    if let Some(args) = args {
        argv.extend(args.split_whitespace().map(str::to_string));
    }
    argv.push(target.to_string());
    argv
}

/// Scan techniques (`-sF`, `-sI`, `-sP`, `-sS`, `-sT`, `-sU`).
#[derive(Clone)]
pub struct ScanTechniques {
    binding: Binding,
    zombie: Option<String>,
}

impl ScanTechniques {
    pub fn new(runner: Arc<dyn NmapRunner>) -> Self {
        Self {
            binding: Binding { runner },
            zombie: None,
        }
    }

    /// Zombie host used by the idle scan.
    pub fn with_zombie(mut self, zombie: Option<String>) -> Self {
        self.zombie = zombie;
        self
    }
}

#[async_trait]
impl TechniqueScans for ScanTechniques {
    async fn fin_scan(&self, target: &str) -> ScanResult<Report> {
        self.binding.scan(&["-sF"], None, target).await
    }

    async fn idle_scan(&self, target: &str) -> ScanResult<Report> {
        let zombie = self.zombie.as_deref().ok_or(ScanError::MissingZombie)?;
        self.binding.scan(&["-sI", zombie], None, target).await
    }

    async fn ping_scan(&self, target: &str) -> ScanResult<Report> {
        self.binding.scan(&["-sP"], None, target).await
    }

    async fn syn_scan(&self, target: &str, args: Option<&str>) -> ScanResult<Report> {
        self.binding.scan(&["-sS"], args, target).await
    }

    async fn tcp_scan(&self, target: &str) -> ScanResult<Report> {
        self.binding.scan(&["-sT"], None, target).await
    }

    async fn udp_scan(&self, target: &str) -> ScanResult<Report> {
        self.binding.scan(&["-sU"], None, target).await
    }
}

/// Host discovery (`-Pn`, `-sn`, `-n`).
#[derive(Clone)]
pub struct HostDiscovery {
    binding: Binding,
}

impl HostDiscovery {
    pub fn new(runner: Arc<dyn NmapRunner>) -> Self {
        Self {
            binding: Binding { runner },
        }
    }
}

#[async_trait]
impl DiscoveryScans for HostDiscovery {
    async fn portscan_only(&self, target: &str, args: Option<&str>) -> ScanResult<Report> {
        self.binding.scan(&["-Pn"], args, target).await
    }

    async fn no_portscan(&self, target: &str, args: Option<&str>) -> ScanResult<Report> {
        self.binding.scan(&["-sn"], args, target).await
    }

    async fn disable_dns(&self, target: &str) -> ScanResult<Report> {
        self.binding.scan(&["-n"], None, target).await
    }
}

/// Named commands: OS detection, top ports, scripts and friends.
#[derive(Clone)]
pub struct Nmap {
    binding: Binding,
}

impl Nmap {
    pub fn new(runner: Arc<dyn NmapRunner>) -> Self {
        Self {
            binding: Binding { runner },
        }
    }
}

#[async_trait]
impl CommandScans for Nmap {
    async fn detect_firewall(&self, target: &str) -> ScanResult<Report> {
        self.binding.scan(&["-sA"], None, target).await
    }

    async fn os_detection(&self, target: &str) -> ScanResult<Report> {
        self.binding.scan(&["-O"], None, target).await
    }

    async fn scan_top_ports(
        &self,
        target: &str,
        count: u16,
        args: Option<&str>,
    ) -> ScanResult<Report> {
        let count = count.to_string();
        self.binding
            .scan(&["--top-ports", count.as_str()], args, target)
            .await
    }

    async fn dns_brute_script(&self, domain: &str) -> ScanResult<Report> {
        self.binding
            .scan(&["--script", "dns-brute.nse"], None, domain)
            .await
    }

    async fn list_scan(&self, target: &str) -> ScanResult<Report> {
        self.binding.scan(&["-sL"], None, target).await
    }

    async fn subnet_scan(&self, target: &str) -> ScanResult<Report> {
        self.binding.scan(&["-p-"], None, target).await
    }

    async fn version_detection(&self, target: &str, args: Option<&str>) -> ScanResult<Report> {
        self.binding.scan(&["-sV"], args, target).await
    }
}
