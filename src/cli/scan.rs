//! Scan subcommand implementation.
//!
//! Handles `scanplate scan [target]`: pick a template, run nmap, print the
//! report.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::launch::{LaunchRequest, Plan, Toolkit};
use crate::nmap::{HostDiscovery, Nmap, ProcessRunner, Report, ScanTechniques};
use crate::output;
use crate::types::{PortSpec, TargetSpec, TemplateId};
use clap::Parser;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Run a scan template against a target.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Target to scan (IP, hostname, CIDR or octet range)
    ///
    /// Examples:
    ///   192.168.1.1        Single IP address
    ///   example.com        Hostname
    ///   192.168.1.0/24     CIDR range
    ///   192.168.1.1-20     Octet range
    #[arg(value_name = "TARGET", default_value = "localhost")]
    pub target: String,

    /// Domain to brute-force subdomains of (dns-brute script)
    #[arg(short, long, value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Ports for an OS detection scan (e.g., "80", "22,80", "1-1000")
    #[arg(short, long, value_name = "SPEC")]
    pub ports: Option<String>,

    /// Scan template to run (1-30, see `scanplate templates`)
    #[arg(short, long, value_name = "ID")]
    pub template: Option<TemplateId>,

    /// Output format for results [default: json]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Disable JSON syntax highlighting
    #[arg(long)]
    pub no_color: bool,

    /// Path to the nmap binary
    #[arg(long, value_name = "PATH")]
    pub nmap: Option<PathBuf>,

    /// Kill nmap after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Zombie host for the idle scan (template 2)
    #[arg(long, value_name = "HOST")]
    pub zombie: Option<String>,
}

impl ScanCommand {
    /// Build the launch request, validating target, domain and ports.
    pub fn request(&self) -> CliResult<LaunchRequest> {
        let target = TargetSpec::parse(&self.target)?;
        debug!(%target, multi_host = target.is_multi_host(), "target accepted");
        let domain = self
            .domain
            .as_deref()
            .map(TargetSpec::parse)
            .transpose()?
            .map(|d| d.to_string());
        let ports = self
            .ports
            .as_deref()
            .map(str::parse::<PortSpec>)
            .transpose()?;

        Ok(LaunchRequest::new(target.to_string())
            .with_domain(domain)
            .with_ports(ports)
            .with_template(self.template))
    }

    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let request = self.request()?;
        let plan = request.plan();
        let format = self.output.unwrap_or(settings.default_output_format);

        debug!(mode = ?plan.mode, template = plan.template.id, %format, "scan planned");

        // CSV stays machine-readable: no header on stdout.
        if !quiet && format != OutputFormat::Csv {
            output::print_launch_header(&plan, &request.target);
        }

        if plan.template.privileged && !is_root() {
            output::print_warning(&format!(
                "{} needs root/sudo privileges for raw socket access.",
                plan.template.description
            ));
            output::print_warning("Results may be incomplete or nmap may refuse to run.");
        }

        let configured = self.nmap.as_deref().or(settings.nmap_path.as_deref());
        let timeout = self.timeout.map(Duration::from_secs).or(settings.timeout());
        let runner = ProcessRunner::locate(configured)?.with_timeout(timeout);
        debug!(nmap = %runner.binary().display(), ?timeout, "nmap located");
        let zombie = self.zombie.clone().or_else(|| settings.idle_zombie.clone());
        let toolkit = Toolkit::new(Arc::new(runner), zombie);

        let report = run_with_spinner(&toolkit, &request, &plan, quiet).await?;

        let color = settings.color && !self.no_color && Term::stdout().is_term();
        output::format_results(&report, format, color)?;

        Ok(())
    }
}

async fn run_with_spinner(
    toolkit: &Toolkit<Nmap, ScanTechniques, HostDiscovery>,
    request: &LaunchRequest,
    plan: &Plan,
    quiet: bool,
) -> CliResult<Report> {
    let spinner = if quiet || !Term::stderr().is_term() {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    spinner.set_message(format!("nmap {} {}", plan.describe(), request.target));

    let result = toolkit.launch(request, plan).await;
    spinner.finish_and_clear();
    Ok(result?)
}

/// Check if running with root/admin privileges.
fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use crate::launch::Mode;

    fn command(args: &[&str]) -> ScanCommand {
        let mut argv = vec!["scan"];
        argv.extend_from_slice(args);
        ScanCommand::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_request_from_flags() {
        let request = command(&["10.0.0.1", "-p", "22,80", "-t", "5"])
            .request()
            .unwrap();
        assert_eq!(request.target, "10.0.0.1");
        assert_eq!(request.template.map(|t| t.get()), Some(5));
        assert!(matches!(request.mode(), Mode::Ports(_)));
        assert_eq!(request.plan().describe(), "-O --osscan-guess -p 22,80");
    }

    #[test]
    fn test_request_defaults_to_localhost() {
        let request = command(&[]).request().unwrap();
        assert_eq!(request.target, "localhost");
        assert_eq!(request.mode(), Mode::Default);
    }

    #[test]
    fn test_request_rejects_option_like_domain() {
        let result = command(&["--domain=--script=evil"]).request();
        assert!(result.is_err());
    }

    #[test]
    fn test_request_rejects_bad_ports() {
        let result = command(&["-p", "99999"]).request();
        assert!(matches!(result, Err(CliError::Port(_))));
    }
}
