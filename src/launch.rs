//! Entry routine: choose a mode, pick a template, dispatch it.
//!
//! Precedence is ports, then domain, then an explicit template, then the
//! default SYN scan.

use crate::dispatch::{scan_command, scan_discovery, scan_techniques};
use crate::error::ScanResult;
use crate::nmap::{
    CommandScans, DiscoveryScans, HostDiscovery, Nmap, NmapRunner, Report, ScanTechniques,
    TechniqueScans,
};
use crate::templates::{self, Category, Template};
use crate::types::{PortSpec, TemplateId};
use std::sync::Arc;
use tracing::info;

/// What the user asked for.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub target: String,
    pub domain: Option<String>,
    pub ports: Option<PortSpec>,
    pub template: Option<TemplateId>,
}

impl LaunchRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_ports(mut self, ports: Option<PortSpec>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_template(mut self, template: Option<TemplateId>) -> Self {
        self.template = template;
        self
    }

    /// Select the mode; earlier inputs win.
    pub fn mode(&self) -> Mode {
        if let Some(ports) = &self.ports {
            Mode::Ports(ports.clone())
        } else if let Some(domain) = &self.domain {
            Mode::Domain(domain.clone())
        } else if let Some(id) = self.template {
            Mode::Template(id)
        } else {
            Mode::Default
        }
    }

    /// Resolve the mode to a concrete template.
    pub fn plan(&self) -> Plan {
        let mode = self.mode();
        let id = match &mode {
            Mode::Ports(_) => templates::PORTS_TEMPLATE,
            Mode::Domain(_) => templates::DOMAIN_TEMPLATE,
            Mode::Template(id) => *id,
            Mode::Default => templates::DEFAULT_TEMPLATE,
        };

        Plan {
            mode,
            template: templates::lookup(id),
        }
    }
}

/// The mutually exclusive ways a scan can be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Ports(PortSpec),
    Domain(String),
    Template(TemplateId),
    Default,
}

/// A selected template and the mode that chose it.
#[derive(Debug, Clone)]
pub struct Plan {
    pub mode: Mode,
    pub template: &'static Template,
}

impl Plan {
    pub fn category(&self) -> Category {
        self.template.category()
    }

    /// The option being tried, with the port list appended in ports mode.
    pub fn describe(&self) -> String {
        match &self.mode {
            Mode::Ports(ports) => format!("{}{}", self.template.flag, ports),
            _ => self.template.flag.to_string(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.mode == Mode::Default
    }
}

/// The three capability objects a launch can dispatch to.
pub struct Toolkit<N, T, D> {
    pub commands: N,
    pub techniques: T,
    pub discovery: D,
}

impl Toolkit<Nmap, ScanTechniques, HostDiscovery> {
    /// Capability objects sharing one nmap runner.
    pub fn new(runner: Arc<dyn NmapRunner>, zombie: Option<String>) -> Self {
        Self {
            commands: Nmap::new(Arc::clone(&runner)),
            techniques: ScanTechniques::new(Arc::clone(&runner)).with_zombie(zombie),
            discovery: HostDiscovery::new(runner),
        }
    }
}

impl<N, T, D> Toolkit<N, T, D>
where
    N: CommandScans,
    T: TechniqueScans,
    D: DiscoveryScans,
{
    /// Run a plan for a request.
    pub async fn launch(&self, request: &LaunchRequest, plan: &Plan) -> ScanResult<Report> {
        let flag = plan.template.flag;
        let target = request.target.as_str();
        info!(template = plan.template.id, flag, target, "launching");

        match &plan.mode {
            Mode::Ports(ports) => {
                scan_discovery(&self.discovery, flag, target, Some(ports)).await
            }
            Mode::Domain(domain) => {
                scan_command(&self.commands, flag, None, Some(domain.as_str())).await
            }
            Mode::Template(_) | Mode::Default => match plan.category() {
                Category::Technique => scan_techniques(&self.techniques, flag, target).await,
                Category::Discovery => {
                    scan_discovery(&self.discovery, flag, target, None).await
                }
                Category::Command => {
                    scan_command(&self.commands, flag, Some(target), None).await
                }
            },
        }
    }
}
