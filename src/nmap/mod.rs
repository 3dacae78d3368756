//! The nmap binding.
//!
//! Capability objects build nmap command lines, a runner executes them and the
//! XML reader turns the output into a [`Report`].

pub mod capabilities;
pub mod report;
pub mod runner;
pub mod xml;

pub use capabilities::{
    CommandScans, DiscoveryScans, HostDiscovery, Nmap, ScanTechniques, TechniqueScans,
    DEFAULT_TOP_PORTS,
};
pub use report::{HostRecord, PortRecord, PortState, Report};
pub use runner::{NmapRunner, ProcessRunner};
pub use xml::parse_report;
