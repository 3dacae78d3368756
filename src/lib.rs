//! # Scanplate - Numbered nmap Scan Templates
//!
//! Scanplate maps a template id (1-30) to one of thirty fixed nmap
//! invocations, runs nmap, and turns its XML report into a structured
//! [`nmap::Report`] printed as highlighted JSON, plain text or CSV.
//!
//! ## Selecting a scan
//!
//! - ports given: OS detection on those ports (template 21)
//! - else a domain: the dns-brute script (template 27)
//! - else a template id: that template
//! - else a TCP SYN scan (template 3)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use scanplate::launch::{LaunchRequest, Toolkit};
//! use scanplate::nmap::ProcessRunner;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runner = ProcessRunner::locate(None)?;
//!     let toolkit = Toolkit::new(Arc::new(runner), None);
//!
//!     let request = LaunchRequest::new("scanme.nmap.org").with_template("24".parse().ok());
//!     let report = toolkit.launch(&request, &request.plan()).await?;
//!
//!     println!("{} hosts", report.host_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`templates`] - The template table
//! - [`dispatch`] - Flag-to-method routing for the three capability objects
//! - [`launch`] - Mode selection and the entry routine
//! - [`nmap`] - Capability objects, the process runner and the XML reader
//! - [`types`] - Validated template ids, ports and targets
//! - [`config`] - User settings
//! - [`output`] - Output formatting utilities
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod launch;
pub mod logging;
pub mod nmap;
pub mod output;
pub mod templates;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, ScanError};
pub use launch::{LaunchRequest, Mode, Plan, Toolkit};
pub use nmap::{NmapRunner, ProcessRunner, Report};
pub use templates::{flag_for, Category, Template};
pub use types::{PortSpec, TargetSpec, TemplateId};
