//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::launch::Plan;
use crate::nmap::{HostRecord, PortState, Report};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print results in human-readable plain text format.
pub fn print_plain(report: &Report) -> io::Result<()> {
    let stdout = io::stdout();
    write_plain(report, stdout.lock())
}

/// Write the per-host tables and run summary.
pub fn write_plain<W: Write>(report: &Report, mut out: W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                  {} Scan Results",
        style("Scanplate").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;

    if !report.stats.args.is_empty() {
        writeln!(out)?;
        writeln!(out, "  {} {}", style("Command:").bold(), report.stats.args)?;
    }

    if report.hosts.is_empty() {
        writeln!(out)?;
        writeln!(out, "  {}", style("No hosts to display.").dim())?;
    }

    for (address, host) in &report.hosts {
        write_host(&mut out, address, host)?;
    }

    for script in &report.scripts {
        writeln!(out)?;
        writeln!(out, "  {} {}", style("Script:").bold(), script.id)?;
        for line in script.output.lines() {
            writeln!(out, "    {}", line)?;
        }
    }

    writeln!(out)?;
    let runtime = &report.runtime;
    if let Some(error) = &runtime.errormsg {
        writeln!(out, "  {} {}", style("Error:").red().bold(), error)?;
    }
    if !runtime.summary.is_empty() {
        writeln!(out, "  {} {}", style("Summary:").bold(), runtime.summary)?;
    }
    if let Some(hosts) = runtime.hosts {
        writeln!(
            out,
            "           {} up, {} down, {} total",
            style(hosts.up).green().bold(),
            style(hosts.down).red(),
            hosts.total
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

fn write_host<W: Write>(out: &mut W, address: &str, host: &HostRecord) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {} {}", style("Host:").bold(), style(address).white().bold())?;

    if let Some(status) = &host.state {
        writeln!(
            out,
            "  {} {} ({})",
            style("State:").bold(),
            status.state,
            status.reason
        )?;
    }
    for hostname in &host.hostname {
        writeln!(
            out,
            "  {} {} ({})",
            style("Hostname:").bold(),
            hostname.name,
            hostname.kind
        )?;
    }
    if let Some(mac) = &host.macaddress {
        match &mac.vendor {
            Some(vendor) => writeln!(out, "  {} {} ({})", style("MAC:").bold(), mac.addr, vendor)?,
            None => writeln!(out, "  {} {}", style("MAC:").bold(), mac.addr)?,
        }
    }

    if !host.ports.is_empty() {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:>10}  {:^15}  {:<15}  {}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("SERVICE").bold(),
            style("REASON").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for port in &host.ports {
            let state_style = match port.state {
                PortState::Open | PortState::OpenFiltered => Style::new().green().bold(),
                PortState::Closed | PortState::ClosedFiltered => Style::new().red(),
                PortState::Filtered | PortState::Unfiltered => Style::new().yellow(),
            };

            writeln!(
                out,
                "  {:>10}  {:^15}  {:<15}  {}",
                format!("{}/{}", port.portid, port.protocol),
                state_style.apply_to(port.state.to_string()),
                truncate_string(&service_label(port), 15),
                style(&port.reason).dim()
            )?;

            for script in &port.scripts {
                writeln!(
                    out,
                    "  {:>10}  {} {}",
                    "",
                    style(format!("|_{}:", script.id)).dim(),
                    truncate_string(script.output.trim(), 40)
                )?;
            }
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    for os in &host.osmatch {
        writeln!(
            out,
            "  {} {} ({}%)",
            style("OS:").bold(),
            os.name,
            os.accuracy
        )?;
    }

    for script in &host.scripts {
        writeln!(out, "  {} {}", style("Script:").bold(), script.id)?;
        for line in script.output.lines() {
            writeln!(out, "    {}", line)?;
        }
    }

    Ok(())
}

fn service_label(port: &crate::nmap::PortRecord) -> String {
    match &port.service {
        Some(service) => match &service.product {
            Some(product) => format!("{} {}", service.name, product),
            None => service.name.clone(),
        },
        None => port.service_name().to_string(),
    }
}

/// Print what is about to run.
pub fn print_launch_header(plan: &Plan, target: &str) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("Scanplate").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    if plan.is_default() {
        println!("{} No option was set", style("•").dim());
    } else {
        println!(
            "{} Trying option: {}",
            style("•").dim(),
            style(plan.describe()).yellow()
        );
    }
    println!(
        "{} Target: {}",
        style("•").dim(),
        style(target).white().bold()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
