//! CSV output formatting.

use crate::nmap::Report;
use std::io::{self, Write};

/// Write one row per port record.
pub fn write_csv<W: Write>(report: &Report, writer: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["host", "port", "protocol", "state", "service", "reason"])?;

    for port in report.port_records() {
        let portid = port.portid.to_string();
        let state = port.state.to_string();
        wtr.write_record([
            port.host.as_str(),
            portid.as_str(),
            port.protocol.as_str(),
            state.as_str(),
            port.service_name(),
            port.reason.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print results in CSV format.
pub fn print_csv(report: &Report) -> io::Result<()> {
    let stdout = io::stdout();
    write_csv(report, stdout.lock())
}
