//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan reports.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, write_csv};
pub use json_format::{print_json, render_json};
pub use plain::{
    print_error, print_launch_header, print_plain, print_warning, truncate_string, write_plain,
};

use crate::cli::OutputFormat;
use crate::nmap::Report;
use std::io;

/// Format and print a report according to the specified format.
///
/// `color` only affects JSON highlighting; plain output follows the terminal.
pub fn format_results(report: &Report, format: OutputFormat, color: bool) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(report),
        OutputFormat::Json => json_format::print_json(report, color),
        OutputFormat::Csv => csv_format::print_csv(report),
    }
}
