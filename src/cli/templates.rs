//! Templates subcommand implementation.
//!
//! Handles `scanplate templates` for listing the template table.

use crate::error::CliResult;
use crate::templates::{self, Category, Template};
use clap::Parser;
use console::style;
use std::io::{self, Write};

/// List the available scan templates.
#[derive(Parser, Debug)]
pub struct TemplatesCommand {
    /// Only show templates of one category
    #[arg(short, long, value_enum)]
    pub category: Option<Category>,
}

impl TemplatesCommand {
    /// Execute the templates command.
    pub fn execute(&self) -> CliResult<()> {
        let stdout = io::stdout();
        self.write_table(stdout.lock())?;
        Ok(())
    }

    fn selected(&self) -> Vec<&'static Template> {
        match self.category {
            Some(category) => templates::in_category(category).collect(),
            None => templates::TEMPLATES.iter().collect(),
        }
    }

    fn write_table<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(
            out,
            "  {:>3}  {:<30}  {:<10}  {}",
            style("ID").bold(),
            style("FLAG").bold(),
            style("CATEGORY").bold(),
            style("DESCRIPTION").bold()
        )?;
        writeln!(
            out,
            "  {}",
            style("───────────────────────────────────────────────────────────────").dim()
        )?;

        for template in self.selected() {
            let description = if template.privileged {
                format!("{} {}", template.description, style("(root)").yellow())
            } else {
                template.description.to_string()
            };

            writeln!(
                out,
                "  {:>3}  {:<30}  {:<10}  {}",
                template.id,
                style(template.flag.trim_end()).cyan(),
                template.category(),
                description
            )?;
        }

        writeln!(out)?;
        Ok(())
    }
}
