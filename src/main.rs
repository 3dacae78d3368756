use anyhow::Result;
use clap::Parser;
use scanplate::cli::{Cli, Commands};
use scanplate::config::AppSettings;
use scanplate::{logging, output};
use std::process::ExitCode;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => AppSettings::load_from(path)?,
        None => AppSettings::load()?,
    };

    logging::init_logging(cli.verbose || settings.verbose, cli.quiet)?;
    debug!(?settings, "settings loaded");

    match &cli.command {
        Commands::Scan(cmd) => cmd.execute(&settings, cli.quiet).await?,
        Commands::Templates(cmd) => cmd.execute()?,
    }

    Ok(())
}
