//! Tracing subscriber set-up.
//!
//! Diagnostics go to stderr so stdout carries only the report.

use anyhow::{Context, Result};
use std::io;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Default level for the verbosity flags.
pub fn default_level(verbose: bool, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the flag-derived level.
pub fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose, quiet).into())
        .from_env()
        .context("Failed to create environment filter")?;

    let console_layer = fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(verbose);

    Registry::default()
        .with(filter)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false, false), Level::WARN);
        assert_eq!(default_level(true, false), Level::DEBUG);
        assert_eq!(default_level(false, true), Level::ERROR);
        assert_eq!(default_level(true, true), Level::ERROR);
    }
}
