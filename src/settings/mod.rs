//! Settings loading for the demo binary: TOML file and environment layered
//! under CLI flags.

mod raw;
mod resolved;

use anyhow::{Context, Result};

pub use resolved::ResolvedConfig;

use crate::cli::CliArgs;

/// Primary entry point: load and resolve settings for the given CLI.
pub fn load(cli: &CliArgs) -> Result<ResolvedConfig> {
    let raw = raw::load_raw(cli.settings.as_deref()).context("failed to load settings")?;
    ResolvedConfig::resolve(&raw, cli)
}
