use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, ensure};

use patrifind::debounce::DEFAULT_DEBOUNCE;
use patrifind::search::EngineConfig;

use super::raw::RawConfig;
use crate::cli::CliArgs;

/// Fully resolved runtime settings for the demo binary.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub fixture: PathBuf,
    pub engine: EngineConfig,
    pub debounce: Duration,
}

impl ResolvedConfig {
    /// Merge defaults, the settings file and CLI flags, then validate.
    pub fn resolve(raw: &RawConfig, cli: &CliArgs) -> Result<Self> {
        let fixture = cli
            .fixture
            .clone()
            .or_else(|| raw.demo.fixture.clone())
            .ok_or_else(|| anyhow::anyhow!("no fixture given; pass --fixture or set demo.fixture"))?;

        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            identifier_scan_cap: raw
                .search
                .identifier_scan_cap
                .unwrap_or(defaults.identifier_scan_cap),
            token_scan_cap: raw.search.token_scan_cap.unwrap_or(defaults.token_scan_cap),
            bucket_cap: raw.search.bucket_cap.unwrap_or(defaults.bucket_cap),
            token_bucket_cap: raw
                .search
                .token_bucket_cap
                .unwrap_or(defaults.token_bucket_cap),
            min_token_len: raw.search.min_token_len.unwrap_or(defaults.min_token_len),
        };

        // Validate
        ensure!(engine.identifier_scan_cap > 0, "identifier_scan_cap must be greater than zero");
        ensure!(engine.token_scan_cap > 0, "token_scan_cap must be greater than zero");
        ensure!(engine.bucket_cap > 0, "bucket_cap must be greater than zero");
        ensure!(engine.token_bucket_cap > 0, "token_bucket_cap must be greater than zero");
        ensure!(engine.min_token_len > 0, "min_token_len must be at least 1");

        let debounce = raw
            .resolver
            .debounce_ms
            .map_or(DEFAULT_DEBOUNCE, Duration::from_millis);

        Ok(Self {
            fixture,
            engine,
            debounce,
        })
    }

    /// Print a short summary of the settings in effect.
    pub fn print_summary(&self) {
        println!("fixture: {}", self.fixture.display());
        println!(
            "caps: scan {}/{}  bucket {}/{}",
            self.engine.identifier_scan_cap,
            self.engine.token_scan_cap,
            self.engine.bucket_cap,
            self.engine.token_bucket_cap
        );
        println!("debounce: {:?}", self.debounce);
    }
}
