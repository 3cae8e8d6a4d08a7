use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Settings file shape before resolution. Every field is optional; defaults
/// and CLI flags fill the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub search: SearchSection,
    pub resolver: ResolverSection,
    pub demo: DemoSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub identifier_scan_cap: Option<usize>,
    pub token_scan_cap: Option<usize>,
    pub bucket_cap: Option<usize>,
    pub token_bucket_cap: Option<usize>,
    pub min_token_len: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverSection {
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DemoSection {
    pub fixture: Option<PathBuf>,
}

/// Layer the optional settings file under `PATRIFIND_`-prefixed environment
/// variables.
pub fn load_raw(settings_file: Option<&Path>) -> Result<RawConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = settings_file {
        builder = builder.add_source(File::from(path.to_path_buf()));
    }
    builder = builder.add_source(Environment::with_prefix("patrifind").separator("__"));
    builder.build()?.try_deserialize()
}
