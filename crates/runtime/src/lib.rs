//! Process bootstrap shared by the Roast Planner binaries: tracing, config
//! files and metrics.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{info, Level};

pub mod metrics;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .try_init();
}

/// Read a JSON config file. Fields missing from the file take the type's
/// serde defaults.
pub fn load_config<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg = serde_json::from_str(&raw)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!(path = %path.display(), "config loaded");
    Ok(cfg)
}
