//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! `[engine.*]` key is optional and falls back to the built-in defaults, so
//! a config file only needs to name the values it tunes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::strategy::EngineConfig;

/// Env var that overrides the config file path.
pub const CONFIG_PATH_ENV: &str = "PROFIT_INTEL_CONFIG";

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub run: RunConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    pub dealer_id: String,
    /// Inventory snapshot (JSON) to evaluate.
    pub snapshot_path: String,
    /// Where the action-queue report is written.
    pub report_path: String,
    /// Vehicles evaluated in parallel.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    8
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Config path from `PROFIT_INTEL_CONFIG`, or the default.
    pub fn resolve_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Validate run settings and every engine section.
    pub fn validate(&self) -> Result<()> {
        if self.run.max_concurrency == 0 {
            anyhow::bail!("run.max_concurrency must be at least 1");
        }
        self.engine.validate()?;
        Ok(())
    }
}
