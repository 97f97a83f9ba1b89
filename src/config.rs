use std::path::Path;

use anyhow::Context;
use chrono::TimeDelta;
use serde::Deserialize;

use crate::types::call::Floor;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub system: SystemConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub elevators: u32,
    pub floors: Floor,
    /// Seconds a reached call is kept before it is cleared.
    pub wait_secs: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            elevators: 3,
            floors: 10,
            wait_secs: 10,
        }
    }
}

impl SystemConfig {
    pub fn wait(&self) -> TimeDelta {
        i64::try_from(self.wait_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.elevators >= 1, "at least one elevator is required");
        anyhow::ensure!(
            self.floors >= 2,
            "at least two floors are required, got {}",
            self.floors
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// UDP address the `serve` mode binds to.
    pub listen: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            listen: "127.0.0.1:11000".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(raw: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(raw).context("failed to parse configuration")?;
        config.system.validate()?;
        Ok(config)
    }
}

/// Reads `path`, or falls back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        log::info!("{} not found, using default configuration", path.display());
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Config::from_toml(&raw).with_context(|| format!("invalid configuration in {}", path.display()))
}
