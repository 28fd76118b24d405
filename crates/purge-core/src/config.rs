use crate::backoff::{BackoffConfig, InvalidBackoffConfig};
use crate::purge::PurgePolicy;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct BackoffSettings {
    pub delay_ms: u64,
    pub factor: f64,
    pub timeout_ms: u64,
}

impl BackoffSettings {
    pub fn to_config(&self) -> Result<BackoffConfig, InvalidBackoffConfig> {
        BackoffConfig::new(
            Duration::from_millis(self.delay_ms),
            self.factor,
            Duration::from_millis(self.timeout_ms),
        )
    }
}

/// Backoff settings for the two retry layers of a purge, as read from disk.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PurgeConfig {
    pub check: BackoffSettings,
    pub operation: BackoffSettings,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            check: BackoffSettings {
                delay_ms: 1_000,
                factor: 2.0,
                timeout_ms: 2 * 60 * 1_000,
            },
            operation: BackoffSettings {
                delay_ms: 10_000,
                factor: 2.0,
                timeout_ms: 2 * 60 * 1_000,
            },
        }
    }
}

impl PurgeConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).context("read config")?;
        let config = serde_json::from_str(&data).context("parse config")?;
        Ok(config)
    }

    pub fn policy(&self) -> Result<PurgePolicy, InvalidBackoffConfig> {
        Ok(PurgePolicy {
            check: self.check.to_config()?,
            operation: self.operation.to_config()?,
        })
    }
}
