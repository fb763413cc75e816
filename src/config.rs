use crate::assembly::DEFAULT_TIMEOUT_SECONDS;
use crate::geo::{GeoCatalog, GeoParams, GeoReference};
use crate::resilience::RetryPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Scan geometry for one satellite, or for one region of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEntry {
    pub satellite: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(flatten)]
    pub params: GeoParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Seconds a frame may stay incomplete before the sweep acts on it
    pub timeout_seconds: u64,

    /// Extra accumulation windows granted to a partial frame
    pub max_retries: u32,

    pub sweep_interval_seconds: u64,

    /// Initial crop flag for new frames
    pub crop_image: bool,

    pub geo: Vec<GeoEntry>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_retries: RetryPolicy::default().max_retries,
            sweep_interval_seconds: 5,
            crop_image: false,
            geo: Vec::new(),
        }
    }
}

impl AssemblerConfig {
    pub fn from_json(config: Value) -> Result<Self> {
        let config: Self =
            serde_json::from_value(config).context("Failed to parse assembler config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config file, writing a default one first if it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let exists = fs::try_exists(path)
            .await
            .with_context(|| format!("Failed to check config file {}", path.display()))?;
        if !exists {
            Self::default().save(path).await?;
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)
            .await
            .context("Failed to write temporary config file")?;
        fs::rename(&temp_path, path)
            .await
            .context("Failed to atomically update config file")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval_seconds == 0 {
            anyhow::bail!("sweep_interval_seconds must be greater than zero");
        }
        for entry in &self.geo {
            let unusable = |factor: f64| !factor.is_finite() || factor == 0.0;
            if unusable(entry.params.column_scale_factor) || unusable(entry.params.line_scale_factor)
            {
                anyhow::bail!(
                    "Scale factors for {} must be finite and non-zero",
                    entry.satellite
                );
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> chrono::Duration {
        i64::try_from(self.timeout_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }

    pub fn build_catalog(&self) -> GeoCatalog {
        let mut catalog = GeoCatalog::new();
        for entry in &self.geo {
            catalog.register(
                entry.satellite.clone(),
                entry.region.as_deref(),
                GeoReference::from(entry.params.clone()),
            );
        }
        catalog
    }
}
