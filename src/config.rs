// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use crate::fetch::{rate_limit::DEFAULT_REQUESTS_PER_SECOND, MetricConfig, RateLimiter};
use crate::reshape::LabelCanonicalizer;

pub const DEFAULT_API_HOST: &str = "https://api.ukhsa-dashboard.data.gov.uk";

/// Runtime settings, read from YAML. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_host: String,
    pub requests_per_second: u32,
    pub request_timeout_secs: u64,
    pub snapshot_dir: PathBuf,
    pub output_dir: PathBuf,
    pub metric: MetricConfig,
    /// Legacy age label -> canonical column name.
    pub label_aliases: LabelCanonicalizer,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            request_timeout_secs: 30,
            snapshot_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("plots"),
            metric: MetricConfig::default(),
            label_aliases: LabelCanonicalizer::default(),
        }
    }
}

impl DashboardConfig {
    /// Read `path` if given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!(?config, "loaded config");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Limiter shared by every client built from this config.
    ///
    /// The default rate reuses the process-wide limiter.
    pub fn rate_limiter(&self) -> RateLimiter {
        if self.requests_per_second == DEFAULT_REQUESTS_PER_SECOND {
            RateLimiter::shared()
        } else {
            RateLimiter::per_second(self.requests_per_second)
        }
    }
}
