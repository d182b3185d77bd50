// src/fetch/metric.rs

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{
    client::{PaginatedClient, MAX_PAGE_SIZE},
    endpoint::Endpoint,
    filters::Filters,
    rate_limit::RateLimiter,
    transport::Transport,
};
use crate::error::FetchError;
use crate::record::RawRecord;

/// Everything about an endpoint except the metric name.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct MetricConfig {
    pub theme: String,
    pub sub_theme: String,
    pub topic: String,
    pub geography_type: String,
    pub geography: String,
}

impl Default for MetricConfig {
    /// Nation-level influenza surveillance for England.
    fn default() -> Self {
        Self {
            theme: "infectious_disease".into(),
            sub_theme: "respiratory".into(),
            topic: "Influenza".into(),
            geography_type: "Nation".into(),
            geography: "England".into(),
        }
    }
}

impl MetricConfig {
    pub fn endpoint(&self, metric: &str) -> Endpoint {
        Endpoint {
            theme: self.theme.clone(),
            sub_theme: self.sub_theme.clone(),
            topic: self.topic.clone(),
            geography_type: self.geography_type.clone(),
            geography: self.geography.clone(),
            metric: metric.to_string(),
        }
    }
}

/// Fetch the whole of `metric` with default filters at the largest page size.
///
/// No retries: whatever the client raises is returned as is.
#[instrument(level = "info", skip(config, host, transport, limiter))]
pub fn fetch_metric<T: Transport>(
    config: &MetricConfig,
    host: &str,
    transport: T,
    limiter: RateLimiter,
    metric: &str,
) -> Result<Vec<RawRecord>, FetchError> {
    let endpoint = config.endpoint(metric);
    let mut client = PaginatedClient::new(&endpoint, host, transport, limiter)?;
    let records = client.get_all_pages(&Filters::default(), MAX_PAGE_SIZE)?;
    info!(records = records.len(), "metric fetched");
    Ok(records)
}

/// Anything that can produce the full record set for a metric name.
pub trait MetricSource {
    fn fetch(&self, metric: &str) -> Result<Vec<RawRecord>, FetchError>;
}

/// `MetricSource` backed by the live API.
pub struct ApiSource<T> {
    config: MetricConfig,
    host: String,
    transport: T,
    limiter: RateLimiter,
}

impl<T: Transport> ApiSource<T> {
    pub fn new(
        config: MetricConfig,
        host: impl Into<String>,
        transport: T,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            config,
            host: host.into(),
            transport,
            limiter,
        }
    }
}

impl<T: Transport> MetricSource for ApiSource<T> {
    fn fetch(&self, metric: &str) -> Result<Vec<RawRecord>, FetchError> {
        fetch_metric(
            &self.config,
            &self.host,
            &self.transport,
            self.limiter.clone(),
            metric,
        )
    }
}
