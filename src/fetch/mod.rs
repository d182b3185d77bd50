// src/fetch/mod.rs

//! Paginated access to the surveillance metrics API.

pub mod client;
pub mod endpoint;
pub mod filters;
pub mod metric;
pub mod rate_limit;
pub mod transport;

pub use client::{PaginatedClient, MAX_PAGE_SIZE};
pub use endpoint::Endpoint;
pub use filters::Filters;
pub use metric::{fetch_metric, ApiSource, MetricConfig, MetricSource};
pub use rate_limit::RateLimiter;
pub use transport::{HttpTransport, Transport};
