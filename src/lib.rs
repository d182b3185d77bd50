// src/lib.rs

//! Influenza surveillance dashboard: page metrics out of the statistics
//! API, pivot them by age group and chart them.

pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod plot;
pub mod record;
pub mod reshape;
pub mod snapshot;

pub use config::DashboardConfig;
pub use dataset::Dataset;
pub use error::{FetchError, RefreshError, ReshapeError};
pub use record::RawRecord;
