// src/record.rs

use serde::{Deserialize, Serialize};

/// One observation as served by the metrics API or stored in a snapshot.
///
/// The API returns more fields than these (theme, stratum, sex, ...);
/// anything not listed here is ignored on decode.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RawRecord {
    /// Calendar date as `YYYY-MM-DD`. Parsed only when reshaping.
    pub date: String,
    pub age: String,
    pub metric_value: f64,
}

impl RawRecord {
    pub fn new(date: impl Into<String>, age: impl Into<String>, metric_value: f64) -> Self {
        Self {
            date: date.into(),
            age: age.into(),
            metric_value,
        }
    }
}

/// One page of a paginated metric response.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Page {
    pub next: Option<String>,
    pub count: u64,
    pub results: Vec<RawRecord>,
}
