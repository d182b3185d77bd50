// src/fetch/filters.rs

use serde::{Deserialize, Serialize};

/// Optional query filters accepted by the metric endpoints.
///
/// Unset fields are left out of the request entirely.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Filters {
    pub stratum: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub epiweek: Option<u32>,
    pub date: Option<String>,
    pub in_reporting_delay_period: Option<bool>,
}

impl Filters {
    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Non-null filters as `(key, value)` query pairs, in declaration order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(v) = value {
                pairs.push((key, v));
            }
        };
        push("stratum", self.stratum.clone());
        push("age", self.age.clone());
        push("sex", self.sex.clone());
        push("year", self.year.map(|v| v.to_string()));
        push("month", self.month.map(|v| v.to_string()));
        push("epiweek", self.epiweek.map(|v| v.to_string()));
        push("date", self.date.clone());
        push(
            "in_reporting_delay_period",
            self.in_reporting_delay_period.map(|v| v.to_string()),
        );
        pairs
    }
}
