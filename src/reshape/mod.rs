// src/reshape/mod.rs

//! Pivot raw `{date, age, metric_value}` records into an [`AgeTable`].

pub mod labels;
pub mod table;

pub use labels::{LabelCanonicalizer, AGGREGATE_LABEL};
pub use table::AgeTable;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use crate::error::ReshapeError;
use crate::record::RawRecord;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern should compile"));

/// Strict `YYYY-MM-DD`; chrono alone would also take `2024-1-1`.
pub fn parse_date(s: &str) -> Result<NaiveDate, ReshapeError> {
    let malformed = || ReshapeError::MalformedDate {
        date: s.to_string(),
    };
    if !DATE_RE.is_match(s) {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| malformed())
}

/// Group `records` by date and canonical age label.
///
/// Columns appear in the order their labels are first seen. A later record
/// for the same `(date, label)` cell overwrites an earlier one, and cells
/// nobody wrote are `0`. Rows come out in ascending date order.
pub fn reshape(
    records: &[RawRecord],
    labels: &LabelCanonicalizer,
) -> Result<AgeTable, ReshapeError> {
    let mut columns: Vec<String> = Vec::new();
    let mut col_of: HashMap<&str, usize> = HashMap::new();
    let mut cells: HashMap<&str, HashMap<usize, f64>> = HashMap::new();

    for r in records {
        let label = labels.canonical(&r.age);
        let col = *col_of.entry(label).or_insert_with(|| {
            columns.push(label.to_string());
            columns.len() - 1
        });
        cells
            .entry(r.date.as_str())
            .or_default()
            .insert(col, r.metric_value);
    }

    let mut rows = cells
        .into_iter()
        .map(|(date, row)| Ok((parse_date(date)?, row)))
        .collect::<Result<Vec<_>, ReshapeError>>()?;
    rows.sort_by_key(|(date, _)| *date);

    let (dates, values): (Vec<NaiveDate>, Vec<Vec<f64>>) = rows
        .into_iter()
        .map(|(date, row)| {
            let filled = (0..columns.len())
                .map(|c| row.get(&c).copied().unwrap_or(0.0))
                .collect();
            (date, filled)
        })
        .unzip();

    debug!(
        records = records.len(),
        rows = dates.len(),
        columns = columns.len(),
        "reshaped"
    );
    Ok(AgeTable::from_parts(dates, columns, values))
}
