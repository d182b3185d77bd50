// src/plot/model.rs

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use tracing::warn;

use crate::reshape::{AgeTable, AGGREGATE_LABEL};

/// Which rows and columns the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub years: BTreeSet<i32>,
    pub age_groups: Vec<String>,
}

impl Selection {
    pub fn new(years: impl IntoIterator<Item = i32>, age_groups: impl IntoIterator<Item = String>) -> Self {
        Self {
            years: years.into_iter().collect(),
            age_groups: age_groups.into_iter().collect(),
        }
    }

    /// Most recent year, every column except the aggregate.
    pub fn default_for(table: &AgeTable) -> Self {
        Self {
            years: table.years().last().copied().into_iter().collect(),
            age_groups: table
                .columns()
                .iter()
                .filter(|c| c.as_str() != AGGREGATE_LABEL)
                .cloned()
                .collect(),
        }
    }

    fn includes(&self, date: &NaiveDate) -> bool {
        self.years.contains(&date.year())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub legend: bool,
}

impl Chart {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    /// Earliest and latest dates across every series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.series.iter().flat_map(|s| s.points.iter().map(|(d, _)| *d));
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Smallest and largest values across every series.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut values = self.series.iter().flat_map(|s| s.points.iter().map(|(_, v)| *v));
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// The two side-by-side charts for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPair {
    /// The `all` column, whatever the age selection says.
    pub aggregate: Chart,
    /// One line per selected age group.
    pub by_age: Chart,
}

/// Cut `table` down to `selection` and lay it out as two charts.
///
/// Years with no rows and an empty age selection both give charts without
/// points rather than an error.
pub fn build_charts(table: &AgeTable, selection: &Selection, x_label: &str, y_label: &str) -> ChartPair {
    let pick = |label: &str| -> Option<Series> {
        let points = table
            .column(label)?
            .into_iter()
            .filter(|(d, _)| selection.includes(d))
            .collect();
        Some(Series {
            label: label.to_string(),
            points,
        })
    };

    let aggregate = Chart {
        title: format!("{} (all ages)", y_label),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        series: pick(AGGREGATE_LABEL).into_iter().collect(),
        legend: false,
    };

    let mut series = Vec::with_capacity(selection.age_groups.len());
    for label in &selection.age_groups {
        match pick(label) {
            Some(s) => series.push(s),
            None => warn!(age = %label, "selected age group not in table, skipping"),
        }
    }
    let by_age = Chart {
        title: format!("{} by age group", y_label),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        series,
        legend: true,
    };

    ChartPair { aggregate, by_age }
}
