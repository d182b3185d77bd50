// src/dashboard/panel.rs

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

use crate::dataset::Dataset;
use crate::error::{RefreshError, ReshapeError};
use crate::fetch::MetricSource;
use crate::plot::{build_charts, render_svg, ChartPair, Selection, DEFAULT_SIZE};
use crate::record::RawRecord;
use crate::reshape::{reshape, AgeTable, LabelCanonicalizer};

/// Where a panel's refresh control stands.
///
/// Only `Ready` accepts a refresh; every outcome disables it until
/// [`Panel::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    Ready,
    Refreshed,
    Disconnected,
    Failed,
}

impl RefreshStatus {
    pub fn is_enabled(self) -> bool {
        self == RefreshStatus::Ready
    }

    /// Short text shown next to the refresh control.
    pub fn indicator(self) -> &'static str {
        match self {
            RefreshStatus::Ready => "refresh",
            RefreshStatus::Refreshed => "refreshed",
            RefreshStatus::Disconnected => "disconnected",
            RefreshStatus::Failed => "failed",
        }
    }
}

/// One dataset's table, filters and the charts last drawn from them.
pub struct Panel {
    dataset: Dataset,
    labels: LabelCanonicalizer,
    table: AgeTable,
    selection: Selection,
    charts: ChartPair,
    status: RefreshStatus,
}

impl Panel {
    pub fn new(dataset: Dataset, table: AgeTable, labels: LabelCanonicalizer) -> Self {
        let selection = Selection::default_for(&table);
        let charts = build_charts(&table, &selection, dataset.x_label(), dataset.y_label());
        Self {
            dataset,
            labels,
            table,
            selection,
            charts,
            status: RefreshStatus::Ready,
        }
    }

    pub fn from_records(
        dataset: Dataset,
        records: &[RawRecord],
        labels: LabelCanonicalizer,
    ) -> Result<Self, ReshapeError> {
        let table = reshape(records, &labels)?;
        Ok(Self::new(dataset, table, labels))
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn table(&self) -> &AgeTable {
        &self.table
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn charts(&self) -> &ChartPair {
        &self.charts
    }

    pub fn status(&self) -> RefreshStatus {
        self.status
    }

    pub fn year_options(&self) -> Vec<i32> {
        self.table.years()
    }

    pub fn age_options(&self) -> &[String] {
        self.table.columns()
    }

    /// Change the filters and redraw.
    pub fn select(&mut self, selection: Selection) -> &ChartPair {
        self.selection = selection;
        self.render()
    }

    /// Rebuild the charts from the current table and selection.
    pub fn render(&mut self) -> &ChartPair {
        self.charts = build_charts(
            &self.table,
            &self.selection,
            self.dataset.x_label(),
            self.dataset.y_label(),
        );
        &self.charts
    }

    /// Re-enable the refresh control.
    pub fn reset(&mut self) {
        self.status = RefreshStatus::Ready;
    }

    /// Fetch this panel's metric again, rebuild the table and redraw.
    ///
    /// On any failure the table and charts stay exactly as they were, and
    /// the panel is disabled with a status matching the failure class.
    #[instrument(level = "info", skip(self, source), fields(dataset = %self.dataset))]
    pub fn refresh<S: MetricSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<&ChartPair, RefreshError> {
        if !self.status.is_enabled() {
            return Err(RefreshError::Disabled);
        }

        let outcome = source
            .fetch(self.dataset.metric())
            .map_err(RefreshError::from_fetch)
            .and_then(|records| reshape(&records, &self.labels).map_err(RefreshError::from));

        match outcome {
            Ok(table) => {
                self.selection = carry_selection(&self.selection, &table);
                self.table = table;
                self.status = RefreshStatus::Refreshed;
                info!(rows = self.table.len(), "refreshed");
                Ok(self.render())
            }
            Err(err) => {
                self.status = match err {
                    RefreshError::Connectivity(_) => RefreshStatus::Disconnected,
                    _ => RefreshStatus::Failed,
                };
                error!(error = %err, status = self.status.indicator(), "refresh failed");
                Err(err)
            }
        }
    }

    /// Write the current charts to `<out_dir>/<dataset>.svg`.
    pub fn write_svg(&self, out_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
        let path = out_dir.join(self.dataset.chart_file());
        render_svg(&self.charts, &path, DEFAULT_SIZE)?;
        Ok(path)
    }
}

/// Keep whatever part of `old` still exists in `table`; fall back to the
/// defaults for a filter only when it had values and none of them survive.
/// An empty filter stays empty.
fn carry_selection(old: &Selection, table: &AgeTable) -> Selection {
    let defaults = Selection::default_for(table);
    let years = table.years();

    let kept_years: Vec<i32> = old
        .years
        .iter()
        .copied()
        .filter(|y| years.contains(y))
        .collect();
    let kept_ages: Vec<String> = old
        .age_groups
        .iter()
        .filter(|a| table.has_column(a))
        .cloned()
        .collect();

    Selection {
        years: if kept_years.is_empty() && !old.years.is_empty() {
            defaults.years
        } else {
            kept_years.into_iter().collect()
        },
        age_groups: if kept_ages.is_empty() && !old.age_groups.is_empty() {
            defaults.age_groups
        } else {
            kept_ages
        },
    }
}
