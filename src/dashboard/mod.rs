// src/dashboard/mod.rs

//! Per-dataset panels and the refresh flow that feeds them.

pub mod panel;

pub use panel::{Panel, RefreshStatus};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::error::RefreshError;
use crate::fetch::MetricSource;
use crate::plot::ChartPair;
use crate::snapshot::load_snapshot;

/// One panel per dataset. Each refresh touches only its own panel.
pub struct Dashboard {
    panels: Vec<Panel>,
}

impl Dashboard {
    pub fn new(panels: Vec<Panel>) -> Self {
        Self { panels }
    }

    /// Build panels from the snapshot files under `config.snapshot_dir`.
    pub fn from_snapshots(config: &DashboardConfig, datasets: &[Dataset]) -> Result<Self> {
        let mut panels = Vec::with_capacity(datasets.len());
        for &dataset in datasets {
            let path = config.snapshot_dir.join(dataset.snapshot_file());
            let records = load_snapshot(&path)?;
            let panel = Panel::from_records(dataset, &records, config.label_aliases.clone())
                .with_context(|| format!("reshaping snapshot {}", path.display()))?;
            info!(%dataset, rows = panel.table().len(), "panel ready");
            panels.push(panel);
        }
        Ok(Self::new(panels))
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, dataset: Dataset) -> Option<&Panel> {
        self.panels.iter().find(|p| p.dataset() == dataset)
    }

    pub fn panel_mut(&mut self, dataset: Dataset) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.dataset() == dataset)
    }

    /// Refresh `dataset`'s panel from `source`. Panels not loaded are
    /// reported as an unclassified failure.
    pub fn refresh<S: MetricSource + ?Sized>(
        &mut self,
        dataset: Dataset,
        source: &S,
    ) -> Result<&ChartPair, RefreshError> {
        let panel = self.panel_mut(dataset).ok_or_else(|| {
            RefreshError::Other(format!("no panel loaded for {}", dataset).into())
        })?;
        panel.refresh(source)
    }

    /// Write every panel's charts into `out_dir`.
    pub fn write_all(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        self.panels.iter().map(|p| p.write_svg(out_dir)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::record::RawRecord;
    use crate::snapshot::save_snapshot;
    use tempfile::tempdir;

    struct Fixed(Vec<RawRecord>);

    impl MetricSource for Fixed {
        fn fetch(&self, _metric: &str) -> Result<Vec<RawRecord>, FetchError> {
            Ok(self.0.clone())
        }
    }

    fn config_with_snapshots(dir: &Path) -> DashboardConfig {
        let config = DashboardConfig {
            snapshot_dir: dir.join("data"),
            output_dir: dir.join("plots"),
            ..DashboardConfig::default()
        };
        for (i, dataset) in Dataset::ALL.iter().enumerate() {
            let records = vec![
                RawRecord::new("2024-01-01", "all", i as f64),
                RawRecord::new("2024-01-01", "5-14", i as f64 + 0.5),
            ];
            save_snapshot(&config.snapshot_dir.join(dataset.snapshot_file()), &records).unwrap();
        }
        config
    }

    #[test]
    fn test_refresh_updates_only_its_own_panel() {
        let dir = tempdir().unwrap();
        let config = config_with_snapshots(dir.path());
        let mut dash = Dashboard::from_snapshots(&config, &Dataset::ALL).unwrap();
        let icu_before = dash.panel(Dataset::IcuAdmissions).unwrap().table().clone();

        let source = Fixed(vec![
            RawRecord::new("2024-01-01", "all", 9.0),
            RawRecord::new("2024-01-08", "all", 10.0),
        ]);
        dash.refresh(Dataset::HospitalAdmissions, &source).unwrap();

        let hosp = dash.panel(Dataset::HospitalAdmissions).unwrap();
        assert_eq!(hosp.table().len(), 2);
        assert_eq!(hosp.status(), RefreshStatus::Refreshed);

        let icu = dash.panel(Dataset::IcuAdmissions).unwrap();
        assert_eq!(icu.table(), &icu_before);
        assert_eq!(icu.status(), RefreshStatus::Ready);
    }

    #[test]
    fn test_snapshot_labels_are_canonical() {
        let dir = tempdir().unwrap();
        let config = config_with_snapshots(dir.path());
        let dash = Dashboard::from_snapshots(&config, &[Dataset::Tests]).unwrap();
        assert_eq!(dash.panels().len(), 1);
        assert_eq!(
            dash.panel(Dataset::Tests).unwrap().age_options(),
            &["all".to_string(), "05-14".to_string()]
        );
    }

    #[test]
    fn test_refresh_unknown_panel() {
        let mut dash = Dashboard::new(Vec::new());
        let err = dash
            .refresh(Dataset::Tests, &Fixed(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, RefreshError::Other(_)));
    }

    #[test]
    fn test_write_all() {
        let dir = tempdir().unwrap();
        let config = config_with_snapshots(dir.path());
        let dash = Dashboard::from_snapshots(&config, &Dataset::ALL).unwrap();
        let written = dash.write_all(&config.output_dir).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let dir = tempdir().unwrap();
        let config = DashboardConfig {
            snapshot_dir: dir.path().to_path_buf(),
            ..DashboardConfig::default()
        };
        assert!(Dashboard::from_snapshots(&config, &[Dataset::Tests]).is_err());
    }
}
