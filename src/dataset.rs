// src/dataset.rs

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three influenza series the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Tests,
    IcuAdmissions,
    HospitalAdmissions,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [
        Dataset::Tests,
        Dataset::IcuAdmissions,
        Dataset::HospitalAdmissions,
    ];

    pub fn metric(self) -> &'static str {
        match self {
            Dataset::Tests => "influenza_testing_positivityByWeek",
            Dataset::IcuAdmissions => "influenza_healthcare_ICUHDUadmissionRateByWeek",
            Dataset::HospitalAdmissions => "influenza_healthcare_hospitalAdmissionRateByWeek",
        }
    }

    /// Stem shared by the snapshot and chart files.
    pub fn slug(self) -> &'static str {
        match self {
            Dataset::Tests => "tests",
            Dataset::IcuAdmissions => "icu_admissions",
            Dataset::HospitalAdmissions => "hospital_admissions",
        }
    }

    pub fn snapshot_file(self) -> String {
        format!("{}.json", self.slug())
    }

    pub fn chart_file(self) -> String {
        format!("{}.svg", self.slug())
    }

    pub fn x_label(self) -> &'static str {
        "Date"
    }

    pub fn y_label(self) -> &'static str {
        match self {
            Dataset::Tests => "Test positivity (%)",
            Dataset::IcuAdmissions => "ICU/HDU admission rate per 100,000",
            Dataset::HospitalAdmissions => "Hospital admission rate per 100,000",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
