// src/reshape/table.rs

use chrono::{Datelike, NaiveDate};
use std::io::{self, Write};

/// Metric values indexed by date (rows) and age bucket (columns).
///
/// Dates are unique and strictly ascending; every cell holds a value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgeTable {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    /// Row-major, `values[row][col]`.
    values: Vec<Vec<f64>>,
}

impl AgeTable {
    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        debug_assert!(dates.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(values.iter().all(|row| row.len() == columns.len()));
        Self {
            dates,
            columns,
            values,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.column_index(label).is_some()
    }

    fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.values.get(i).map(Vec::as_slice)
    }

    pub fn value(&self, date: NaiveDate, label: &str) -> Option<f64> {
        let col = self.column_index(label)?;
        let row = self.dates.binary_search(&date).ok()?;
        Some(self.values[row][col])
    }

    /// `(date, value)` pairs down one column, or `None` if it does not exist.
    pub fn column(&self, label: &str) -> Option<Vec<(NaiveDate, f64)>> {
        let col = self.column_index(label)?;
        Some(
            self.dates
                .iter()
                .zip(&self.values)
                .map(|(d, row)| (*d, row[col]))
                .collect(),
        )
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.dates.iter().map(|d| d.year()).collect();
        years.dedup();
        years
    }

    /// Write as comma-separated text with a `date` header column.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "date")?;
        for c in &self.columns {
            write!(out, ",{}", c)?;
        }
        writeln!(out)?;
        for (d, row) in self.dates.iter().zip(&self.values) {
            write!(out, "{}", d.format("%Y-%m-%d"))?;
            for v in row {
                write!(out, ",{}", v)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
