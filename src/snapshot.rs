// src/snapshot.rs

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};
use tracing::info;

use crate::record::RawRecord;

/// Read a snapshot: a flat JSON array of records.
pub fn load_snapshot(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path).with_context(|| format!("opening snapshot {}", path.display()))?;
    let records: Vec<RawRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "loaded snapshot");
    Ok(records)
}

/// Write `records` as a snapshot, creating parent directories as needed.
pub fn save_snapshot(path: &Path, records: &[RawRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("creating snapshot {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, records)
        .with_context(|| format!("writing snapshot {}", path.display()))?;
    out.flush()?;
    info!(path = %path.display(), records = records.len(), "saved snapshot");
    Ok(())
}
