use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::models::{ObservationRow, SnapshotRecord};

/// CSV snapshot of a normalized batch. Overwritten on every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSnapshot;

impl CsvSnapshot {
    pub fn new() -> Self {
        Self
    }

    /// Write `rows` with a header, replacing any existing file.
    pub fn write_rows(&self, rows: &[ObservationRow], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        if rows.is_empty() {
            writer.write_record(SNAPSHOT_HEADER)?;
        }
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = rows.len(), "wrote CSV snapshot");
        Ok(())
    }

    /// Read a snapshot back; rows failing to decode abort the read.
    pub fn read_records(&self, path: &Path) -> Result<Vec<SnapshotRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<SnapshotRecord>, csv::Error>>()?;
        Ok(records)
    }
}

const SNAPSHOT_HEADER: &[&str] = &[
    "city",
    "latitude",
    "longitude",
    "time",
    "temp_c",
    "humidity_pct",
    "wind_speed_ms",
    "weather_code",
    "weather_description",
    "aqi_eu",
    "pm25",
    "no2",
    "o3",
];
