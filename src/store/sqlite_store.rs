use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row, Transaction};
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::ObservationRow;
use crate::store::schema::{
    CREATE_NATURAL_KEY_INDEX, CREATE_OBSERVATION_TABLE, CREATE_STAGING_TABLE, DROP_STAGING_TABLE,
    INSERT_STAGING_ROW, MERGE_STAGING, OBSERVATION_TABLE, SELECT_COLUMNS, STAGING_TABLE,
};
use crate::store::{MergeOutcome, ObservationSink, StoredObservation};

/// Observation store backed by a single SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened observation store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Stage `rows` and merge them in one transaction.
    ///
    /// On any error the transaction is dropped uncommitted, leaving both the
    /// permanent and staging tables as they were.
    pub fn merge_batch(&mut self, rows: &[ObservationRow]) -> Result<MergeOutcome> {
        let tx = self.conn.transaction()?;

        ensure_schema(&tx)?;
        replace_staging(&tx, rows)?;
        let inserted = tx.execute(MERGE_STAGING, [])?;

        tx.commit()?;

        let skipped_untimed = rows.iter().filter(|r| !r.has_time()).count();
        let outcome = MergeOutcome {
            staged: rows.len(),
            inserted,
            skipped_existing: rows.len().saturating_sub(skipped_untimed + inserted),
            skipped_untimed,
        };
        info!(
            staged = outcome.staged,
            inserted = outcome.inserted,
            skipped_existing = outcome.skipped_existing,
            skipped_untimed = outcome.skipped_untimed,
            "merge committed"
        );

        Ok(outcome)
    }

    /// Total rows in the permanent table; zero before the first merge.
    pub fn count(&self) -> Result<usize> {
        self.count_table(OBSERVATION_TABLE)
    }

    /// Rows in the staging table left by the last merge.
    pub fn staged_count(&self) -> Result<usize> {
        self.count_table(STAGING_TABLE)
    }

    /// Most recent rows, newest first, ties broken by city.
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredObservation>> {
        if !self.table_exists(OBSERVATION_TABLE)? {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM {} ORDER BY time DESC, city LIMIT ?1",
            SELECT_COLUMNS, OBSERVATION_TABLE
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64], read_stored)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Rows stored under one natural key.
    pub fn find(&self, city: &str, time: NaiveDateTime) -> Result<Vec<StoredObservation>> {
        if !self.table_exists(OBSERVATION_TABLE)? {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM {} WHERE city = ?1 AND time = ?2",
            SELECT_COLUMNS, OBSERVATION_TABLE
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![city, time], read_stored)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn count_table(&self, table: &str) -> Result<usize> {
        if !self.table_exists(table)? {
            return Ok(0);
        }
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let found: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(found > 0)
    }

    #[cfg(test)]
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ObservationSink for SqliteStore {
    fn merge(&mut self, rows: &[ObservationRow]) -> Result<MergeOutcome> {
        self.merge_batch(rows)
    }
}

fn ensure_schema(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(CREATE_OBSERVATION_TABLE)?;
    tx.execute_batch(CREATE_NATURAL_KEY_INDEX)?;
    Ok(())
}

fn replace_staging(tx: &Transaction<'_>, rows: &[ObservationRow]) -> rusqlite::Result<()> {
    tx.execute_batch(DROP_STAGING_TABLE)?;
    tx.execute_batch(CREATE_STAGING_TABLE)?;

    let mut stmt = tx.prepare(INSERT_STAGING_ROW)?;
    for row in rows {
        stmt.execute(params![
            row.city,
            row.latitude,
            row.longitude,
            row.time,
            row.temp_c,
            row.humidity_pct,
            row.wind_speed_ms,
            row.weather_code,
            row.weather_description,
            row.aqi_eu,
            row.pm25,
            row.no2,
            row.o3,
        ])?;
    }

    Ok(())
}

fn read_stored(row: &Row<'_>) -> rusqlite::Result<StoredObservation> {
    Ok(StoredObservation {
        id: row.get(0)?,
        row: ObservationRow {
            city: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
            time: row.get(4)?,
            temp_c: row.get(5)?,
            humidity_pct: row.get(6)?,
            wind_speed_ms: row.get(7)?,
            weather_code: row.get(8)?,
            weather_description: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            aqi_eu: row.get(10)?,
            pm25: row.get(11)?,
            no2: row.get(12)?,
            o3: row.get(13)?,
        },
    })
}
