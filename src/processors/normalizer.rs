use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::models::{weather_code, ObservationRow, RawObservation, SnapshotRecord};
use crate::processors::BatchReport;
use crate::utils::constants::{COORDINATE_SCALE, MEASUREMENT_SCALE};
use crate::utils::{parse_observation_time, round_opt, to_int};

/// A record under canonical field names, values not yet coerced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedRecord {
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time: Option<String>,
    pub temp_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    pub weather_code: Option<f64>,
    pub aqi_eu: Option<f64>,
    pub pm25: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
}

impl From<&RawObservation> for AlignedRecord {
    fn from(raw: &RawObservation) -> Self {
        Self {
            city: raw.city.clone(),
            latitude: Some(raw.lat),
            longitude: Some(raw.lon),
            time: raw.time.clone(),
            temp_c: raw.temperature_2m,
            humidity_pct: raw.relative_humidity_2m,
            wind_speed_ms: raw.wind_speed_10m,
            weather_code: raw.weather_code,
            aqi_eu: raw.european_aqi,
            pm25: raw.pm2_5,
            no2: raw.nitrogen_dioxide,
            o3: raw.ozone,
        }
    }
}

impl From<SnapshotRecord> for AlignedRecord {
    fn from(record: SnapshotRecord) -> Self {
        Self {
            city: record.city,
            latitude: record.latitude,
            longitude: record.longitude,
            time: record.time,
            temp_c: record.temp_c,
            humidity_pct: record.humidity_pct,
            wind_speed_ms: record.wind_speed_ms,
            weather_code: record.weather_code,
            aqi_eu: record.aqi_eu,
            pm25: record.pm25,
            no2: record.no2,
            o3: record.o3,
        }
    }
}

/// Output of one normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub rows: Vec<ObservationRow>,
    pub report: BatchReport,
}

/// Reshapes collected records into canonical rows. Performs no I/O.
pub struct Normalizer {
    measurement_scale: u32,
    coordinate_scale: u32,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            measurement_scale: MEASUREMENT_SCALE,
            coordinate_scale: COORDINATE_SCALE,
        }
    }

    /// Normalize a freshly collected batch.
    pub fn normalize(&self, raw: &[RawObservation]) -> NormalizedBatch {
        self.normalize_aligned(raw.iter().map(AlignedRecord::from).collect())
    }

    /// Normalize rows read back from a CSV snapshot.
    pub fn normalize_snapshot(&self, records: Vec<SnapshotRecord>) -> NormalizedBatch {
        self.normalize_aligned(records.into_iter().map(AlignedRecord::from).collect())
    }

    fn normalize_aligned(&self, aligned: Vec<AlignedRecord>) -> NormalizedBatch {
        let input_records = aligned.len();
        let rows: Vec<ObservationRow> = aligned.into_iter().map(|r| self.to_row(r)).collect();
        let (rows, duplicates_dropped) = deduplicate(rows);

        let report = BatchReport::build(input_records, duplicates_dropped, &rows);
        for city in &report.untimed_rows {
            warn!(city = %city, "observation time missing or unparsable");
        }
        for (city, code) in &report.unknown_weather_codes {
            warn!(city = %city, code = ?code, "weather code not in table");
        }
        debug!(
            input = input_records,
            output = rows.len(),
            duplicates_dropped,
            "normalized batch"
        );

        NormalizedBatch { rows, report }
    }

    /// Timestamp parsing, code resolution and rounding for one record.
    pub fn to_row(&self, record: AlignedRecord) -> ObservationRow {
        let time = record.time.as_deref().and_then(parse_observation_time);
        let weather_code = to_int(record.weather_code);

        ObservationRow {
            city: record.city,
            latitude: round_opt(record.latitude, self.coordinate_scale),
            longitude: round_opt(record.longitude, self.coordinate_scale),
            time,
            temp_c: round_opt(record.temp_c, self.measurement_scale),
            humidity_pct: to_int(record.humidity_pct),
            wind_speed_ms: round_opt(record.wind_speed_ms, self.measurement_scale),
            weather_code,
            weather_description: weather_code::describe(weather_code).to_string(),
            aqi_eu: to_int(record.aqi_eu),
            pm25: round_opt(record.pm25, self.measurement_scale),
            no2: round_opt(record.no2, self.measurement_scale),
            o3: round_opt(record.o3, self.measurement_scale),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep the first row per `(city, time)`, preserving input order.
///
/// Rows without a time share the key `(city, None)`.
pub fn deduplicate(rows: Vec<ObservationRow>) -> (Vec<ObservationRow>, usize) {
    let mut seen: HashSet<(String, Option<NaiveDateTime>)> = HashSet::with_capacity(rows.len());
    let before = rows.len();

    let kept: Vec<ObservationRow> = rows
        .into_iter()
        .filter(|row| seen.insert((row.city.clone(), row.time)))
        .collect();

    let dropped = before - kept.len();
    (kept, dropped)
}
