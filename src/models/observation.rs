use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{PipelineError, Result};
use crate::models::weather_code;

/// Canonical, persisted observation. `(city, time)` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ObservationRow {
    #[validate(length(min = 1))]
    pub city: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub time: Option<NaiveDateTime>,

    #[validate(range(min = -90.0, max = 60.0))]
    pub temp_c: Option<f64>,

    #[validate(range(min = 0, max = 100))]
    pub humidity_pct: Option<i32>,

    #[validate(range(min = 0.0))]
    pub wind_speed_ms: Option<f64>,

    pub weather_code: Option<i32>,
    pub weather_description: String,

    #[validate(range(min = 0))]
    pub aqi_eu: Option<i32>,

    #[validate(range(min = 0.0))]
    pub pm25: Option<f64>,

    #[validate(range(min = 0.0))]
    pub no2: Option<f64>,

    #[validate(range(min = 0.0))]
    pub o3: Option<f64>,
}

impl ObservationRow {
    pub fn builder() -> ObservationRowBuilder {
        ObservationRowBuilder::new()
    }

    pub fn key(&self) -> (&str, Option<NaiveDateTime>) {
        (self.city.as_str(), self.time)
    }

    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    pub fn has_known_weather(&self) -> bool {
        self.weather_description != weather_code::UNKNOWN_DESCRIPTION
    }

    /// True when any measured attribute is absent.
    pub fn has_missing_attributes(&self) -> bool {
        self.temp_c.is_none()
            || self.humidity_pct.is_none()
            || self.wind_speed_ms.is_none()
            || self.weather_code.is_none()
            || self.aqi_eu.is_none()
            || self.pm25.is_none()
            || self.no2.is_none()
            || self.o3.is_none()
    }
}

/// Builds rows for callers that only know part of an observation.
#[derive(Debug, Default)]
pub struct ObservationRowBuilder {
    city: Option<String>,
    coordinates: Option<(f64, f64)>,
    time: Option<NaiveDateTime>,
    temp_c: Option<f64>,
    humidity_pct: Option<i32>,
    wind_speed_ms: Option<f64>,
    weather_code: Option<i32>,
    aqi_eu: Option<i32>,
    pm25: Option<f64>,
    no2: Option<f64>,
    o3: Option<f64>,
}

impl ObservationRowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some((latitude, longitude));
        self
    }

    pub fn time(mut self, time: NaiveDateTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn weather(mut self, temp_c: f64, humidity_pct: i32, wind_speed_ms: f64, code: i32) -> Self {
        self.temp_c = Some(temp_c);
        self.humidity_pct = Some(humidity_pct);
        self.wind_speed_ms = Some(wind_speed_ms);
        self.weather_code = Some(code);
        self
    }

    pub fn air_quality(mut self, aqi_eu: i32, pm25: f64, no2: f64, o3: f64) -> Self {
        self.aqi_eu = Some(aqi_eu);
        self.pm25 = Some(pm25);
        self.no2 = Some(no2);
        self.o3 = Some(o3);
        self
    }

    pub fn build(self) -> Result<ObservationRow> {
        let city = self
            .city
            .ok_or_else(|| PipelineError::MissingData("city".to_string()))?;

        Ok(ObservationRow {
            city,
            latitude: self.coordinates.map(|(lat, _)| lat),
            longitude: self.coordinates.map(|(_, lon)| lon),
            time: self.time,
            temp_c: self.temp_c,
            humidity_pct: self.humidity_pct,
            wind_speed_ms: self.wind_speed_ms,
            weather_code: self.weather_code,
            weather_description: weather_code::describe(self.weather_code).to_string(),
            aqi_eu: self.aqi_eu,
            pm25: self.pm25,
            no2: self.no2,
            o3: self.o3,
        })
    }
}

/// A row read back from a CSV snapshot.
///
/// Accepts both the canonical column names and the provider-style
/// abbreviations (`lat`, `lon`). The description column is ignored and
/// re-derived from the code. Numeric cells that do not parse are read as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRecord {
    pub city: String,
    #[serde(alias = "lat", default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(alias = "lon", default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub temp_c: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub humidity_pct: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub wind_speed_ms: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub weather_code: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub aqi_eu: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub pm25: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub no2: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub o3: Option<f64>,
}
