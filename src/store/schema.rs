//! SQL for the permanent table, its natural-key index, and the staging table.
//!
//! Decimal columns keep their declared `DECIMAL(p,s)` types; SQLite gives
//! them numeric affinity and the normalizer has already fixed the scale.

pub const OBSERVATION_TABLE: &str = "weather_data";
pub const STAGING_TABLE: &str = "weather_data_stg";

pub const CREATE_OBSERVATION_TABLE: &str = "
CREATE TABLE IF NOT EXISTS weather_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    city TEXT NOT NULL,
    latitude  DECIMAL(9,6),
    longitude DECIMAL(9,6),
    time TIMESTAMP,
    temp_c DECIMAL(5,2),
    humidity_pct INT,
    wind_speed_ms DECIMAL(6,2),
    weather_code INT,
    weather_description TEXT,
    aqi_eu INT,
    pm25 DECIMAL(6,2),
    no2 DECIMAL(8,2),
    o3  DECIMAL(8,2)
)";

pub const CREATE_NATURAL_KEY_INDEX: &str = "
CREATE UNIQUE INDEX IF NOT EXISTS ux_weather_city_time
ON weather_data (city, time)";

pub const DROP_STAGING_TABLE: &str = "DROP TABLE IF EXISTS weather_data_stg";

pub const CREATE_STAGING_TABLE: &str = "
CREATE TABLE weather_data_stg (
    city TEXT NOT NULL,
    latitude  DECIMAL(9,6),
    longitude DECIMAL(9,6),
    time TIMESTAMP,
    temp_c DECIMAL(5,2),
    humidity_pct INT,
    wind_speed_ms DECIMAL(6,2),
    weather_code INT,
    weather_description TEXT,
    aqi_eu INT,
    pm25 DECIMAL(6,2),
    no2 DECIMAL(8,2),
    o3  DECIMAL(8,2)
)";

pub const INSERT_STAGING_ROW: &str = "
INSERT INTO weather_data_stg (
    city, latitude, longitude, time, temp_c, humidity_pct, wind_speed_ms,
    weather_code, weather_description, aqi_eu, pm25, no2, o3
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

/// Insert-if-absent on `(city, time)`; existing rows are never touched.
///
/// Untimed rows stay in staging: NULL never matches the unique index, so
/// merging them would add a fresh copy on every run.
pub const MERGE_STAGING: &str = "
INSERT INTO weather_data (
    city, latitude, longitude, time, temp_c, humidity_pct, wind_speed_ms,
    weather_code, weather_description, aqi_eu, pm25, no2, o3
)
SELECT
    city, latitude, longitude, time, temp_c, humidity_pct, wind_speed_ms,
    weather_code, weather_description, aqi_eu, pm25, no2, o3
FROM weather_data_stg
WHERE time IS NOT NULL
ON CONFLICT (city, time) DO NOTHING";

pub const SELECT_COLUMNS: &str = "
id, city, latitude, longitude, time, temp_c, humidity_pct, wind_speed_ms,
weather_code, weather_description, aqi_eu, pm25, no2, o3";
