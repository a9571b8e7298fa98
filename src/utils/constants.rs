/// Provider endpoints
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";
pub const DEFAULT_TIMEZONE: &str = "Europe/Lisbon";

/// Fields requested in the `current` query parameter
pub const WEATHER_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "weather_code",
    "wind_speed_10m",
];
pub const AIR_QUALITY_FIELDS: &[&str] = &["european_aqi", "pm2_5", "nitrogen_dioxide", "ozone"];

/// Request limits
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Output defaults
pub const DEFAULT_DATABASE_PATH: &str = "data/weather.db";
pub const DEFAULT_CSV_OUTPUT: &str = "output/weather_data.csv";
pub const DEFAULT_SHOW_LIMIT: usize = 10;

/// Decimal scales matching the table's declared column types
pub const MEASUREMENT_SCALE: u32 = 2;
pub const COORDINATE_SCALE: u32 = 6;

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "WEATHER_ETL";
