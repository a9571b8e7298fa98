//! Run configuration.
//!
//! A [`PipelineConfig`] is assembled once at startup from built-in defaults,
//! an optional TOML file, and `WEATHER_ETL_*` environment variables, then
//! handed by reference to every stage.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

use crate::error::{PipelineError, Result};
use crate::models::Location;
use crate::utils::constants::{
    DEFAULT_AIR_QUALITY_URL, DEFAULT_CSV_OUTPUT, DEFAULT_DATABASE_PATH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_TIMEZONE, DEFAULT_WEATHER_URL, ENV_PREFIX,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    #[serde(default = "Location::default_set")]
    #[validate(length(min = 1), nested)]
    pub locations: Vec<Location>,

    #[validate(length(min = 1))]
    pub weather_url: String,

    #[validate(length(min = 1))]
    pub air_quality_url: String,

    #[validate(length(min = 1))]
    pub timezone: String,

    #[validate(range(min = 1, max = 600))]
    pub timeout_secs: u64,

    /// Fan requests out across locations instead of one at a time.
    pub concurrent: bool,

    pub database_path: PathBuf,
    pub csv_output: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            locations: Location::default_set(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            air_quality_url: DEFAULT_AIR_QUALITY_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrent: true,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            csv_output: PathBuf::from(DEFAULT_CSV_OUTPUT),
        }
    }
}

impl PipelineConfig {
    /// Layer defaults, an optional file, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("weather_url", DEFAULT_WEATHER_URL)?
            .set_default("air_quality_url", DEFAULT_AIR_QUALITY_URL)?
            .set_default("timezone", DEFAULT_TIMEZONE)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("concurrent", true)?
            .set_default("database_path", DEFAULT_DATABASE_PATH)?
            .set_default("csv_output", DEFAULT_CSV_OUTPUT)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: PipelineConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.check()?;
        Ok(config)
    }

    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = path;
        self
    }

    pub fn with_csv_output(mut self, path: PathBuf) -> Self {
        self.csv_output = path;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Field validation plus the cross-field rules `validator` can't express.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        let mut seen = HashSet::new();
        for location in &self.locations {
            if !seen.insert(location.name.as_str()) {
                return Err(PipelineError::InvalidConfig(format!(
                    "duplicate location name '{}'",
                    location.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.check().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.locations.len(), 6);
    }

    #[test]
    fn test_load_from_file_replaces_locations() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            r#"
timeout_secs = 5
database_path = "/tmp/observations.db"

[[locations]]
name = "Lisbon"
latitude = 38.7223
longitude = -9.1393
"#
        )?;

        let config = PipelineConfig::load(Some(file.path()))?;
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.database_path, PathBuf::from("/tmp/observations.db"));
        assert_eq!(config.locations, vec![Location::new("Lisbon", 38.7223, -9.1393)]);
        assert_eq!(config.weather_url, DEFAULT_WEATHER_URL);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("missing.toml");
        assert!(PipelineConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_duplicate_locations_rejected() {
        let config = PipelineConfig::default().with_locations(vec![
            Location::new("Lisbon", 38.7, -9.1),
            Location::new("Lisbon", 38.8, -9.2),
        ]);
        assert!(matches!(
            config.check(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_locations_rejected() {
        let config = PipelineConfig::default().with_locations(vec![]);
        assert!(config.check().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = PipelineConfig::default().with_timeout_secs(0);
        assert!(config.check().is_err());
    }
}
