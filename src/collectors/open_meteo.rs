use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::collectors::ObservationSource;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::models::{CurrentAirQuality, CurrentEnvelope, CurrentWeather, Location};
use crate::utils::constants::{AIR_QUALITY_FIELDS, WEATHER_FIELDS};

/// `reqwest` client for the Open-Meteo forecast and air-quality APIs.
pub struct OpenMeteoClient {
    client: Client,
    weather_url: String,
    air_quality_url: String,
    timezone: String,
}

impl OpenMeteoClient {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            weather_url: config.weather_url.clone(),
            air_quality_url: config.air_quality_url.clone(),
            timezone: config.timezone.clone(),
        })
    }

    async fn get_current<T: DeserializeOwned>(
        &self,
        url: &str,
        location: &Location,
        fields: &[&str],
    ) -> Result<T> {
        let params = query_params(location, fields, &self.timezone);
        debug!(location = %location.name, url, "requesting current conditions");

        let response = self.client.get(url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::HttpStatus {
                url: response.url().to_string(),
                status,
            });
        }

        let body = response.text().await?;
        parse_current(&location.name, &body)
    }
}

impl ObservationSource for OpenMeteoClient {
    async fn fetch_weather(&self, location: &Location) -> Result<CurrentWeather> {
        self.get_current(&self.weather_url, location, WEATHER_FIELDS)
            .await
    }

    async fn fetch_air_quality(&self, location: &Location) -> Result<CurrentAirQuality> {
        self.get_current(&self.air_quality_url, location, AIR_QUALITY_FIELDS)
            .await
    }
}

pub fn query_params(location: &Location, fields: &[&str], timezone: &str) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", location.latitude.to_string()),
        ("longitude", location.longitude.to_string()),
        ("current", fields.join(",")),
        ("timezone", timezone.to_string()),
    ]
}

/// Extract the `current` block; a body without one is unusable.
pub fn parse_current<T: DeserializeOwned>(location: &str, body: &str) -> Result<T> {
    let envelope: CurrentEnvelope<T> =
        serde_json::from_str(body).map_err(|e| PipelineError::MalformedResponse {
            location: location.to_string(),
            message: e.to_string(),
        })?;

    envelope
        .current
        .ok_or_else(|| PipelineError::MalformedResponse {
            location: location.to_string(),
            message: "response has no `current` object".to_string(),
        })
}
