use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::Location;

/// `current` block of the weather endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentWeather {
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature_2m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub relative_humidity_2m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weather_code: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wind_speed_10m: Option<f64>,
}

/// `current` block of the air-quality endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentAirQuality {
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub european_aqi: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pm2_5: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub nitrogen_dioxide: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ozone: Option<f64>,
}

/// Response envelope shared by both endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentEnvelope<T> {
    pub current: Option<T>,
}

/// One location's weather and air-quality responses, still under provider names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawObservation {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub weather_code: Option<f64>,
    pub european_aqi: Option<f64>,
    pub pm2_5: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub ozone: Option<f64>,
}

impl RawObservation {
    pub fn assemble(
        location: &Location,
        weather: CurrentWeather,
        air_quality: CurrentAirQuality,
    ) -> Self {
        Self {
            city: location.name.clone(),
            lat: location.latitude,
            lon: location.longitude,
            // The weather timestamp is authoritative; air quality only fills a gap.
            time: weather.time.or(air_quality.time),
            temperature_2m: weather.temperature_2m,
            relative_humidity_2m: weather.relative_humidity_2m,
            wind_speed_10m: weather.wind_speed_10m,
            weather_code: weather.weather_code,
            european_aqi: air_quality.european_aqi,
            pm2_5: air_quality.pm2_5,
            nitrogen_dioxide: air_quality.nitrogen_dioxide,
            ozone: air_quality.ozone,
        }
    }
}

/// Accept a JSON number or numeric string; anything else becomes `None`.
pub fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

/// Accept a JSON string; anything else becomes `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}
