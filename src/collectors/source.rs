use std::future::Future;

use crate::error::Result;
use crate::models::{CurrentAirQuality, CurrentWeather, Location};

/// Provider boundary: one call per endpoint per location.
///
/// Implementations enforce their own timeout; any transport failure,
/// timeout, or non-success status is returned as an error.
pub trait ObservationSource: Send + Sync {
    fn fetch_weather(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<CurrentWeather>> + Send;

    fn fetch_air_quality(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<CurrentAirQuality>> + Send;
}
