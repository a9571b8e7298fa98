use futures::future::try_join_all;
use tracing::{debug, info};

use crate::collectors::ObservationSource;
use crate::error::Result;
use crate::models::{Location, RawObservation};
use crate::utils::progress::ProgressReporter;

/// Pulls one weather/air-quality pair per location.
pub struct Collector<S> {
    source: S,
    concurrent: bool,
}

impl<S: ObservationSource> Collector<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            concurrent: true,
        }
    }

    pub fn with_concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collect every location; the first failure aborts the whole batch.
    ///
    /// Output order follows `locations` regardless of fan-out.
    pub async fn collect(
        &self,
        locations: &[Location],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<RawObservation>> {
        info!(
            locations = locations.len(),
            concurrent = self.concurrent,
            "collecting current conditions"
        );

        let observations = if self.concurrent {
            try_join_all(
                locations
                    .iter()
                    .map(|location| self.collect_location(location, progress)),
            )
            .await?
        } else {
            let mut observations = Vec::with_capacity(locations.len());
            for location in locations {
                observations.push(self.collect_location(location, progress).await?);
            }
            observations
        };

        Ok(observations)
    }

    async fn collect_location(
        &self,
        location: &Location,
        progress: Option<&ProgressReporter>,
    ) -> Result<RawObservation> {
        let (weather, air_quality) = tokio::try_join!(
            self.source.fetch_weather(location),
            self.source.fetch_air_quality(location)
        )?;

        debug!(location = %location.name, time = ?weather.time, "collected");
        if let Some(p) = progress {
            p.increment(1);
        }

        Ok(RawObservation::assemble(location, weather, air_quality))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::models::{CurrentAirQuality, CurrentWeather};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        failing_city: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(failing_city: Option<&'static str>) -> Self {
            Self {
                failing_city,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ObservationSource for FakeSource {
        async fn fetch_weather(&self, location: &Location) -> Result<CurrentWeather> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CurrentWeather {
                time: Some("2024-01-01T10:00".to_string()),
                temperature_2m: Some(location.latitude / 4.0),
                relative_humidity_2m: Some(70.0),
                weather_code: Some(3.0),
                wind_speed_10m: Some(2.5),
            })
        }

        async fn fetch_air_quality(&self, location: &Location) -> Result<CurrentAirQuality> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_city == Some(location.name.as_str()) {
                return Err(PipelineError::MissingData(format!(
                    "air quality for {}",
                    location.name
                )));
            }
            Ok(CurrentAirQuality {
                time: Some("2024-01-01T10:00".to_string()),
                european_aqi: Some(20.0),
                pm2_5: Some(5.0),
                nitrogen_dioxide: Some(11.0),
                ozone: Some(60.0),
            })
        }
    }

    #[tokio::test]
    async fn test_collect_preserves_location_order() -> Result<()> {
        let locations = Location::default_set();
        let collector = Collector::new(FakeSource::new(None));

        let raw = collector.collect(&locations, None).await?;

        let cities: Vec<&str> = raw.iter().map(|r| r.city.as_str()).collect();
        let expected: Vec<&str> = locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(cities, expected);
        assert_eq!(collector.source().calls.load(Ordering::SeqCst), locations.len() * 2);
        assert_eq!(raw[0].european_aqi, Some(20.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_sequential_matches_concurrent() -> Result<()> {
        let locations = Location::default_set();
        let concurrent = Collector::new(FakeSource::new(None))
            .collect(&locations, None)
            .await?;
        let sequential = Collector::new(FakeSource::new(None))
            .with_concurrent(false)
            .collect(&locations, None)
            .await?;

        assert_eq!(concurrent, sequential);
        Ok(())
    }

    #[tokio::test]
    async fn test_single_failure_aborts_batch() {
        let locations = Location::default_set();
        let collector = Collector::new(FakeSource::new(Some("Madrid"))).with_concurrent(false);

        let result = collector.collect(&locations, None).await;
        assert!(matches!(result, Err(PipelineError::MissingData(_))));
    }
}
