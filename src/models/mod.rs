pub mod location;
pub mod observation;
pub mod raw;
pub mod weather_code;

pub use location::Location;
pub use observation::{ObservationRow, ObservationRowBuilder, SnapshotRecord};
pub use raw::{CurrentAirQuality, CurrentEnvelope, CurrentWeather, RawObservation};
