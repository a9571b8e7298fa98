pub mod collector;
pub mod open_meteo;
pub mod source;

pub use collector::Collector;
pub use open_meteo::OpenMeteoClient;
pub use source::ObservationSource;
