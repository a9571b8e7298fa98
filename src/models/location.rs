use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Cities collected when no configuration overrides the list.
    pub fn default_set() -> Vec<Location> {
        vec![
            Location::new("Lisbon", 38.7223, -9.1393),
            Location::new("Porto", 41.1579, -8.6291),
            Location::new("Madrid", 40.4168, -3.7038),
            Location::new("London", 51.5074, -0.1278),
            Location::new("Paris", 48.8566, 2.3522),
            Location::new("Berlin", 52.5200, 13.4050),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_validation() {
        let location = Location::new("Lisbon", 38.7223, -9.1393);
        assert!(location.validate().is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(Location::new("Nowhere", 91.0, 0.0).validate().is_err());
        assert!(Location::new("Nowhere", 0.0, -181.0).validate().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Location::new("", 0.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_default_set_is_valid() {
        for location in Location::default_set() {
            assert!(location.validate().is_ok(), "{} invalid", location.name);
        }
    }
}
