/// Description used for codes outside the WMO table.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// WMO weather interpretation codes as reported by Open-Meteo.
pub const WEATHER_CODES: &[(i32, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Fog"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Slight snow fall"),
    (73, "Moderate snow fall"),
    (75, "Heavy snow fall"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

pub fn lookup(code: i32) -> Option<&'static str> {
    WEATHER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, description)| *description)
}

/// Resolve a code to text, falling back to [`UNKNOWN_DESCRIPTION`].
pub fn describe(code: Option<i32>) -> &'static str {
    code.and_then(lookup).unwrap_or(UNKNOWN_DESCRIPTION)
}
