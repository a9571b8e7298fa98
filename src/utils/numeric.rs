/// Round to a fixed number of fractional digits.
///
/// # Examples
/// ```
/// use weather_etl::utils::round_to;
///
/// assert_eq!(round_to(12.345, 2), 12.35);
/// assert_eq!(round_to(-9.13934, 2), -9.14);
/// ```
pub fn round_to(value: f64, scale: u32) -> f64 {
    let factor = 10f64.powi(scale as i32);
    let scaled = value * factor;
    // Decimal halves like 12.345 are stored just below the midpoint.
    let nudge = scaled.abs().max(1.0) * 1e-12;
    let adjusted = if scaled >= 0.0 {
        scaled + nudge
    } else {
        scaled - nudge
    };
    adjusted.round() / factor
}

pub fn round_opt(value: Option<f64>, scale: u32) -> Option<f64> {
    value.map(|v| round_to(v, scale))
}

/// Round to the nearest integer, dropping values outside `i32`.
pub fn to_int(value: Option<f64>) -> Option<i32> {
    value
        .map(f64::round)
        .filter(|v| *v >= i32::MIN as f64 && *v <= i32::MAX as f64)
        .map(|v| v as i32)
}
