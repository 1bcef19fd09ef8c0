use crate::error::{ProcessingError, Result};
use crate::utils::constants::COORDINATE_PRECISION;

/// Convert a fixed-width `(D)DMMSS` coordinate to decimal degrees
///
/// A leading `-` marks southern/western values. Inputs shorter than six
/// digits are zero-padded on the left, so `51234` reads as 5°12'34".
/// The result is rounded to six decimal places, ties to even.
///
/// # Examples
/// ```
/// use meteo_processor::utils::convert_coordinate;
///
/// assert_eq!(convert_coordinate("051234").unwrap(), 5.209444);
/// assert_eq!(convert_coordinate("-51234").unwrap(), -5.209444);
/// ```
pub fn convert_coordinate(ddmmss: &str) -> Result<f64> {
    let trimmed = ddmmss.trim();
    let is_negative = trimmed.starts_with('-');
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProcessingError::MalformedCoordinate(ddmmss.to_string()));
    }

    let padded = format!("{:0>6}", digits);
    let degrees = parse_component(&padded[0..2], ddmmss)?;
    let minutes = parse_component(&padded[2..4], ddmmss)?;
    let seconds = parse_component(&padded[4..6], ddmmss)?;

    let decimal_value = degrees + minutes / 60.0 + seconds / 3600.0;
    let rounded = round_to_precision(decimal_value, COORDINATE_PRECISION);

    if is_negative {
        Ok(-rounded)
    } else {
        Ok(rounded)
    }
}

fn parse_component(component: &str, original: &str) -> Result<f64> {
    component
        .parse::<u8>()
        .map(f64::from)
        .map_err(|_| ProcessingError::MalformedCoordinate(original.to_string()))
}

/// Round to `places` decimal places, ties to even
pub fn round_to_precision(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}

/// Output form of a decimal-degree value; whole degrees keep a trailing `.0`
pub fn format_degrees(value: f64) -> String {
    format!("{:?}", value)
}
