use thiserror::Error;

use crate::models::Coordinates;

/// Why the browser could not (or would not) hand us a position. The numeric
/// codes are the ones navigator.geolocation reports; "unsupported" is sent by
/// the page script when the API is missing entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("This browser does not support location services.")]
    Unsupported,
    #[error("Location access was denied. Allow it and search again.")]
    Denied,
    #[error("The location request timed out. Try searching again.")]
    Timeout,
    #[error("Your position could not be determined right now.")]
    PositionUnavailable,
}

/// Turn the query parameters the gyms page sends back into a usable
/// location. `loc_err` wins over coordinates so a reported failure is never
/// silently ignored.
pub fn resolve(
    lat: Option<f64>,
    lon: Option<f64>,
    loc_err: Option<&str>,
) -> Option<Result<Coordinates, LocationError>> {
    if let Some(code) = loc_err {
        return Some(Err(parse_error_code(code)));
    }

    let (lat, lon) = (lat?, lon?);
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Some(Err(LocationError::PositionUnavailable));
    }
    Some(Ok(Coordinates { lat, lon }))
}

fn parse_error_code(code: &str) -> LocationError {
    match code {
        "unsupported" => LocationError::Unsupported,
        "1" => LocationError::Denied,
        "3" => LocationError::Timeout,
        _ => LocationError::PositionUnavailable,
    }
}
