//! Great-circle distance on a spherical Earth.

use crate::error::EngineError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in degrees.
///
/// Identical inputs give exactly `0.0` and swapping the two points gives
/// the same value bit for bit.
///
/// # Errors
///
/// Returns [`EngineError::GeoInput`] if any coordinate is NaN or infinite.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64, EngineError> {
    ensure_finite("lat1", lat1)?;
    ensure_finite("lon1", lon1)?;
    ensure_finite("lat2", lat2)?;
    ensure_finite("lon2", lon2)?;

    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let half_dlat = (lat2 - lat1) / 2.0;
    let half_dlon = (lon2.to_radians() - lon1.to_radians()) / 2.0;

    let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    Ok(EARTH_RADIUS_KM * c)
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::GeoInput { field, value })
    }
}
