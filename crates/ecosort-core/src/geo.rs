//! # Geo
//!
//! Coordinates, the Haversine great-circle distance, and the small amount of
//! text handling needed to accept "lat, lon" input directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coordinate validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside -90..=90")]
    Latitude(f64),

    #[error("longitude {0} is outside -180..=180")]
    Longitude(f64),

    #[error("'{0}' is not a 'lat, lon' pair")]
    Unparseable(String),
}

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create validated coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Parse `"lat, lon"` (comma and/or whitespace separated).
    pub fn parse(input: &str) -> Result<Self, CoordinateError> {
        let unparseable = || CoordinateError::Unparseable(input.to_string());

        let mut parts = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty());
        let lat = parts.next().ok_or_else(unparseable)?;
        let lon = parts.next().ok_or_else(unparseable)?;
        if parts.next().is_some() {
            return Err(unparseable());
        }

        let lat: f64 = lat.parse().map_err(|_| unparseable())?;
        let lon: f64 = lon.parse().map_err(|_| unparseable())?;
        Self::new(lat, lon)
    }

    /// Distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine_km(*self, *other)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// A resolved search origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    pub coordinates: Coordinates,
    /// Human-readable name of the match, or the coordinate pair itself.
    pub display_name: String,
}

impl GeocodedLocation {
    /// An origin typed in as raw coordinates.
    #[must_use]
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            display_name: coordinates.to_string(),
        }
    }
}

/// Great-circle distance between two points, in kilometres.
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Format a distance for display: metres below 1 km, one decimal above.
#[must_use]
pub fn format_distance(km: f64) -> String {
    let metres = (km * 1000.0).round();
    if metres < 1000.0 {
        format!("{} m", metres as u64)
    } else {
        format!("{km:.1} km")
    }
}

// =============================================================================
// TESTS
// =============================================================================
