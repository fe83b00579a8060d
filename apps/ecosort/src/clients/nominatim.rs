//! Nominatim geocoding client. First result only.

use super::{GeoServiceError, http_client, join_url};
use crate::config::UpstreamConfig;
use ecosort_core::{Coordinates, GeocodedLocation};
use serde::Deserialize;
use tracing::{debug, warn};

const SERVICE: &str = "Nominatim";

/// One search hit. Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

impl Place {
    fn into_location(self, query: &str) -> Result<GeocodedLocation, GeoServiceError> {
        let invalid = |detail: String| GeoServiceError::InvalidResponse {
            service: SERVICE,
            detail,
        };
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|_| invalid(format!("latitude '{}'", self.lat)))?;
        let lon: f64 = self
            .lon
            .parse()
            .map_err(|_| invalid(format!("longitude '{}'", self.lon)))?;
        let coordinates = Coordinates::new(lat, lon).map_err(|e| invalid(e.to_string()))?;

        let display_name = if self.display_name.is_empty() {
            query.to_string()
        } else {
            self.display_name
        };
        Ok(GeocodedLocation {
            coordinates,
            display_name,
        })
    }
}

/// Address-to-coordinate lookup.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    endpoint: String,
}

impl NominatimClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: http_client(config)?,
            endpoint: join_url(&config.nominatim_url, "search"),
        })
    }

    /// Geocode free text. An empty result set is [`GeoServiceError::LocationNotFound`].
    pub async fn geocode(&self, query: &str) -> Result<GeocodedLocation, GeoServiceError> {
        let http_err = |source| GeoServiceError::Http {
            service: SERVICE,
            source,
        };

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), query, "geocoding failed");
            return Err(GeoServiceError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let places: Vec<Place> = response.json().await.map_err(http_err)?;
        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| GeoServiceError::LocationNotFound(query.to_string()))?;

        let location = place.into_location(query)?;
        debug!(query, lat = location.coordinates.lat, lon = location.coordinates.lon, "geocoded");
        Ok(location)
    }
}
