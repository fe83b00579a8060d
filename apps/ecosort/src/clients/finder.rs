//! Recycling-center search: resolve the origin, query Overpass, rank.

use super::{GeoServiceError, NominatimClient, OverpassClient};
use crate::config::UpstreamConfig;
use ecosort_core::centers::{MAX_RADIUS_M, centers_from_elements};
use ecosort_core::{Coordinates, GeocodeCache, GeocodedLocation, RecyclingCenter};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Result of a center search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterSearch {
    pub origin: GeocodedLocation,
    pub radius_m: u32,
    pub centers: Vec<RecyclingCenter>,
}

/// Geocoding + Overpass, with a geocode cache in front of Nominatim.
#[derive(Debug)]
pub struct CenterFinder {
    geocoder: NominatimClient,
    overpass: OverpassClient,
    cache: Mutex<GeocodeCache>,
}

impl CenterFinder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            geocoder: NominatimClient::new(config)?,
            overpass: OverpassClient::new(config)?,
            cache: Mutex::new(GeocodeCache::default()),
        })
    }

    /// Turn user input into an origin.
    ///
    /// `"lat, lon"` input is used directly; anything else is geocoded, with
    /// results cached per normalized query.
    pub async fn resolve(&self, location: &str) -> Result<GeocodedLocation, GeoServiceError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(GeoServiceError::EmptyQuery);
        }

        if let Ok(coordinates) = Coordinates::parse(location) {
            return Ok(GeocodedLocation::from_coordinates(coordinates));
        }

        if let Some(hit) = self.cache.lock().await.get(location) {
            debug!(location, "geocode cache hit");
            return Ok(hit);
        }

        let resolved = self.geocoder.geocode(location).await?;
        self.cache.lock().await.insert(location, resolved.clone());
        Ok(resolved)
    }

    /// Find up to `limit` centers within `radius_m` of `location`.
    ///
    /// An empty `centers` list is a successful search with no matches.
    pub async fn search(
        &self,
        location: &str,
        radius_m: u32,
        limit: usize,
    ) -> Result<CenterSearch, GeoServiceError> {
        let radius_m = radius_m.clamp(1, MAX_RADIUS_M);
        let origin = self.resolve(location).await?;
        let elements = self
            .overpass
            .recycling_points(origin.coordinates, radius_m)
            .await?;
        let centers = centers_from_elements(&elements, origin.coordinates, limit);

        info!(
            origin = %origin.display_name,
            found = elements.len(),
            returned = centers.len(),
            "center search"
        );

        Ok(CenterSearch {
            origin,
            radius_m,
            centers,
        })
    }
}
