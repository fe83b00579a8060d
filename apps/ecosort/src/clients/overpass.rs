//! Overpass API client.

use super::{GeoServiceError, http_client, join_url};
use crate::config::UpstreamConfig;
use ecosort_core::centers::{OsmElement, overpass_query};
use ecosort_core::Coordinates;
use serde::Deserialize;
use tracing::{debug, warn};

const SERVICE: &str = "Overpass";

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OsmElement>,
}

/// Map-feature query client.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    http: reqwest::Client,
    endpoint: String,
}

impl OverpassClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: http_client(config)?,
            endpoint: join_url(&config.overpass_url, "api/interpreter"),
        })
    }

    /// E-waste drop-off points within `radius_m` of `origin`.
    pub async fn recycling_points(
        &self,
        origin: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<OsmElement>, GeoServiceError> {
        let http_err = |source| GeoServiceError::Http {
            service: SERVICE,
            source,
        };

        let query = overpass_query(origin, radius_m);
        let response = self
            .http
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "overpass query failed");
            return Err(GeoServiceError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body: OverpassResponse = response.json().await.map_err(http_err)?;
        debug!(elements = body.elements.len(), radius_m, "overpass response");
        Ok(body.elements)
    }
}
