//! # Upstream Clients
//!
//! HTTP clients for the three services EcoSort depends on:
//!
//! ```text
//! ┌──────────────┐  POST /v1/chat/completions  ┌────────────────────┐
//! │              │ ──────────────────────────► │ AI gateway         │
//! │              │                             └────────────────────┘
//! │   ecosort    │  GET /search                ┌────────────────────┐
//! │ (api / cli)  │ ──────────────────────────► │ Nominatim          │
//! │              │                             └────────────────────┘
//! │              │  POST /api/interpreter      ┌────────────────────┐
//! │              │ ──────────────────────────► │ Overpass           │
//! └──────────────┘                             └────────────────────┘
//! ```
//!
//! Each call is a single request: no retries, no backoff.

mod finder;
mod gateway;
mod nominatim;
mod overpass;

pub use finder::{CenterFinder, CenterSearch};
pub use gateway::{GatewayClient, GatewayError, classification_prompt};
pub use nominatim::NominatimClient;
pub use overpass::OverpassClient;

use crate::config::UpstreamConfig;
use thiserror::Error;

/// Errors from the OpenStreetMap services.
#[derive(Debug, Error)]
pub enum GeoServiceError {
    #[error("Please enter a location to search")]
    EmptyQuery,

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        source: reqwest::Error,
    },

    #[error("{service} returned an unexpected payload: {detail}")]
    InvalidResponse {
        service: &'static str,
        detail: String,
    },
}

/// Shared reqwest client: timeout and User-Agent from config.
pub fn http_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .build()
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
