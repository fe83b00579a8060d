//! API error type. Every failure leaves the server as `{"error": message}`.

use crate::clients::{GatewayError, GeoServiceError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ecosort_core::{LedgerError, UploadError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or invalid API key")]
    Unauthorized,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Geo(#[from] GeoServiceError),

    #[error("Impact ledger unavailable: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Upload(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Gateway(e) => match e {
                GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                GatewayError::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Geo(e) => match e {
                GeoServiceError::EmptyQuery => StatusCode::BAD_REQUEST,
                GeoServiceError::LocationNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApiError::Ledger(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
