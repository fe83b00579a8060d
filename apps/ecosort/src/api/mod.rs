//! # HTTP API
//!
//! | Method | Path            | Body / Query                        |
//! |--------|-----------------|-------------------------------------|
//! | GET    | `/health`       |                                     |
//! | POST   | `/classify`     | `{"image": "data:image/...;base64"}`|
//! | GET    | `/centers`      | `?location=&radius_m=&limit=`       |
//! | GET    | `/impact`       |                                     |
//! | POST   | `/impact/items` | `{"category": "...", "item": "..."}`|
//! | GET    | `/impact/demo`  |                                     |
//! | GET    | `/education`    |                                     |
//!
//! Everything except `/health` sits behind the optional API key.

mod auth;
mod error;
mod handlers;

pub use error::ApiError;

use crate::clients::{CenterFinder, GatewayClient, GatewayError};
use crate::config::{AppConfig, SearchConfig};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Method, header};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use ecosort_core::{ImpactLedger, LedgerError};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// JSON bodies carry a base64 image of up to 10 MiB, so the limit sits above
/// the encoded size.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Startup failures.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("building HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared request state.
pub struct AppState {
    /// `None` when no gateway key is configured; `/classify` then returns 500.
    pub gateway: Option<GatewayClient>,
    pub finder: CenterFinder,
    pub ledger: Arc<ImpactLedger>,
    pub limiter: DefaultDirectRateLimiter,
    pub search: SearchConfig,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gateway", &self.gateway.is_some())
            .field("search", &self.search)
            .field("auth", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state from config, opening the ledger at `config.ledger_path`.
    pub fn new(config: &AppConfig) -> Result<Self, ServeError> {
        let ledger = ImpactLedger::open(&config.ledger_path)?;
        Self::with_ledger(config, Arc::new(ledger))
    }

    /// Build state around an already opened ledger.
    pub fn with_ledger(config: &AppConfig, ledger: Arc<ImpactLedger>) -> Result<Self, ServeError> {
        let gateway = match GatewayClient::new(&config.upstream) {
            Ok(client) => Some(client),
            Err(GatewayError::NotConfigured) => {
                warn!("ECOSORT_GATEWAY_KEY not set, /classify will fail");
                None
            }
            Err(GatewayError::Http(e)) => return Err(e.into()),
            Err(other) => {
                warn!(error = %other, "AI gateway unavailable");
                None
            }
        };

        let per_minute = NonZeroU32::new(config.server.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            gateway,
            finder: CenterFinder::new(&config.upstream)?,
            ledger,
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
            search: config.search,
            api_key: config
                .server
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
        })
    }
}

/// The full router.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/classify", post(handlers::classify))
        .route("/centers", get(handlers::centers))
        .route("/impact", get(handlers::impact))
        .route("/impact/items", post(handlers::record_item))
        .route("/impact/demo", get(handlers::impact_demo))
        .route("/education", get(handlers::education))
        .route_layer(from_fn_with_state(state.clone(), auth::require_api_key));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: AppConfig) -> Result<(), ServeError> {
    let state = Arc::new(AppState::new(&config)?);
    info!(ledger = %config.ledger_path.display(), "impact ledger opened");

    let app = router(state);
    let listener = TcpListener::bind(config.server.bind).await?;
    info!("Server running on {}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
