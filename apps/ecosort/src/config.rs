//! # Configuration
//!
//! Every setting is a clap argument with an `ECOSORT_*` environment fallback,
//! so the same structs configure both `ecosort serve` and the one-shot CLI
//! commands. `Default` mirrors the clap defaults for tests and embedding.

use clap::Args;
use ecosort_core::{DEFAULT_MAX_RESULTS, DEFAULT_RADIUS_M};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de";
pub const DEFAULT_USER_AGENT: &str = concat!("ecosort/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_LEDGER: &str = "ecosort-impact.redb";

/// Upstream services.
#[derive(Debug, Clone, Args)]
pub struct UpstreamConfig {
    /// Base URL of the OpenAI-compatible AI gateway.
    #[arg(long, global = true, env = "ECOSORT_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: String,

    /// Bearer key for the AI gateway.
    #[arg(long, global = true, env = "ECOSORT_GATEWAY_KEY", hide_env_values = true)]
    pub gateway_key: Option<String>,

    /// Multimodal model used for classification.
    #[arg(long, global = true, env = "ECOSORT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Nominatim base URL.
    #[arg(long, global = true, env = "ECOSORT_NOMINATIM_URL", default_value = DEFAULT_NOMINATIM_URL)]
    pub nominatim_url: String,

    /// Overpass API base URL.
    #[arg(long, global = true, env = "ECOSORT_OVERPASS_URL", default_value = DEFAULT_OVERPASS_URL)]
    pub overpass_url: String,

    /// User-Agent sent to OpenStreetMap services (their policy requires one).
    #[arg(long, global = true, env = "ECOSORT_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout for upstream calls, in seconds.
    #[arg(long, global = true, env = "ECOSORT_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            gateway_key: None,
            model: DEFAULT_MODEL.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Recycling-center search bounds.
#[derive(Debug, Clone, Copy, Args)]
pub struct SearchConfig {
    /// Search radius around the location, in metres.
    #[arg(long, env = "ECOSORT_RADIUS_M", default_value_t = DEFAULT_RADIUS_M)]
    pub radius_m: u32,

    /// Maximum number of centers returned.
    #[arg(long = "limit", env = "ECOSORT_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "ECOSORT_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Require `Authorization: Bearer <key>` (or an `apikey` header) on all
    /// routes except /health.
    #[arg(long, env = "ECOSORT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Classification requests allowed per minute across all clients.
    #[arg(long, env = "ECOSORT_RATE_LIMIT", default_value_t = 30)]
    pub rate_limit_per_minute: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            api_key: None,
            rate_limit_per_minute: 30,
        }
    }
}

/// Everything the API needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
    pub ledger_path: PathBuf,
}

impl AppConfig {
    #[must_use]
    pub fn new(
        upstream: UpstreamConfig,
        search: SearchConfig,
        server: ServerConfig,
        ledger_path: PathBuf,
    ) -> Self {
        Self {
            upstream,
            search,
            server,
            ledger_path,
        }
    }
}
