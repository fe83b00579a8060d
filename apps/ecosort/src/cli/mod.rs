//! # CLI
//!
//! `ecosort serve` runs the HTTP API; every other command is a one-shot
//! operation against the same upstream clients and impact ledger.
//!
//! The `cmd_*` functions return data and do no printing, so they can be
//! driven directly from tests. [`run`] does the rendering.

pub mod render;

use crate::api::{self, ServeError};
use crate::clients::{CenterFinder, CenterSearch, GatewayClient, GatewayError, GeoServiceError};
use crate::config::{AppConfig, DEFAULT_LEDGER, SearchConfig, ServerConfig, UpstreamConfig};
use clap::{Parser, Subcommand};
use ecosort_core::impact::{COUNT_UP_MILLIS, COUNT_UP_STEPS};
use ecosort_core::upload::mime_from_path;
use ecosort_core::{
    Category, Classification, ImageUpload, ImpactLedger, ImpactReport, LedgerError,
    MAX_IMAGE_BYTES, RecycledItem, UploadError, education,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::info;

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "ecosort", version, about = "Classify e-waste, find recycling centers, track your impact")]
pub struct Cli {
    #[command(flatten)]
    pub upstream: UpstreamConfig,

    /// Impact ledger database.
    #[arg(long, global = true, env = "ECOSORT_LEDGER", default_value = DEFAULT_LEDGER)]
    pub ledger: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        #[command(flatten)]
        server: ServerConfig,

        #[command(flatten)]
        search: SearchConfig,
    },

    /// Classify an image of an e-waste item.
    Classify {
        /// Image file (JPG, PNG, WebP, GIF...), at most 10MB.
        image: PathBuf,

        /// Print the raw classification as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Find recycling centers near an address or "lat, lon".
    Centers {
        location: String,

        #[command(flatten)]
        search: SearchConfig,

        #[arg(long)]
        json: bool,
    },

    /// Show the impact report.
    Impact {
        /// Show the demo profile instead of the ledger.
        #[arg(long)]
        demo: bool,

        /// Count the headline figures up before printing the report.
        #[arg(long, conflicts_with = "json")]
        animate: bool,

        #[arg(long)]
        json: bool,
    },

    /// Record a recycled item in the ledger.
    Record {
        /// Batteries, "Circuit Boards", Plastics, Metals, Displays or "Mixed Electronics".
        category: Category,

        /// What was recycled, e.g. "AA battery".
        item: String,
    },

    /// Learn about e-waste.
    Learn {
        /// Print a single "did you know" fact (wraps around).
        #[arg(long)]
        fact: Option<usize>,

        #[arg(long)]
        json: bool,
    },
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Geo(#[from] GeoServiceError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error("HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Item name must not be empty")]
    EmptyItem,

    #[error("JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Read and validate an image file.
///
/// The size check runs on file metadata first so oversized files are never
/// read into memory.
pub fn load_image(path: &Path) -> Result<ImageUpload, CliError> {
    let io_err = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mime = mime_from_path(path);
    if !mime.starts_with("image/") {
        return Err(UploadError::NotAnImage {
            mime: mime.to_string(),
        }
        .into());
    }

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > MAX_IMAGE_BYTES as u64 {
        return Err(UploadError::TooLarge {
            size: size as usize,
            max: MAX_IMAGE_BYTES,
        }
        .into());
    }

    let bytes = std::fs::read(path).map_err(io_err)?;
    Ok(ImageUpload::from_bytes(mime, &bytes)?)
}

pub async fn cmd_classify(upstream: &UpstreamConfig, image: &Path) -> Result<Classification, CliError> {
    let upload = load_image(image)?;
    let client = GatewayClient::new(upstream)?;
    Ok(client.classify(&upload).await?)
}

pub async fn cmd_centers(
    upstream: &UpstreamConfig,
    location: &str,
    search: SearchConfig,
) -> Result<CenterSearch, CliError> {
    let finder = CenterFinder::new(upstream)?;
    Ok(finder
        .search(location, search.radius_m, search.max_results)
        .await?)
}

/// The ledger report, or the demo report without touching the ledger.
pub fn cmd_impact(ledger: &Path, demo: bool) -> Result<ImpactReport, CliError> {
    if demo {
        return Ok(ImpactReport::demo());
    }
    Ok(ImpactLedger::open(ledger)?.report()?)
}

/// Append an item to the ledger. Returns its id.
pub fn cmd_record(ledger: &Path, category: Category, item: &str) -> Result<u64, CliError> {
    let item = item.trim();
    if item.is_empty() {
        return Err(CliError::EmptyItem);
    }

    let recorded_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let id = ImpactLedger::open(ledger)?.record(&RecycledItem::new(category, item, recorded_at))?;
    info!(id, %category, item, "recorded");
    Ok(id)
}

/// Education output: one fact, or the whole content.
pub fn cmd_learn(fact: Option<usize>, json: bool) -> Result<String, CliError> {
    match (fact, json) {
        (Some(index), false) => Ok(education::fact(index).to_string()),
        (Some(index), true) => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "fact": education::fact(index)
        }))?),
        (None, false) => Ok(render::education(&education::content())),
        (None, true) => Ok(serde_json::to_string_pretty(&education::content())?),
    }
}

async fn animate(report: &ImpactReport) {
    let pause = Duration::from_millis(COUNT_UP_MILLIS / u64::from(COUNT_UP_STEPS));
    let mut stdout = std::io::stdout();
    for frame in report.stats.count_up(COUNT_UP_STEPS) {
        let _ = write!(stdout, "\r{}", render::count_up_frame(&frame));
        let _ = stdout.flush();
        tokio::time::sleep(pause).await;
    }
    println!("\n");
}

// =============================================================================
// DISPATCH
// =============================================================================

pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve { server, search } => {
            let config = AppConfig::new(cli.upstream, search, server, cli.ledger);
            api::serve(config).await?;
        }
        Command::Classify { image, json } => {
            let classification = cmd_classify(&cli.upstream, &image).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&classification)?);
            } else {
                print!("{}", render::classification(&classification));
            }
        }
        Command::Centers {
            location,
            search,
            json,
        } => {
            let result = cmd_centers(&cli.upstream, &location, search).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render::centers(&result));
            }
        }
        Command::Impact {
            demo,
            animate: animated,
            json,
        } => {
            let report = cmd_impact(&cli.ledger, demo)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                if animated {
                    animate(&report).await;
                }
                print!("{}", render::impact(&report));
            }
        }
        Command::Record { category, item } => {
            let id = cmd_record(&cli.ledger, category, &item)?;
            let report = cmd_impact(&cli.ledger, false)?;
            println!(
                "Recorded #{id}: {} ({category}). Level {}, {} items recycled.",
                item.trim(),
                report.stats.level,
                report.stats.items_recycled
            );
        }
        Command::Learn { fact, json } => {
            println!("{}", cmd_learn(fact, json)?);
        }
    }
    Ok(())
}
