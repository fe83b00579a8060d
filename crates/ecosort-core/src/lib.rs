//! # EcoSort Core
//!
//! Domain logic for the EcoSort e-waste service.
//!
//! This crate is synchronous and network-free. The binary in `apps/ecosort`
//! talks to the AI gateway, Nominatim and Overpass, then hands the payloads
//! to the types here:
//!
//! - [`classification`]: the closed category set and the classification record
//! - [`upload`]: image validation before anything leaves the process
//! - [`geo`]: coordinates and Haversine distance
//! - [`centers`]: Overpass element mapping and the sort/dedup/truncate step
//! - [`impact`]: impact figures, levels and achievements
//! - [`storage`] + [`formats`]: the persisted impact ledger
//! - [`education`]: static learning content
//! - [`cache`]: bounded LRU for geocoding results

pub mod cache;
pub mod centers;
pub mod classification;
pub mod education;
pub mod formats;
pub mod geo;
pub mod impact;
pub mod storage;
pub mod upload;

pub use cache::GeocodeCache;
pub use centers::{DEFAULT_MAX_RESULTS, DEFAULT_RADIUS_M, OsmElement, RecyclingCenter, rank_centers};
pub use classification::{Category, Classification, ClassificationError};
pub use geo::{CoordinateError, Coordinates, GeocodedLocation, haversine_km};
pub use impact::{ImpactReport, ImpactStats, RecycledItem};
pub use storage::{ImpactLedger, LedgerError};
pub use upload::{ImageUpload, MAX_IMAGE_BYTES, UploadError};
