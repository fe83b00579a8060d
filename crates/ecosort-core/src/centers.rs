//! # Recycling Centers
//!
//! Maps Overpass elements into display records and ranks them.
//!
//! ## Pipeline
//!
//! 1. [`overpass_query`] builds the Overpass QL for e-waste drop-off points
//!    around the origin.
//! 2. [`RecyclingCenter::from_element`] maps each returned element, computing
//!    the Haversine distance from the origin. Elements without a position are
//!    dropped.
//! 3. [`rank_centers`] sorts by distance, removes duplicates (the same site is
//!    often mapped as both a node and a building outline), and truncates.

use crate::geo::{Coordinates, format_distance, haversine_km};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Search radius around the origin, in metres.
pub const DEFAULT_RADIUS_M: u32 = 10_000;

/// Number of centers returned after ranking.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Upper bound accepted for a caller-supplied radius.
pub const MAX_RADIUS_M: u32 = 50_000;

/// `recycling:*` tag suffixes that mark an e-waste drop-off, with display labels.
const EWASTE_TAGS: &[(&str, &str)] = &[
    ("batteries", "Batteries"),
    ("car_batteries", "Car Batteries"),
    ("electrical_appliances", "Electrical Appliances"),
    ("electrical_items", "Electrical Items"),
    ("small_appliances", "Small Appliances"),
    ("electronics", "Electronics"),
    ("computers", "Computers"),
    ("mobile_phones", "Mobile Phones"),
    ("tv_monitor", "TVs & Monitors"),
    ("light_bulbs", "Light Bulbs"),
    ("fluorescent_tubes", "Fluorescent Tubes"),
    ("printer_cartridges", "Printer Cartridges"),
    ("cables", "Cables"),
    ("white_goods", "Large Appliances"),
];

const FALLBACK_ITEM: &str = "E-Waste";
const FALLBACK_NAME: &str = "Recycling point";

// =============================================================================
// OVERPASS PAYLOAD
// =============================================================================

/// Position Overpass attaches to ways and relations under `out center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OsmCenter {
    pub lat: f64,
    pub lon: f64,
}

/// The fields of an Overpass element that EcoSort reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsmElement {
    /// `node`, `way` or `relation`.
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<OsmCenter>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl OsmElement {
    /// Node position, or the computed center for ways and relations.
    #[must_use]
    pub fn position(&self) -> Option<Coordinates> {
        let (lat, lon) = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => return None,
        };
        Coordinates::new(lat, lon).ok()
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Build the Overpass QL query for e-waste drop-off points.
#[must_use]
pub fn overpass_query(origin: Coordinates, radius_m: u32) -> String {
    let keys = EWASTE_TAGS
        .iter()
        .map(|(key, _)| *key)
        .collect::<Vec<_>>()
        .join("|");
    format!(
        "[out:json][timeout:25];\n\
         nwr[\"amenity\"=\"recycling\"][~\"^recycling:({keys})$\"~\"^yes$\"](around:{radius},{lat},{lon});\n\
         out center tags;",
        radius = radius_m.min(MAX_RADIUS_M),
        lat = origin.lat,
        lon = origin.lon,
    )
}

// =============================================================================
// DISPLAY RECORD
// =============================================================================

/// A recycling center as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecyclingCenter {
    /// `"{type}/{id}"`, unique per OSM object.
    pub id: String,
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub distance_km: f64,
    /// Formatted distance, e.g. `"1.2 km"`.
    pub distance: String,
    pub accepted_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    pub directions_url: String,
    pub details_url: String,
}

impl RecyclingCenter {
    /// Map an Overpass element. Returns `None` when it has no usable position.
    #[must_use]
    pub fn from_element(element: &OsmElement, origin: Coordinates) -> Option<Self> {
        let coordinates = element.position()?;
        let distance_km = haversine_km(origin, coordinates);

        let operator = element.tag("operator").map(str::to_string);
        let name = element
            .tag("name")
            .map(str::to_string)
            .or_else(|| operator.clone())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        Some(Self {
            id: format!("{}/{}", element.kind, element.id),
            name,
            address: address(element).unwrap_or_else(|| coordinates.to_string()),
            coordinates,
            distance_km,
            distance: format_distance(distance_km),
            accepted_items: accepted_items(element),
            phone: element
                .tag("phone")
                .or_else(|| element.tag("contact:phone"))
                .map(str::to_string),
            hours: element.tag("opening_hours").map(str::to_string),
            website: element
                .tag("website")
                .or_else(|| element.tag("contact:website"))
                .map(str::to_string),
            operator,
            directions_url: format!(
                "https://www.openstreetmap.org/directions?route={}%2C{}%3B{}%2C{}",
                origin.lat, origin.lon, coordinates.lat, coordinates.lon
            ),
            details_url: format!(
                "https://www.openstreetmap.org/{}/{}",
                element.kind, element.id
            ),
        })
    }

    fn dedup_key(&self) -> (String, String) {
        (normalize(&self.name), normalize(&self.address))
    }
}

fn address(element: &OsmElement) -> Option<String> {
    if let Some(full) = element.tag("addr:full") {
        return Some(full.to_string());
    }

    let street = match (element.tag("addr:housenumber"), element.tag("addr:street")) {
        (Some(number), Some(street)) => Some(format!("{number} {street}")),
        (None, Some(street)) => Some(street.to_string()),
        _ => None,
    };
    let locality = match (element.tag("addr:postcode"), element.tag("addr:city")) {
        (Some(postcode), Some(city)) => Some(format!("{postcode} {city}")),
        (None, Some(city)) => Some(city.to_string()),
        (Some(postcode), None) => Some(postcode.to_string()),
        (None, None) => None,
    };

    match (street, locality) {
        (Some(s), Some(l)) => Some(format!("{s}, {l}")),
        (Some(s), None) => Some(s),
        (None, Some(l)) => Some(l),
        (None, None) => None,
    }
}

fn accepted_items(element: &OsmElement) -> Vec<String> {
    let items: Vec<String> = EWASTE_TAGS
        .iter()
        .filter(|(key, _)| element.tag(&format!("recycling:{key}")) == Some("yes"))
        .map(|(_, label)| (*label).to_string())
        .collect();

    if items.is_empty() {
        vec![FALLBACK_ITEM.to_string()]
    } else {
        items
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// RANKING
// =============================================================================

/// Sort ascending by distance, drop duplicates, keep at most `limit`.
///
/// Ties are broken by id so the output is stable across runs. When two
/// records share a normalized name and address, the closer one is kept.
#[must_use]
pub fn rank_centers(mut centers: Vec<RecyclingCenter>, limit: usize) -> Vec<RecyclingCenter> {
    centers.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut seen = BTreeSet::new();
    centers.retain(|center| seen.insert(center.dedup_key()));
    centers.truncate(limit);
    centers
}

/// Map and rank a batch of Overpass elements.
#[must_use]
pub fn centers_from_elements(
    elements: &[OsmElement],
    origin: Coordinates,
    limit: usize,
) -> Vec<RecyclingCenter> {
    let mapped = elements
        .iter()
        .filter_map(|element| RecyclingCenter::from_element(element, origin))
        .collect();
    rank_centers(mapped, limit)
}

// =============================================================================
// TESTS
// =============================================================================
