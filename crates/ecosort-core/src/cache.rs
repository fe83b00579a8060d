//! # Geocode Cache
//!
//! Bounded LRU cache from a location query to its geocoded result.
//!
//! Nominatim's usage policy asks clients to cache results, and users tend to
//! repeat the same search while adjusting radius or limit. Queries are
//! normalized (trimmed, lowercased, whitespace collapsed) before lookup, so
//! `"  Berlin "` and `"berlin"` share an entry.
//!
//! Recency is tracked with a logical clock (a counter bumped on every access)
//! rather than wall time. Eviction removes the entry with the oldest stamp.

use crate::geo::GeocodedLocation;
use std::collections::BTreeMap;

/// Default number of cached queries.
pub const DEFAULT_CACHE_SIZE: usize = 256;

#[derive(Debug, Clone)]
struct Slot {
    location: GeocodedLocation,
    last_access: u64,
}

/// LRU cache of geocoding results.
#[derive(Debug)]
pub struct GeocodeCache {
    slots: BTreeMap<String, Slot>,
    /// last_access -> key, for O(log n) eviction.
    recency: BTreeMap<u64, String>,
    capacity: usize,
    clock: u64,
    hits: u64,
    misses: u64,
}

impl Default for GeocodeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl GeocodeCache {
    /// Create a cache holding at most `capacity` queries (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: BTreeMap::new(),
            recency: BTreeMap::new(),
            capacity: capacity.max(1),
            clock: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Normalize a free-text query into a cache key.
    #[must_use]
    pub fn normalize(query: &str) -> String {
        query
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn tick(&mut self) -> u64 {
        self.clock = self.clock.saturating_add(1);
        self.clock
    }

    /// Look up a query, refreshing its recency on a hit.
    pub fn get(&mut self, query: &str) -> Option<GeocodedLocation> {
        let key = Self::normalize(query);
        let now = self.tick();

        match self.slots.get_mut(&key) {
            Some(slot) => {
                self.recency.remove(&slot.last_access);
                slot.last_access = now;
                self.recency.insert(now, key);
                self.hits = self.hits.saturating_add(1);
                Some(slot.location.clone())
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                None
            }
        }
    }

    /// Insert or replace a query's result, evicting the least recently used
    /// entry when full.
    pub fn insert(&mut self, query: &str, location: GeocodedLocation) {
        let key = Self::normalize(query);
        let now = self.tick();

        if let Some(old) = self.slots.remove(&key) {
            self.recency.remove(&old.last_access);
        } else if self.slots.len() >= self.capacity {
            self.evict_oldest();
        }

        self.recency.insert(now, key.clone());
        self.slots.insert(
            key,
            Slot {
                location,
                last_access: now,
            },
        );
    }

    fn evict_oldest(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            self.slots.remove(&key);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `(hits, misses)` since creation.
    #[must_use]
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

// =============================================================================
// TESTS
// =============================================================================
