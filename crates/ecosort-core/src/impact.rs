//! # Impact Tracker
//!
//! Turns a count of recycled items into the figures shown on the impact page:
//! CO₂, energy, water and tree equivalents, a level, and achievements.
//!
//! The per-item factors are fixed. They are chosen so that twelve items give
//! the demo figures (45.6 kg CO₂, 78.3 kWh, 234 L, 2.4 trees).

use crate::classification::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// kg of CO₂ avoided per recycled item.
pub const CO2_KG_PER_ITEM: f64 = 3.8;
/// kWh saved per recycled item.
pub const ENERGY_KWH_PER_ITEM: f64 = 6.525;
/// Litres of water saved per recycled item.
pub const WATER_L_PER_ITEM: f64 = 19.5;
/// Tree-years of CO₂ absorption per recycled item.
pub const TREES_PER_ITEM: f64 = 0.2;

/// Items per level.
pub const ITEMS_PER_LEVEL: u64 = 10;

/// Item count behind [`ImpactStats::demo`].
pub const DEMO_ITEMS: u64 = 12;

/// Level shown by the demo profile. It is fixed, not derived from the items.
pub const DEMO_LEVEL: u64 = 3;

/// Achievement ids unlocked in the demo profile.
const DEMO_UNLOCKED: &[u8] = &[1, 2, 3];

/// Count-up animation: frames and total duration.
pub const COUNT_UP_STEPS: u32 = 60;
pub const COUNT_UP_MILLIS: u64 = 2000;

// =============================================================================
// LEDGER RECORD
// =============================================================================

/// One item the user reported as recycled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecycledItem {
    pub category: Category,
    pub item: String,
    /// Seconds since the Unix epoch.
    pub recorded_at: u64,
}

impl RecycledItem {
    #[must_use]
    pub fn new(category: Category, item: impl Into<String>, recorded_at: u64) -> Self {
        Self {
            category,
            item: item.into(),
            recorded_at,
        }
    }
}

// =============================================================================
// STATS
// =============================================================================

/// Aggregate impact figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactStats {
    pub items_recycled: u64,
    pub co2_saved_kg: f64,
    pub energy_saved_kwh: f64,
    pub water_saved_l: f64,
    pub trees_saved: f64,
    pub level: u64,
    /// Items still needed to reach the next level.
    pub next_level_items: u64,
    /// Progress through the current level, `0..=100`.
    pub level_progress: u8,
}

impl ImpactStats {
    /// Figures for `items` recycled items.
    #[must_use]
    pub fn for_items(items: u64) -> Self {
        let n = items as f64;
        let into_level = items % ITEMS_PER_LEVEL;
        Self {
            items_recycled: items,
            co2_saved_kg: n * CO2_KG_PER_ITEM,
            energy_saved_kwh: n * ENERGY_KWH_PER_ITEM,
            water_saved_l: n * WATER_L_PER_ITEM,
            trees_saved: n * TREES_PER_ITEM,
            level: items / ITEMS_PER_LEVEL + 1,
            next_level_items: ITEMS_PER_LEVEL - into_level,
            level_progress: (into_level * 100 / ITEMS_PER_LEVEL) as u8,
        }
    }

    /// The fixed demo profile: the figures for twelve items, shown at level 3.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            level: DEMO_LEVEL,
            ..Self::for_items(DEMO_ITEMS)
        }
    }

    /// Everyday equivalents of the figures.
    #[must_use]
    pub fn equivalents(&self) -> Equivalents {
        Equivalents {
            trees_planted: self.co2_saved_kg / 20.0,
            home_days_powered: self.energy_saved_kwh / 30.0,
            people_days_of_water: self.water_saved_l / 8.0,
        }
    }

    /// Count-up animation frames, from near zero to the final figures.
    ///
    /// Frame `i` (1-based) holds the figures scaled by `i / steps`, so the last
    /// frame equals the final values. `steps == 0` yields no frames.
    pub fn count_up(&self, steps: u32) -> impl Iterator<Item = CountUpFrame> + '_ {
        (1..=steps).map(move |step| {
            let progress = f64::from(step) / f64::from(steps);
            CountUpFrame {
                co2_kg: self.co2_saved_kg * progress,
                energy_kwh: self.energy_saved_kwh * progress,
                water_l: self.water_saved_l * progress,
                trees: self.trees_saved * progress,
            }
        })
    }

    /// The achievement catalog with unlock state for these figures.
    #[must_use]
    pub fn achievements(&self) -> Vec<Achievement> {
        ACHIEVEMENTS
            .iter()
            .map(|def| Achievement {
                id: def.id,
                name: def.name,
                description: def.description,
                unlocked: def.goal.reached(self),
            })
            .collect()
    }
}

/// Everyday equivalents shown under each figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equivalents {
    pub trees_planted: f64,
    pub home_days_powered: f64,
    pub people_days_of_water: f64,
}

/// One frame of the count-up animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountUpFrame {
    pub co2_kg: f64,
    pub energy_kwh: f64,
    pub water_l: f64,
    pub trees: f64,
}

// =============================================================================
// ACHIEVEMENTS
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Goal {
    Items(u64),
    Co2Kg(f64),
    EnergyKwh(f64),
}

impl Goal {
    fn reached(self, stats: &ImpactStats) -> bool {
        match self {
            Goal::Items(n) => stats.items_recycled >= n,
            Goal::Co2Kg(kg) => stats.co2_saved_kg >= kg,
            Goal::EnergyKwh(kwh) => stats.energy_saved_kwh >= kwh,
        }
    }
}

struct AchievementDef {
    id: u8,
    name: &'static str,
    description: &'static str,
    goal: Goal,
}

const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: 1,
        name: "First Step",
        description: "Recycled your first item",
        goal: Goal::Items(1),
    },
    AchievementDef {
        id: 2,
        name: "Eco Warrior",
        description: "Recycled 10 items",
        goal: Goal::Items(10),
    },
    AchievementDef {
        id: 3,
        name: "Planet Protector",
        description: "Saved 50kg CO₂",
        goal: Goal::Co2Kg(50.0),
    },
    AchievementDef {
        id: 4,
        name: "Energy Saver",
        description: "Save 100 kWh",
        goal: Goal::EnergyKwh(100.0),
    },
    AchievementDef {
        id: 5,
        name: "Green Champion",
        description: "Recycle 50 items",
        goal: Goal::Items(50),
    },
];

/// An achievement and whether it is unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

// =============================================================================
// REPORT
// =============================================================================

/// Everything the impact page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    pub stats: ImpactStats,
    pub equivalents: Equivalents,
    pub achievements: Vec<Achievement>,
    /// Recycled item counts per category.
    pub by_category: BTreeMap<Category, u64>,
}

impl ImpactReport {
    /// Build a report from per-category counts.
    #[must_use]
    pub fn from_counts(by_category: BTreeMap<Category, u64>) -> Self {
        let total = by_category.values().sum();
        let stats = ImpactStats::for_items(total);
        Self {
            equivalents: stats.equivalents(),
            achievements: stats.achievements(),
            stats,
            by_category,
        }
    }

    /// The demo report; its items are not attributed to categories and its
    /// unlock flags are fixed.
    #[must_use]
    pub fn demo() -> Self {
        let stats = ImpactStats::demo();
        let achievements = ACHIEVEMENTS
            .iter()
            .map(|def| Achievement {
                id: def.id,
                name: def.name,
                description: def.description,
                unlocked: DEMO_UNLOCKED.contains(&def.id),
            })
            .collect();
        Self {
            equivalents: stats.equivalents(),
            achievements,
            stats,
            by_category: BTreeMap::new(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
