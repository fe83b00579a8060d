//! # Classification
//!
//! The record the AI gateway is forced to produce through its function-calling
//! schema, and the closed set of e-waste categories it may choose from.
//!
//! The gateway output is untrusted: it is deserialized into [`Classification`]
//! and then checked with [`Classification::validate`] before anything is
//! returned to a caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// CATEGORY
// =============================================================================

/// Primary e-waste category.
///
/// Serialized with the display names used in the gateway schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Batteries")]
    Batteries,
    #[serde(rename = "Circuit Boards")]
    CircuitBoards,
    #[serde(rename = "Plastics")]
    Plastics,
    #[serde(rename = "Metals")]
    Metals,
    #[serde(rename = "Displays")]
    Displays,
    #[serde(rename = "Mixed Electronics")]
    MixedElectronics,
}

impl Category {
    /// Every category, in schema order.
    pub const ALL: [Category; 6] = [
        Category::Batteries,
        Category::CircuitBoards,
        Category::Plastics,
        Category::Metals,
        Category::Displays,
        Category::MixedElectronics,
    ];

    /// The display label, identical to the serialized form.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Batteries => "Batteries",
            Category::CircuitBoards => "Circuit Boards",
            Category::Plastics => "Plastics",
            Category::Metals => "Metals",
            Category::Displays => "Displays",
            Category::MixedElectronics => "Mixed Electronics",
        }
    }

    /// Short description used in the classification prompt.
    #[must_use]
    pub fn examples(self) -> &'static str {
        match self {
            Category::Batteries => "rechargeable, alkaline, lithium-ion, etc.",
            Category::CircuitBoards => "PCBs, motherboards, electronic components",
            Category::Plastics => "casings, cables, housings from electronics",
            Category::Metals => "wires, connectors, metal components",
            Category::Displays => "screens, monitors, LCD/LED panels",
            Category::MixedElectronics => "devices with multiple materials",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for an unrecognized category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}' (expected one of: Batteries, Circuit Boards, Plastics, Metals, Displays, Mixed Electronics)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts labels case-insensitively, with spaces, `_` or `-` between words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        Category::ALL
            .into_iter()
            .find(|category| {
                let label: String = category
                    .label()
                    .chars()
                    .filter(|c| *c != ' ')
                    .flat_map(char::to_lowercase)
                    .collect();
                label == wanted
            })
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// A validated classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Primary e-waste category.
    pub category: Category,
    /// Confidence level in percent, `0..=100`.
    pub confidence: f64,
    /// Specific item identification.
    pub item: String,
    /// Materials present.
    pub materials: Vec<String>,
    /// Recycling recommendations.
    pub recycling_guidance: String,
    /// Environmental or health hazards, possibly empty.
    pub hazards: Vec<String>,
    /// Step-by-step disposal instructions.
    pub disposal_steps: Vec<String>,
}

/// Reasons a gateway result is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    #[error("confidence {0} is outside 0..=100")]
    ConfidenceOutOfRange(f64),

    #[error("classification is missing the item identification")]
    MissingItem,
}

impl Classification {
    /// Check the invariants the gateway schema asks for but cannot enforce.
    pub fn validate(&self) -> Result<(), ClassificationError> {
        if !(0.0..=100.0).contains(&self.confidence) {
            return Err(ClassificationError::ConfidenceOutOfRange(self.confidence));
        }
        if self.item.trim().is_empty() {
            return Err(ClassificationError::MissingItem);
        }
        Ok(())
    }

    /// Confidence rounded to a whole percent.
    #[must_use]
    pub fn confidence_percent(&self) -> u8 {
        self.confidence.round().clamp(0.0, 100.0) as u8
    }

    /// One-line notification text.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Identified as {} with {}% confidence",
            self.category,
            self.confidence_percent()
        )
    }

    /// Whether the item carries any listed hazard.
    #[must_use]
    pub fn is_hazardous(&self) -> bool {
        !self.hazards.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
