//! Catalog models for the fashion product and compatibility-edge stores.
//!
//! Products carry the wardrobe-slot and styling tags the look generator
//! filters and clusters on; edges carry precomputed pairwise compatibility
//! scores produced by the offline scoring pipeline.

use serde::{Deserialize, Serialize};

// =============================================================================
// Wardrobe Slots
// =============================================================================

/// Exclusive wardrobe role a product fills. A look holds at most one item
/// per slot, and the anchor's slot is never replaced.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    #[serde(rename = "base top")]
    BaseTop,
    #[serde(rename = "outerwear")]
    Outerwear,
    #[serde(rename = "primary bottom")]
    PrimaryBottom,
    #[serde(rename = "secondary bottom")]
    SecondaryBottom,
    #[serde(rename = "footwear")]
    Footwear,
    #[serde(rename = "accessory")]
    Accessory,
}

/// All slots, used for coverage computation.
pub const ALL_SLOTS: [Slot; 6] = [
    Slot::BaseTop,
    Slot::Outerwear,
    Slot::PrimaryBottom,
    Slot::SecondaryBottom,
    Slot::Footwear,
    Slot::Accessory,
];

/// Fixed order in which the assembler fills non-anchor slots.
pub const ASSEMBLY_ORDER: [Slot; 6] = [
    Slot::Outerwear,
    Slot::BaseTop,
    Slot::PrimaryBottom,
    Slot::SecondaryBottom,
    Slot::Footwear,
    Slot::Accessory,
];

impl Slot {
    /// Canonical lowercase name, used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::BaseTop => "base top",
            Slot::Outerwear => "outerwear",
            Slot::PrimaryBottom => "primary bottom",
            Slot::SecondaryBottom => "secondary bottom",
            Slot::Footwear => "footwear",
            Slot::Accessory => "accessory",
        }
    }

    /// Parse a slot name case-insensitively ("Base Top", "base top", ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "base top" => Some(Slot::BaseTop),
            "outerwear" => Some(Slot::Outerwear),
            "primary bottom" => Some(Slot::PrimaryBottom),
            "secondary bottom" => Some(Slot::SecondaryBottom),
            "footwear" => Some(Slot::Footwear),
            "accessory" => Some(Slot::Accessory),
            _ => None,
        }
    }

    /// True for the two bottom slots, which some pairwise rules single out.
    pub fn is_bottom(&self) -> bool {
        matches!(self, Slot::PrimaryBottom | Slot::SecondaryBottom)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Products
// =============================================================================

/// A catalog product. Tag sets (`occasion`, `aesthetics`, `season`) have set
/// semantics: no duplicates, order irrelevant, compared case-insensitively.
/// An empty `season` means all-season.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub image_url: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub category: String,
    pub slot: Slot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub occasion: Vec<String>,
    #[serde(default)]
    pub aesthetics: Vec<String>,
    #[serde(default)]
    pub season: Vec<String>,
    /// 1..=5. Absent means the product cannot participate in
    /// formality-dimension clusters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formality_score: Option<u8>,
    /// Informational label ("Casual", "Smart Casual", ...). Forwarded only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formality_level: Option<String>,
    #[serde(default)]
    pub statement_piece: bool,
}

impl Product {
    /// Display title, falling back to the product type when untitled.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.product_type)
    }

    /// True when this is a statement-piece top (base-top slot).
    pub fn is_statement_top(&self) -> bool {
        self.statement_piece && self.slot == Slot::BaseTop
    }

    /// Case-insensitive membership test against a tag set.
    pub fn has_tag(tags: &[String], value: &str) -> bool {
        tags.iter().any(|t| t.eq_ignore_ascii_case(value))
    }
}

/// Case-insensitive set overlap. Both sides non-empty is required for a
/// meaningful comparison; callers decide what an empty side means.
pub fn tags_overlap(a: &[String], b: &[String]) -> bool {
    a.iter()
        .any(|x| b.iter().any(|y| x.eq_ignore_ascii_case(y)))
}

// =============================================================================
// Compatibility Edges
// =============================================================================

/// A directed compatibility edge from some source SKU to `sku`, as returned
/// by [`EdgeStore::neighbors`](super::EdgeStore::neighbors). `target_slot`
/// always equals the slot of `sku`; `score` is in [0, 1] with three decimal
/// digits of precision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub sku: String,
    pub target_slot: Slot,
    pub score: f64,
}
