//! Wire and in-memory models for generated looks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog_store::Product;

// =============================================================================
// Dimensions
// =============================================================================

/// Facet along which a look is coherent. Looks are peers; the dimension
/// labels a theme, it does not rank.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Occasion,
    Aesthetic,
    Color,
    Formality,
}

impl Dimension {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Occasion => "occasion",
            Dimension::Aesthetic => "aesthetic",
            Dimension::Color => "color",
            Dimension::Formality => "formality",
        }
    }

    /// Human label used in look names ("Gym Occasion", "Monochrome Color").
    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::Occasion => "Occasion",
            Dimension::Aesthetic => "Aesthetic",
            Dimension::Color => "Color",
            Dimension::Formality => "Formality",
        }
    }

    /// Selection priority: lower sorts first.
    pub fn priority(&self) -> usize {
        match self {
            Dimension::Occasion => 0,
            Dimension::Aesthetic => 1,
            Dimension::Color => 2,
            Dimension::Formality => 3,
        }
    }
}

// =============================================================================
// Candidates
// =============================================================================

/// A product that survived validity filtering, together with its
/// compatibility score to the anchor. Per-request only.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub product: Product,
    pub anchor_score: f64,
}

// =============================================================================
// Wire Types
// =============================================================================

/// Single item in a look, as serialized to clients.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LookItem {
    pub sku: String,
    pub title: String,
    pub brand: String,
    pub image_url: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub color: String,
    pub slot: String,
}

impl LookItem {
    pub fn from_product(product: &Product) -> Self {
        Self {
            sku: product.sku.clone(),
            title: product.display_title().to_string(),
            brand: product.brand.clone().unwrap_or_default(),
            image_url: product.image_url.clone(),
            product_type: product.product_type.clone(),
            color: product.primary_color.clone().unwrap_or_default(),
            slot: product.slot.as_str().to_string(),
        }
    }
}

/// Complete outfit look. Items are keyed by lowercase slot name;
/// `slots_filled` records assembly order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Look {
    pub id: String,
    pub name: String,
    pub dimension: Dimension,
    pub dimension_value: String,
    /// Weighted combination of mean pairwise compatibility, dimension
    /// agreement and slot coverage, in [0, 1], three decimals.
    /// Informational only; looks must not be ranked by it.
    pub coherence: f64,
    pub items: BTreeMap<String, LookItem>,
    pub slots_filled: Vec<String>,
}

/// Response for a look-generation request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LooksResponse {
    pub anchor: Product,
    pub looks: Vec<Look>,
    pub total_looks: usize,
}
