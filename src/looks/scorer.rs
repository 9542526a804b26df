//! Pairwise score table and coherence scoring.
//!
//! Edge scores are directed in storage; scoring always reads them
//! symmetrically (max over both directions, 0 when absent). The table is
//! materialized once per request so assembly is pure lookups.

use std::collections::HashMap;

use crate::catalog_store::{Product, ALL_SLOTS};
use crate::config::CoherenceWeights;

use super::cluster::matches_dimension;
use super::models::Dimension;

/// Symmetric pair-score lookup over the request's candidate pool.
pub struct PairScores {
    scores: HashMap<(String, String), f64>,
}

impl PairScores {
    /// Build from stored directed edges; both directions collapse onto an
    /// ordered key, keeping the larger score when both exist.
    pub fn new(directed: HashMap<(String, String), f64>) -> Self {
        let mut scores = HashMap::with_capacity(directed.len());
        for ((a, b), score) in directed {
            let key = Self::key(&a, &b);
            let entry = scores.entry(key).or_insert(score);
            if score > *entry {
                *entry = score;
            }
        }
        Self { scores }
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    /// Symmetric score, 0.0 when no edge exists in either direction.
    pub fn get(&self, a: &str, b: &str) -> f64 {
        self.scores.get(&Self::key(a, b)).copied().unwrap_or(0.0)
    }
}

/// Round to the three decimal digits the wire format carries.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Marginal coherence of adding `candidate` to a partial look: mean edge
/// score against the current items, plus a dimension-agreement bonus
/// weighted by the dimension-agreement coefficient.
pub fn coherence_increment(
    candidate: &Product,
    look: &[&Product],
    pair_scores: &PairScores,
    dimension: Dimension,
    value: &str,
    anchor_color: &str,
    weights: &CoherenceWeights,
) -> f64 {
    if look.is_empty() {
        return 0.0;
    }

    let mean = look
        .iter()
        .map(|item| pair_scores.get(&candidate.sku, &item.sku))
        .sum::<f64>()
        / look.len() as f64;

    let sharing = look
        .iter()
        .map(|item| *item)
        .chain(std::iter::once(candidate))
        .filter(|p| matches_dimension(p, dimension, value, anchor_color))
        .count();
    let bonus = sharing as f64 / (look.len() + 1) as f64;

    mean + bonus * weights.dimension_agreement
}

/// Final coherence of an assembled look, in [0, 1], three decimals.
pub fn look_coherence(
    items: &[&Product],
    pair_scores: &PairScores,
    dimension: Dimension,
    value: &str,
    anchor_color: &str,
    weights: &CoherenceWeights,
) -> f64 {
    let mean_pairwise = mean_pairwise_score(items, pair_scores);

    let sharing = items
        .iter()
        .filter(|p| matches_dimension(p, dimension, value, anchor_color))
        .count();
    let dimension_agreement = if items.is_empty() {
        0.0
    } else {
        sharing as f64 / items.len() as f64
    };

    let slot_coverage = items.len() as f64 / ALL_SLOTS.len() as f64;

    round3(
        weights.mean_pairwise * mean_pairwise
            + weights.dimension_agreement * dimension_agreement
            + weights.slot_coverage * slot_coverage,
    )
}

/// Mean symmetric score over all item pairs.
fn mean_pairwise_score(items: &[&Product], pair_scores: &PairScores) -> f64 {
    let m = items.len();
    if m < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..m {
        for j in (i + 1)..m {
            total += pair_scores.get(&items[i].sku, &items[j].sku);
        }
    }
    total / (m * (m - 1) / 2) as f64
}
