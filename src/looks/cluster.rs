//! Dimension clustering and cluster selection.
//!
//! The clusterer partitions the valid candidate pool into overlapping
//! clusters keyed by `(dimension, value)`; the selector serves them in
//! priority order while refusing clusters that could only reproduce an
//! already-emitted look.

use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::debug;

use crate::catalog_store::Product;

use super::color::ColorStrategy;
use super::models::{Candidate, Dimension};

/// A candidate cluster. `members` are indices into the request's pool.
#[derive(Clone, Debug)]
pub struct Cluster {
    pub dimension: Dimension,
    pub value: String,
    pub members: Vec<usize>,
    pub mean_anchor_score: f64,
}

/// Whether a product shares the given dimension value. The anchor color is
/// needed for the synthetic color-strategy buckets.
pub fn matches_dimension(
    product: &Product,
    dimension: Dimension,
    value: &str,
    anchor_color: &str,
) -> bool {
    match dimension {
        Dimension::Occasion => Product::has_tag(&product.occasion, value),
        Dimension::Aesthetic => Product::has_tag(&product.aesthetics, value),
        Dimension::Color => match ColorStrategy::parse(value) {
            Some(strategy) => {
                let color = product.primary_color.as_deref().unwrap_or("");
                strategy.matches(color, anchor_color)
            }
            None => false,
        },
        Dimension::Formality => match value.parse::<u8>() {
            Ok(v) => product.formality_score == Some(v),
            Err(_) => false,
        },
    }
}

/// Build all clusters for the pool, ordered for selection: dimension
/// priority first (occasion, aesthetic, color, formality), then descending
/// cluster-mean anchor score, descending size, value lexicographically.
///
/// Clusters spanning fewer than two distinct non-anchor slots are dropped;
/// they cannot build even a pair.
pub fn build_clusters(anchor: &Product, pool: &[Candidate]) -> Vec<Cluster> {
    let anchor_color = anchor.primary_color.as_deref().unwrap_or("");
    let mut clusters = Vec::new();

    let mut push_cluster = |dimension: Dimension, value: &str| {
        let members: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, c)| matches_dimension(&c.product, dimension, value, anchor_color))
            .map(|(i, _)| i)
            .collect();

        let distinct_slots: HashSet<_> = members.iter().map(|&i| pool[i].product.slot).collect();
        if distinct_slots.len() < 2 {
            return;
        }

        let mean_anchor_score =
            members.iter().map(|&i| pool[i].anchor_score).sum::<f64>() / members.len() as f64;
        clusters.push(Cluster {
            dimension,
            value: value.to_string(),
            members,
            mean_anchor_score,
        });
    };

    for value in dedup_tags(&anchor.occasion) {
        push_cluster(Dimension::Occasion, value);
    }
    for value in dedup_tags(&anchor.aesthetics) {
        push_cluster(Dimension::Aesthetic, value);
    }
    for strategy in ColorStrategy::ALL {
        push_cluster(Dimension::Color, strategy.as_str());
    }
    if let Some(anchor_formality) = anchor.formality_score {
        for value in formality_band(anchor_formality) {
            push_cluster(Dimension::Formality, &value.to_string());
        }
    }

    clusters.sort_by(|a, b| {
        a.dimension
            .priority()
            .cmp(&b.dimension.priority())
            .then(
                b.mean_anchor_score
                    .partial_cmp(&a.mean_anchor_score)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(b.members.len().cmp(&a.members.len()))
            .then(a.value.cmp(&b.value))
    });

    debug!(
        "Built {} clusters for anchor {} over {} candidates",
        clusters.len(),
        anchor.sku,
        pool.len()
    );
    clusters
}

/// Anchor tag values with case-insensitive duplicates removed, first
/// spelling wins.
fn dedup_tags(tags: &[String]) -> Vec<&String> {
    let mut seen = HashSet::new();
    tags.iter()
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

/// Formality values within one step of the anchor's, clamped to 1..=5.
fn formality_band(anchor: u8) -> Vec<u8> {
    let mut band = Vec::with_capacity(3);
    for v in anchor.saturating_sub(1)..=anchor.saturating_add(1) {
        if (1..=5).contains(&v) && !band.contains(&v) {
            band.push(v);
        }
    }
    band
}

// =============================================================================
// Cluster Selection
// =============================================================================

/// Serves clusters in priority order. Each `(dimension, value)` pair is
/// handed out at most once, and a cluster whose membership is a subset of
/// an already-emitted look's items is skipped: under a different label it
/// could only rebuild the same look.
pub struct ClusterSelector {
    queue: VecDeque<Cluster>,
    used: HashSet<(Dimension, String)>,
    emitted: Vec<BTreeSet<String>>,
}

impl ClusterSelector {
    /// `clusters` must already be in selection order (see [`build_clusters`]).
    pub fn new(clusters: Vec<Cluster>) -> Self {
        Self {
            queue: clusters.into(),
            used: HashSet::new(),
            emitted: Vec::new(),
        }
    }

    /// Pop the highest-priority cluster that is still usable.
    pub fn next(&mut self, pool: &[Candidate]) -> Option<Cluster> {
        while let Some(cluster) = self.queue.pop_front() {
            let key = (cluster.dimension, cluster.value.to_lowercase());
            if self.used.contains(&key) {
                continue;
            }

            let member_skus: BTreeSet<&str> = cluster
                .members
                .iter()
                .map(|&i| pool[i].product.sku.as_str())
                .collect();
            let redundant = self.emitted.iter().any(|look| {
                member_skus.iter().all(|sku| look.contains(*sku))
            });
            if redundant {
                debug!(
                    "Skipping cluster {:?}/{}: members covered by an emitted look",
                    cluster.dimension, cluster.value
                );
                continue;
            }

            self.used.insert(key);
            return Some(cluster);
        }
        None
    }

    /// Record the member SKUs of an accepted look (anchor included).
    pub fn mark_emitted(&mut self, member_skus: BTreeSet<String>) {
        self.emitted.push(member_skus);
    }
}
