//! Validity filtering of candidates against the anchor.
//!
//! A candidate survives only if it can in principle join a look around the
//! anchor: different slot, overlapping occasion and season tags, and a
//! bounded formality gap. Silhouette/statement constraints are pairwise and
//! live in the assembler, not here.

use tracing::debug;

use crate::catalog_store::{tags_overlap, Product};
use crate::config::LookGenSettings;

use super::models::Candidate;

/// Whether `candidate` is a valid pairing for `anchor`.
pub fn is_valid(anchor: &Product, candidate: &Product, settings: &LookGenSettings) -> bool {
    if candidate.slot == anchor.slot {
        return false;
    }

    if !sets_compatible(
        &anchor.occasion,
        &candidate.occasion,
        settings.empty_tags_match_all,
    ) {
        return false;
    }

    if !sets_compatible(
        &anchor.season,
        &candidate.season,
        settings.empty_tags_match_all,
    ) {
        return false;
    }

    if let (Some(a), Some(c)) = (anchor.formality_score, candidate.formality_score) {
        if a.abs_diff(c) > settings.formality_spread {
            return false;
        }
    }

    if settings.strict_aesthetics && !tags_overlap(&anchor.aesthetics, &candidate.aesthetics) {
        return false;
    }

    true
}

/// Tag-set compatibility with the configurable empty-set rule: an empty set
/// either matches everything or nothing.
fn sets_compatible(a: &[String], b: &[String], empty_matches_all: bool) -> bool {
    if a.is_empty() || b.is_empty() {
        return empty_matches_all;
    }
    tags_overlap(a, b)
}

/// Filter a candidate pool against the anchor, preserving anchor scores.
pub fn filter_candidates(
    anchor: &Product,
    candidates: Vec<Candidate>,
    settings: &LookGenSettings,
) -> Vec<Candidate> {
    let before = candidates.len();
    let filtered: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| is_valid(anchor, &c.product, settings))
        .collect();
    debug!(
        "Validity filter for {}: {} of {} candidates kept",
        anchor.sku,
        filtered.len(),
        before
    );
    filtered
}
