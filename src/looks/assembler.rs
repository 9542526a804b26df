//! Greedy per-look slot assembly.
//!
//! Given a cluster of candidates, fills each wardrobe slot (other than the
//! anchor's) with the candidate that most increases coherence with the items
//! already chosen, subject to the pairwise fashion rules. A look that ends
//! up without footwear and accessory, or with fewer than three items, is
//! rejected.

use std::collections::HashMap;
use tracing::debug;

use crate::catalog_store::{Product, Slot, ASSEMBLY_ORDER};
use crate::config::LookGenSettings;

use super::cluster::Cluster;
use super::color::{accessory_allowed, classify_palette};
use super::models::{Candidate, Dimension};
use super::scorer::{coherence_increment, PairScores};

/// Closed-silhouette outerwear categories. A statement top stays visible
/// only under open outerwear.
const CLOSED_OUTERWEAR: &[&str] = &["hoodie", "knit", "puffer", "zip jacket"];

/// An assembled look before wire conversion: products in assembly order,
/// anchor first.
#[derive(Clone, Debug)]
pub struct AssembledLook {
    pub dimension: Dimension,
    pub value: String,
    pub items: Vec<Product>,
}

impl AssembledLook {
    /// SKUs of all items, anchor included.
    pub fn member_skus(&self) -> std::collections::BTreeSet<String> {
        self.items.iter().map(|p| p.sku.clone()).collect()
    }
}

/// Assemble one look from `cluster`. Pure function of its inputs; returns
/// None when the cluster cannot produce an acceptable look.
pub fn assemble(
    anchor: &Product,
    cluster: &Cluster,
    pool: &[Candidate],
    pair_scores: &PairScores,
    settings: &LookGenSettings,
) -> Option<AssembledLook> {
    let anchor_color = anchor.primary_color.as_deref().unwrap_or("");
    let mut items: Vec<&Product> = vec![anchor];

    // Index the cluster by slot once; each slot pass only touches its own
    // candidates.
    let mut by_slot: HashMap<Slot, Vec<usize>> = HashMap::new();
    for &index in &cluster.members {
        by_slot.entry(pool[index].product.slot).or_default().push(index);
    }

    for slot in ASSEMBLY_ORDER {
        if slot == anchor.slot {
            continue;
        }
        let Some(slot_members) = by_slot.get(&slot) else {
            continue;
        };

        let mut best: Option<(f64, f64, usize)> = None; // (increment, anchor score, pool index)
        for &index in slot_members {
            let candidate = &pool[index];
            if !obeys_pairwise_rules(&candidate.product, &items, settings) {
                continue;
            }

            let increment = coherence_increment(
                &candidate.product,
                &items,
                pair_scores,
                cluster.dimension,
                &cluster.value,
                anchor_color,
                &settings.coherence_weights,
            );

            let better = match &best {
                None => true,
                Some((best_inc, best_anchor, best_index)) => {
                    increment > *best_inc
                        || (increment == *best_inc
                            && (candidate.anchor_score > *best_anchor
                                || (candidate.anchor_score == *best_anchor
                                    && candidate.product.sku < pool[*best_index].product.sku)))
                }
            };
            if better {
                best = Some((increment, candidate.anchor_score, index));
            }
        }

        if let Some((_, _, index)) = best {
            items.push(&pool[index].product);
        }
    }

    let has_foot_or_accessory = items
        .iter()
        .any(|p| matches!(p.slot, Slot::Footwear | Slot::Accessory));
    if !has_foot_or_accessory {
        debug!(
            "Rejecting {:?}/{} look: no footwear or accessory",
            cluster.dimension, cluster.value
        );
        return None;
    }

    if items.len() < 3 {
        debug!(
            "Rejecting {:?}/{} look: only {} items",
            cluster.dimension,
            cluster.value,
            items.len()
        );
        return None;
    }

    Some(AssembledLook {
        dimension: cluster.dimension,
        value: cluster.value.clone(),
        items: items.into_iter().cloned().collect(),
    })
}

/// Whether `candidate` may join a look currently holding `items`.
fn obeys_pairwise_rules(
    candidate: &Product,
    items: &[&Product],
    settings: &LookGenSettings,
) -> bool {
    for item in items {
        if !pair_allowed(candidate, item, settings) {
            return false;
        }
    }

    if candidate.slot == Slot::Accessory {
        let palette_colors: Vec<String> = items
            .iter()
            .filter(|p| p.slot != Slot::Accessory)
            .filter_map(|p| p.primary_color.as_deref())
            .filter(|c| !c.is_empty())
            .map(|c| c.to_lowercase())
            .collect();
        let palette = classify_palette(&palette_colors);
        let color = candidate.primary_color.as_deref().unwrap_or("");
        if !accessory_allowed(color, &palette) {
            return false;
        }
    }

    true
}

/// Symmetric pair check: sku uniqueness, intra-look formality spread, and
/// the statement-piece silhouette rules.
fn pair_allowed(a: &Product, b: &Product, settings: &LookGenSettings) -> bool {
    if a.sku == b.sku {
        return false;
    }

    if let (Some(fa), Some(fb)) = (a.formality_score, b.formality_score) {
        if fa.abs_diff(fb) > settings.intra_look_formality_spread {
            return false;
        }
    }

    if breaks_statement_rules(a, b) || breaks_statement_rules(b, a) {
        return false;
    }

    true
}

/// Statement-top constraints against a single other item.
fn breaks_statement_rules(top: &Product, other: &Product) -> bool {
    if !top.is_statement_top() {
        return false;
    }

    if other.slot.is_bottom() && Product::has_tag(&other.aesthetics, "Athletic") {
        return true;
    }

    if other.slot == Slot::Outerwear && is_closed_outerwear(other) {
        return true;
    }

    false
}

fn is_closed_outerwear(product: &Product) -> bool {
    let category = product.category.to_lowercase();
    let product_type = product.product_type.to_lowercase();
    CLOSED_OUTERWEAR
        .iter()
        .any(|c| category == *c || product_type == *c)
}
