//! Look-generation service.
//!
//! The only public entry point of the core. Owns the response cache and
//! orchestrates the stores, validity filter, clusterer, assembler and
//! scorer. All CPU work runs to completion between store calls; the only
//! suspension points are the store futures, each bounded by a deadline.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::catalog_store::{EdgeStore, Product, ProductStore};
use crate::config::LookGenSettings;

use super::assembler::{assemble, AssembledLook};
use super::cluster::{build_clusters, ClusterSelector};
use super::error::LookError;
use super::models::{Candidate, Look, LookItem, LooksResponse};
use super::scorer::{look_coherence, PairScores};
use super::validity;

/// Request fingerprint: anchor SKU and requested look count.
type Fingerprint = (String, usize);

pub struct LookService {
    product_store: Arc<dyn ProductStore>,
    edge_store: Arc<dyn EdgeStore>,
    settings: LookGenSettings,
    cache: ResponseCache<Fingerprint, LooksResponse>,
}

impl LookService {
    pub fn new(
        product_store: Arc<dyn ProductStore>,
        edge_store: Arc<dyn EdgeStore>,
        settings: LookGenSettings,
    ) -> Self {
        let cache = ResponseCache::new(
            Duration::from_secs(settings.cache_ttl_secs),
            settings.cache_capacity,
        );
        Self {
            product_store,
            edge_store,
            settings,
            cache,
        }
    }

    /// Generate up to `num_looks` distinct looks around `anchor_sku`.
    ///
    /// Within the cache TTL, repeated calls with the same fingerprint return
    /// the identical (shared, frozen) response. A drained candidate pool is
    /// a success with zero looks, not an error.
    pub async fn generate(
        &self,
        anchor_sku: &str,
        num_looks: usize,
    ) -> Result<Arc<LooksResponse>, LookError> {
        if num_looks < 1 || num_looks > self.settings.max_looks {
            return Err(LookError::InvalidArgument {
                got: num_looks,
                max: self.settings.max_looks,
            });
        }

        let fingerprint = (anchor_sku.to_string(), num_looks);
        if let Some(hit) = self.cache.get(&fingerprint) {
            debug!("Cache hit for {:?}", fingerprint);
            return Ok(hit);
        }

        let response = tokio::time::timeout(
            Duration::from_millis(self.settings.request_timeout_ms),
            self.generate_uncached(anchor_sku, num_looks),
        )
        .await
        .map_err(|_| LookError::StoreUnavailable("request deadline exceeded".to_string()))??;

        let response = Arc::new(response);
        self.cache.put(fingerprint, response.clone());
        Ok(response)
    }

    async fn generate_uncached(
        &self,
        anchor_sku: &str,
        num_looks: usize,
    ) -> Result<LooksResponse, LookError> {
        let anchor = self
            .store_call("anchor lookup", self.product_store.get(anchor_sku))
            .await?
            .ok_or_else(|| LookError::AnchorNotFound(anchor_sku.to_string()))?;

        let edges = self
            .store_call(
                "edge lookup",
                self.edge_store
                    .neighbors(anchor_sku, self.settings.min_edge_score),
            )
            .await?;
        if edges.is_empty() {
            debug!("Anchor {} has no edges above threshold", anchor_sku);
            return Ok(empty_response(anchor));
        }

        let peer_skus: Vec<String> = edges.iter().map(|e| e.sku.clone()).collect();
        let mut products = self
            .store_call("product batch", self.product_store.get_many(&peer_skus))
            .await?;
        if products.len() < peer_skus.len() {
            debug!(
                "Product store returned {} of {} peers for {}; dropping the rest",
                products.len(),
                peer_skus.len(),
                anchor_sku
            );
        }

        let mut candidates = Vec::with_capacity(products.len());
        for edge in &edges {
            let Some(product) = products.remove(&edge.sku) else {
                continue;
            };
            if product.slot != edge.target_slot {
                warn!(
                    "Edge {} -> {} declares slot {} but product is {}; dropping peer",
                    anchor_sku, edge.sku, edge.target_slot, product.slot
                );
                continue;
            }
            candidates.push(Candidate {
                product,
                anchor_score: edge.score,
            });
        }
        if candidates.is_empty() {
            // Edges exist but no peer survived resolution: the stores
            // disagree, treat as unavailable rather than "no looks".
            return Err(LookError::StoreUnavailable(format!(
                "none of {} edge peers resolved in product store",
                peer_skus.len()
            )));
        }

        let pool = validity::filter_candidates(&anchor, candidates, &self.settings);
        if pool.is_empty() {
            return Ok(empty_response(anchor));
        }

        let mut scored_skus: Vec<String> = pool.iter().map(|c| c.product.sku.clone()).collect();
        scored_skus.push(anchor.sku.clone());
        let directed = self
            .store_call("pair scores", self.edge_store.pair_scores(&scored_skus))
            .await?;
        let pair_scores = PairScores::new(directed);

        let clusters = build_clusters(&anchor, &pool);
        let mut selector = ClusterSelector::new(clusters);
        let mut accepted: Vec<AssembledLook> = Vec::new();
        let mut seen_member_sets: HashSet<std::collections::BTreeSet<String>> = HashSet::new();

        while accepted.len() < num_looks {
            let Some(cluster) = selector.next(&pool) else {
                break;
            };
            let Some(assembled) =
                assemble(&anchor, &cluster, &pool, &pair_scores, &self.settings)
            else {
                continue;
            };

            let members = assembled.member_skus();
            if !seen_member_sets.insert(members.clone()) {
                continue;
            }
            selector.mark_emitted(members);
            accepted.push(assembled);
        }

        let anchor_color = anchor.primary_color.clone().unwrap_or_default();
        let looks: Vec<Look> = accepted
            .iter()
            .enumerate()
            .map(|(i, assembled)| {
                to_wire_look(
                    i,
                    assembled,
                    &pair_scores,
                    &anchor_color,
                    &self.settings,
                )
            })
            .collect();

        debug!(
            "Generated {} of {} requested looks for {}",
            looks.len(),
            num_looks,
            anchor_sku
        );
        Ok(LooksResponse {
            anchor,
            total_looks: looks.len(),
            looks,
        })
    }

    /// Run a store future under the per-call deadline, normalizing failures
    /// and timeouts to `StoreUnavailable`.
    async fn store_call<T>(
        &self,
        what: &str,
        future: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, LookError> {
        let deadline = Duration::from_millis(self.settings.store_timeout_ms);
        match tokio::time::timeout(deadline, future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Store call failed ({}): {:#}", what, e);
                Err(LookError::StoreUnavailable(format!("{} failed", what)))
            }
            Err(_) => Err(LookError::StoreUnavailable(format!(
                "{} timed out after {:?}",
                what, deadline
            ))),
        }
    }
}

fn empty_response(anchor: Product) -> LooksResponse {
    LooksResponse {
        anchor,
        looks: Vec::new(),
        total_looks: 0,
    }
}

fn to_wire_look(
    index: usize,
    assembled: &AssembledLook,
    pair_scores: &PairScores,
    anchor_color: &str,
    settings: &LookGenSettings,
) -> Look {
    let item_refs: Vec<&Product> = assembled.items.iter().collect();
    let coherence = look_coherence(
        &item_refs,
        pair_scores,
        assembled.dimension,
        &assembled.value,
        anchor_color,
        &settings.coherence_weights,
    );

    let items: BTreeMap<String, LookItem> = assembled
        .items
        .iter()
        .map(|p| (p.slot.as_str().to_string(), LookItem::from_product(p)))
        .collect();
    let slots_filled: Vec<String> = assembled
        .items
        .iter()
        .map(|p| p.slot.as_str().to_string())
        .collect();

    Look {
        id: format!("look_{}", index + 1),
        name: format!("{} {}", assembled.value, assembled.dimension.display_name()),
        dimension: assembled.dimension,
        dimension_value: assembled.value.clone(),
        coherence,
        items,
        slots_filled,
    }
}
