//! Store trait definitions.
//!
//! These traits abstract the product catalog and the compatibility-edge
//! graph. Both are read-only from the look generator's point of view;
//! ingestion and edge scoring happen in an offline pipeline.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use super::models::{Edge, Product};

/// Read access to product metadata, keyed by SKU.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Get a single product by SKU.
    async fn get(&self, sku: &str) -> Result<Option<Product>>;

    /// Batch-load products. Missing SKUs are omitted from the result map.
    async fn get_many(&self, skus: &[String]) -> Result<HashMap<String, Product>>;
}

/// Read access to the precomputed compatibility graph.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    /// All edges out of `sku` with score >= `min_score`, ordered by score
    /// descending, ties by peer SKU ascending.
    async fn neighbors(&self, sku: &str, min_score: f64) -> Result<Vec<Edge>>;

    /// All stored scores between pairs of the given SKUs, keyed by the
    /// stored `(sku_1, sku_2)` direction. Callers wanting symmetric lookup
    /// take the max over both directions.
    async fn pair_scores(&self, skus: &[String]) -> Result<HashMap<(String, String), f64>>;
}
