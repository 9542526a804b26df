use axum::extract::FromRef;

use crate::catalog_store::{EdgeStore, ProductStore};
use crate::looks::LookService;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type SharedProductStore = Arc<dyn ProductStore>;
pub type SharedEdgeStore = Arc<dyn EdgeStore>;
pub type SharedLookService = Arc<LookService>;

/// Catalog sizes captured at startup, reported by the stats endpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogCounts {
    pub products: usize,
    pub edges: usize,
}

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub product_store: SharedProductStore,
    pub edge_store: SharedEdgeStore,
    pub look_service: SharedLookService,
    pub catalog_counts: CatalogCounts,
}

impl FromRef<ServerState> for SharedProductStore {
    fn from_ref(input: &ServerState) -> Self {
        input.product_store.clone()
    }
}

impl FromRef<ServerState> for SharedEdgeStore {
    fn from_ref(input: &ServerState) -> Self {
        input.edge_store.clone()
    }
}

impl FromRef<ServerState> for SharedLookService {
    fn from_ref(input: &ServerState) -> Self {
        input.look_service.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
