use anyhow::Result;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::catalog_store::Slot;
use crate::looks::{round3, LookError};

use super::state::{
    CatalogCounts, ServerState, SharedEdgeStore, SharedLookService, SharedProductStore,
};
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub products: usize,
    pub edges: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

impl IntoResponse for LookError {
    fn into_response(self) -> Response {
        let status = match &self {
            LookError::AnchorNotFound(_) => StatusCode::NOT_FOUND,
            LookError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            LookError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, self.to_string()).into_response()
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        products: state.catalog_counts.products,
        edges: state.catalog_counts.edges,
    };
    Json(stats)
}

async fn get_product(
    State(products): State<SharedProductStore>,
    Path(sku): Path<String>,
) -> Response {
    match products.get(&sku).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => (StatusCode::SERVICE_UNAVAILABLE, format!("{}", err)).into_response(),
    }
}

#[derive(Deserialize, Debug)]
struct CompatibleQuery {
    pub slot: Option<String>,
    pub limit: Option<usize>,
    pub min_score: Option<f64>,
}

#[derive(Serialize)]
struct CompatibleItem {
    pub sku: String,
    pub slot: Slot,
    pub score: f64,
}

#[derive(Serialize)]
struct CompatibilityResponse {
    pub source_sku: String,
    pub compatible_items: Vec<CompatibleItem>,
    pub total_count: usize,
}

async fn get_compatible(
    State(state): State<ServerState>,
    Path(sku): Path<String>,
    Query(query): Query<CompatibleQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(20);
    if !(1..=100).contains(&limit) {
        return (StatusCode::BAD_REQUEST, "limit must be within [1, 100]").into_response();
    }
    let min_score = query.min_score.unwrap_or(0.0);
    if !(0.0..=1.0).contains(&min_score) {
        return (StatusCode::BAD_REQUEST, "min_score must be within [0, 1]").into_response();
    }
    let slot_filter = match &query.slot {
        Some(raw) => match Slot::parse(raw) {
            Some(slot) => Some(slot),
            None => return (StatusCode::BAD_REQUEST, "unknown slot").into_response(),
        },
        None => None,
    };

    match state.product_store.get(&sku).await {
        Ok(Some(_)) => {}
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            return (StatusCode::SERVICE_UNAVAILABLE, format!("{}", err)).into_response()
        }
    }

    match state.edge_store.neighbors(&sku, min_score).await {
        Ok(edges) => {
            let compatible_items: Vec<CompatibleItem> = edges
                .into_iter()
                .filter(|e| slot_filter.map_or(true, |s| e.target_slot == s))
                .take(limit)
                .map(|e| CompatibleItem {
                    sku: e.sku,
                    slot: e.target_slot,
                    score: e.score,
                })
                .collect();
            let total_count = compatible_items.len();
            Json(CompatibilityResponse {
                source_sku: sku,
                compatible_items,
                total_count,
            })
            .into_response()
        }
        Err(err) => (StatusCode::SERVICE_UNAVAILABLE, format!("{}", err)).into_response(),
    }
}

#[derive(Deserialize, Debug)]
struct OutfitScoreRequest {
    pub sku_ids: Vec<String>,
}

#[derive(Serialize)]
struct OutfitScoreResponse {
    pub sku_ids: Vec<String>,
    pub total_score: f64,
    pub average_score: f64,
    pub pair_count: usize,
}

async fn score_outfit(
    State(state): State<ServerState>,
    Json(body): Json<OutfitScoreRequest>,
) -> Response {
    if body.sku_ids.len() < 2 || body.sku_ids.len() > 10 {
        return (StatusCode::BAD_REQUEST, "sku_ids must contain 2 to 10 SKUs").into_response();
    }

    let products = match state.product_store.get_many(&body.sku_ids).await {
        Ok(products) => products,
        Err(err) => {
            return (StatusCode::SERVICE_UNAVAILABLE, format!("{}", err)).into_response()
        }
    };
    let missing: Vec<&str> = body
        .sku_ids
        .iter()
        .filter(|sku| !products.contains_key(*sku))
        .map(|sku| sku.as_str())
        .collect();
    if !missing.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            format!("Products not found: {}", missing.join(", ")),
        )
            .into_response();
    }

    let directed = match state.edge_store.pair_scores(&body.sku_ids).await {
        Ok(scores) => scores,
        Err(err) => {
            return (StatusCode::SERVICE_UNAVAILABLE, format!("{}", err)).into_response()
        }
    };

    // Collapse both directions onto unordered pairs, keeping the larger score.
    let mut pairs: HashMap<(String, String), f64> = HashMap::new();
    for ((a, b), score) in directed {
        let key = if a <= b { (a, b) } else { (b, a) };
        let entry = pairs.entry(key).or_insert(score);
        if score > *entry {
            *entry = score;
        }
    }

    let pair_count = pairs.len();
    let total_score: f64 = pairs.values().sum();
    let average_score = if pair_count > 0 {
        total_score / pair_count as f64
    } else {
        0.0
    };

    Json(OutfitScoreResponse {
        sku_ids: body.sku_ids,
        total_score: round3(total_score),
        average_score: round3(average_score),
        pair_count,
    })
    .into_response()
}

#[derive(Deserialize, Debug)]
struct LooksQuery {
    pub num_looks: Option<usize>,
}

async fn generate_looks(
    State(looks): State<SharedLookService>,
    Path(sku): Path<String>,
    Query(query): Query<LooksQuery>,
) -> Response {
    let num_looks = query.num_looks.unwrap_or(3);
    match looks.generate(&sku, num_looks).await {
        Ok(response) => Json(response.as_ref().clone()).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Build the application router. Exposed separately from [`run_server`] so
/// tests can serve it on an ephemeral port.
pub fn make_app(state: ServerState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/product/:sku", get(get_product))
        .route("/product/:sku/compatible", get(get_compatible))
        .route("/outfits/score", post(score_outfit))
        .route("/outfits/:sku/looks", get(generate_looks))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

#[allow(clippy::too_many_arguments)]
pub async fn run_server(
    config: ServerConfig,
    product_store: SharedProductStore,
    edge_store: SharedEdgeStore,
    look_service: SharedLookService,
    catalog_counts: CatalogCounts,
) -> Result<()> {
    let port = config.port;
    let state = ServerState {
        config,
        start_time: Instant::now(),
        product_store,
        edge_store,
        look_service,
        catalog_counts,
    };

    let app = make_app(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
