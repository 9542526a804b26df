//! Test server lifecycle management
//!
//! Spawns an isolated server with its own catalog database on a random
//! port; resources are cleaned up when the instance is dropped.

use super::constants::*;
use super::fixtures::create_test_catalog;
use lookbook_server::catalog_store::{EdgeStore, ProductStore, SqliteCatalogStore};
use lookbook_server::config::LookGenSettings;
use lookbook_server::looks::LookService;
use lookbook_server::server::state::{CatalogCounts, ServerState};
use lookbook_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated catalog database.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server with default look-generation settings.
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(LookGenSettings::default()).await
    }

    /// Spawns a new test server on a random port.
    ///
    /// # Panics
    ///
    /// Panics if catalog creation, port binding or startup fail, or if the
    /// server does not become ready within the timeout.
    pub async fn spawn_with_settings(settings: LookGenSettings) -> Self {
        let (temp_dir, db_path) = create_test_catalog().expect("Failed to create test catalog");

        let store =
            Arc::new(SqliteCatalogStore::new(&db_path).expect("Failed to open catalog store"));
        let catalog_counts = CatalogCounts {
            products: store.get_products_count(),
            edges: store.get_edges_count(),
        };

        let product_store: Arc<dyn ProductStore> = store.clone();
        let edge_store: Arc<dyn EdgeStore> = store.clone();
        let look_service = Arc::new(LookService::new(
            product_store.clone(),
            edge_store.clone(),
            settings,
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let state = ServerState {
            config: ServerConfig {
                port,
                requests_logging_level: RequestsLoggingLevel::None,
            },
            start_time: Instant::now(),
            product_store,
            edge_store,
            look_service,
            catalog_counts,
        };
        let app = make_app(state);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;
        server
    }

    /// Waits for the server to become ready by polling the stats endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
