use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cache;
mod catalog_store;
mod config;
mod looks;
mod server;

use catalog_store::{EdgeStore, ProductStore, SqliteCatalogStore};
use config::{AppConfig, CliConfig, FileConfig};
use looks::LookService;
use server::state::CatalogCounts;
use server::{run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite catalog database file.
    #[clap(value_parser = parse_path)]
    pub catalog_db: Option<PathBuf>,

    /// Path to a TOML config file. Values there override CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        catalog_db: cli_args.catalog_db,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!(
        "Opening SQLite catalog database at {:?}...",
        app_config.catalog_db
    );
    let store = Arc::new(SqliteCatalogStore::new(&app_config.catalog_db)?);
    let catalog_counts = CatalogCounts {
        products: store.get_products_count(),
        edges: store.get_edges_count(),
    };

    let product_store: Arc<dyn ProductStore> = store.clone();
    let edge_store: Arc<dyn EdgeStore> = store.clone();
    let look_service = Arc::new(LookService::new(
        product_store.clone(),
        edge_store.clone(),
        app_config.looks.clone(),
    ));

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
    };

    info!("Ready to serve at port {}!", server_config.port);
    run_server(
        server_config,
        product_store,
        edge_store,
        look_service,
        catalog_counts,
    )
    .await
}
