//! SQLite-backed catalog store implementation.
//!
//! Serves both store traits from a single database file: product metadata
//! and the precomputed compatibility-edge graph. Reads go through a small
//! round-robin connection pool so concurrent requests do not serialize on a
//! single connection.

use super::models::{Edge, Product, Slot};
use super::schema::apply_schema;
use super::trait_def::{EdgeStore, ProductStore};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Upper bound on SKUs per `IN (...)` list, kept well under SQLite's
/// bound-variable limit.
const SKU_CHUNK_SIZE: usize = 400;

/// SQLite-backed store for products and compatibility edges.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

impl SqliteCatalogStore {
    /// Open (or create) the catalog database at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::with_read_pool_size(db_path, 4)
    }

    pub fn with_read_pool_size<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        apply_schema(&write_conn)?;

        let product_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM products", [], |r| r.get(0))
            .unwrap_or(0);
        let edge_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM compatibility_edges", [], |r| r.get(0))
            .unwrap_or(0);

        info!(
            "Opened catalog: {} products, {} compatibility edges",
            product_count, edge_count
        );

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalogStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    // =========================================================================
    // Counts (for startup logging and the stats endpoint)
    // =========================================================================

    pub fn get_products_count(&self) -> usize {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM products", [], |r| r.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }

    pub fn get_edges_count(&self) -> usize {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM compatibility_edges", [], |r| {
            r.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }

    // =========================================================================
    // Write Operations (used by seeding and test fixtures)
    // =========================================================================

    pub fn insert_product(&self, product: &Product) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO products (
                sku, title, brand, image_url, product_type, category, slot,
                primary_color, occasion, aesthetics, season,
                formality_score, formality_level, statement_piece
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                product.sku,
                product.title,
                product.brand,
                product.image_url,
                product.product_type,
                product.category,
                product.slot.as_str(),
                product.primary_color,
                serde_json::to_string(&product.occasion)?,
                serde_json::to_string(&product.aesthetics)?,
                serde_json::to_string(&product.season)?,
                product.formality_score,
                product.formality_level,
                product.statement_piece as i64,
            ],
        )?;
        Ok(())
    }

    /// Insert a directed edge. `target_slot` must be the slot of `sku_2`.
    pub fn insert_edge(&self, sku_1: &str, sku_2: &str, target_slot: Slot, score: f64) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO compatibility_edges (sku_1, sku_2, target_slot, score)
             VALUES (?1, ?2, ?3, ?4)",
            params![sku_1, sku_2, target_slot.as_str(), score],
        )?;
        Ok(())
    }

    // =========================================================================
    // Row Mapping
    // =========================================================================

    fn row_to_product(row: &Row) -> rusqlite::Result<ProductRow> {
        Ok(ProductRow {
            sku: row.get("sku")?,
            title: row.get("title")?,
            brand: row.get("brand")?,
            image_url: row.get("image_url")?,
            product_type: row.get("product_type")?,
            category: row.get("category")?,
            slot: row.get("slot")?,
            primary_color: row.get("primary_color")?,
            occasion: row.get("occasion")?,
            aesthetics: row.get("aesthetics")?,
            season: row.get("season")?,
            formality_score: row.get("formality_score")?,
            formality_level: row.get("formality_level")?,
            statement_piece: row.get::<_, i64>("statement_piece")? != 0,
        })
    }

    const PRODUCT_COLUMNS: &'static str = "sku, title, brand, image_url, product_type, category, \
         slot, primary_color, occasion, aesthetics, season, formality_score, formality_level, \
         statement_piece";
}

/// Intermediate row with raw JSON columns, decoded into [`Product`] outside
/// of the rusqlite row callback so decode errors carry context.
struct ProductRow {
    sku: String,
    title: Option<String>,
    brand: Option<String>,
    image_url: String,
    product_type: String,
    category: String,
    slot: String,
    primary_color: Option<String>,
    occasion: Option<String>,
    aesthetics: Option<String>,
    season: Option<String>,
    formality_score: Option<u8>,
    formality_level: Option<String>,
    statement_piece: bool,
}

impl ProductRow {
    fn decode(self) -> Result<Product> {
        let slot = Slot::parse(&self.slot)
            .ok_or_else(|| anyhow!("Product {} has unknown slot {:?}", self.sku, self.slot))?;
        Ok(Product {
            sku: self.sku,
            title: self.title,
            brand: self.brand,
            image_url: self.image_url,
            product_type: self.product_type,
            category: self.category,
            slot,
            primary_color: self.primary_color,
            occasion: decode_tags(self.occasion.as_deref())?,
            aesthetics: decode_tags(self.aesthetics.as_deref())?,
            season: decode_tags(self.season.as_deref())?,
            formality_score: self.formality_score,
            formality_level: self.formality_level,
            statement_piece: self.statement_piece,
        })
    }
}

fn decode_tags(raw: Option<&str>) -> Result<Vec<String>> {
    match raw {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).context("Failed to decode tag array"),
    }
}

fn placeholders(count: usize) -> String {
    let mut s = String::with_capacity(count * 2);
    for i in 0..count {
        if i > 0 {
            s.push(',');
        }
        s.push('?');
    }
    s
}

#[async_trait]
impl ProductStore for SqliteCatalogStore {
    async fn get(&self, sku: &str) -> Result<Option<Product>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        let query = format!(
            "SELECT {} FROM products WHERE sku = ?1",
            Self::PRODUCT_COLUMNS
        );
        match conn.query_row(&query, params![sku], Self::row_to_product) {
            Ok(row) => Ok(Some(row.decode()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_many(&self, skus: &[String]) -> Result<HashMap<String, Product>> {
        let mut result = HashMap::with_capacity(skus.len());
        if skus.is_empty() {
            return Ok(result);
        }

        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        for chunk in skus.chunks(SKU_CHUNK_SIZE) {
            let query = format!(
                "SELECT {} FROM products WHERE sku IN ({})",
                Self::PRODUCT_COLUMNS,
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(chunk), Self::row_to_product)?;
            for row in rows {
                let product = row?.decode()?;
                result.insert(product.sku.clone(), product);
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl EdgeStore for SqliteCatalogStore {
    async fn neighbors(&self, sku: &str, min_score: f64) -> Result<Vec<Edge>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT sku_2, target_slot, score FROM compatibility_edges
             WHERE sku_1 = ?1 AND score >= ?2
             ORDER BY score DESC, sku_2 ASC",
        )?;
        let rows = stmt.query_map(params![sku, min_score], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        let mut edges = Vec::new();
        for row in rows {
            let (peer, slot_raw, score) = row?;
            let target_slot = Slot::parse(&slot_raw)
                .ok_or_else(|| anyhow!("Edge {} -> {} has unknown slot {:?}", sku, peer, slot_raw))?;
            edges.push(Edge {
                sku: peer,
                target_slot,
                score,
            });
        }
        Ok(edges)
    }

    async fn pair_scores(&self, skus: &[String]) -> Result<HashMap<(String, String), f64>> {
        let mut result = HashMap::new();
        if skus.len() < 2 {
            return Ok(result);
        }

        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        // Chunk both IN lists; every chunk pair is queried so the full
        // cross product is covered.
        for chunk_a in skus.chunks(SKU_CHUNK_SIZE) {
            for chunk_b in skus.chunks(SKU_CHUNK_SIZE) {
                let query = format!(
                    "SELECT sku_1, sku_2, score FROM compatibility_edges
                     WHERE sku_1 IN ({}) AND sku_2 IN ({})",
                    placeholders(chunk_a.len()),
                    placeholders(chunk_b.len())
                );
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map(
                    rusqlite::params_from_iter(chunk_a.iter().chain(chunk_b.iter())),
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, f64>(2)?,
                        ))
                    },
                )?;
                for row in rows {
                    let (a, b, score) = row?;
                    result.insert((a, b), score);
                }
            }
        }
        Ok(result)
    }
}
