//! SQLite schema for the catalog database.
//!
//! Two tables: `products` (tag sets JSON-encoded) and `compatibility_edges`
//! (one row per directed scored pair). Schema revisions are tracked with the
//! `user_version` pragma and applied in order on open.

use anyhow::{bail, Result};
use rusqlite::Connection;

/// Current schema version. Bump when appending to [`MIGRATIONS`].
pub const SCHEMA_VERSION: i32 = 1;

/// One batch per version, applied when `user_version` is below it.
const MIGRATIONS: &[&str] = &[
    // Version 1: initial tables.
    "
    CREATE TABLE products (
        sku             TEXT PRIMARY KEY,
        title           TEXT,
        brand           TEXT,
        image_url       TEXT NOT NULL,
        product_type    TEXT NOT NULL,
        category        TEXT NOT NULL,
        slot            TEXT NOT NULL,
        primary_color   TEXT,
        occasion        TEXT, -- JSON array: [\"Gym\", \"Casual\"]
        aesthetics      TEXT, -- JSON array
        season          TEXT, -- JSON array; empty/NULL means all-season
        formality_score INTEGER,
        formality_level TEXT,
        statement_piece INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE compatibility_edges (
        sku_1       TEXT NOT NULL,
        sku_2       TEXT NOT NULL,
        target_slot TEXT NOT NULL,
        score       REAL NOT NULL,
        UNIQUE (sku_1, sku_2)
    );

    CREATE INDEX idx_edges_outgoing ON compatibility_edges (sku_1, score DESC, sku_2);
    ",
];

/// Apply any pending migrations to bring the database to [`SCHEMA_VERSION`].
pub fn apply_schema(conn: &Connection) -> Result<()> {
    let current: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if current > SCHEMA_VERSION {
        bail!(
            "Catalog database schema version {} is newer than supported version {}",
            current,
            SCHEMA_VERSION
        );
    }

    for version in current..SCHEMA_VERSION {
        conn.execute_batch(MIGRATIONS[version as usize])?;
        conn.pragma_update(None, "user_version", version + 1)?;
    }

    Ok(())
}
