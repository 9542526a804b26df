//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (catalog SKUs, scores, etc.), update only
//! this file and `fixtures.rs`.

// ============================================================================
// Test Catalog SKUs
// ============================================================================

/// Gym tank top, the main anchor of the scenario tests
pub const GYM_TANK: &str = "GYM_TANK_001";

/// Athletic shorts (primary bottom)
pub const SHORTS: &str = "SHORTS_001";

/// Running shoe (footwear)
pub const SNEAKER_1: &str = "SNEAKER_001";

/// Street sneaker (footwear)
pub const SNEAKER_2: &str = "SNEAKER_002";

/// Baseball cap (accessory)
pub const CAP: &str = "CAP_001";

/// Beanie (accessory)
pub const BEANIE: &str = "BEANIE_001";

/// Joggers (primary bottom)
pub const JOGGERS: &str = "JOGGERS_001";

/// Hoodie (closed-silhouette outerwear)
pub const HOODIE: &str = "HOODIE_001";

/// Denim jacket (open outerwear)
pub const DENIM_JACKET: &str = "DENIM_JACKET_001";

/// Formal blazer, formality 4 (dropped for the gym anchor)
pub const BLAZER: &str = "BLAZER_001";

/// Statement-piece crop top, second anchor
pub const CROP_TOP: &str = "CROP_TOP_001";

/// Product with no compatibility edges at all
pub const LONER: &str = "LONER_001";

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for the test server to come up
pub const SERVER_READY_TIMEOUT_MS: u64 = 5_000;

/// Poll interval while waiting for readiness
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
