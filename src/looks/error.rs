//! Errors surfaced by the look-generation service.
//!
//! Filtering and assembly never fail; they just produce fewer looks. Only
//! argument validation and store transport problems surface as errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookError {
    /// The anchor SKU does not exist in the product catalog.
    #[error("Product not found: {0}")]
    AnchorNotFound(String),

    /// `num_looks` outside the configured range.
    #[error("num_looks must be between 1 and {max}, got {got}")]
    InvalidArgument { got: usize, max: usize },

    /// A store call failed or timed out. No partial response is produced.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}
