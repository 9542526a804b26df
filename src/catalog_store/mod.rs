mod models;
mod schema;
mod store;
mod trait_def;

pub use models::*;
pub use schema::SCHEMA_VERSION;
pub use store::SqliteCatalogStore;
pub use trait_def::{EdgeStore, ProductStore};
