//! Test fixture creation for the catalog database
//!
//! Builds a small fashion catalog with hand-picked compatibility scores so
//! the expected looks (and their coherence values) can be verified by hand.

use super::constants::*;
use anyhow::Result;
use lookbook_server::catalog_store::{Product, Slot, SqliteCatalogStore};
use std::path::PathBuf;
use tempfile::TempDir;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn product(
    sku: &str,
    slot: Slot,
    product_type: &str,
    category: &str,
    color: &str,
    occasion: &[&str],
    aesthetics: &[&str],
    formality: u8,
    statement: bool,
) -> Product {
    Product {
        sku: sku.to_string(),
        title: Some(format!("Test {}", product_type)),
        brand: Some("Fixture & Co".to_string()),
        image_url: format!("images/{}.jpg", sku),
        product_type: product_type.to_string(),
        category: category.to_string(),
        slot,
        primary_color: Some(color.to_string()),
        occasion: strings(occasion),
        aesthetics: strings(aesthetics),
        season: vec![], // all-season
        formality_score: Some(formality),
        formality_level: None,
        statement_piece: statement,
    }
}

/// Creates a temporary catalog database seeded with the scenario products
/// and edges. Returns (temp_dir, db_path).
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("catalog.db");
    let store = SqliteCatalogStore::new(&db_path)?;

    // Anchors
    store.insert_product(&product(
        GYM_TANK,
        Slot::BaseTop,
        "tank top",
        "Tops",
        "Black",
        &["Gym", "Casual", "Everyday"],
        &["Athletic", "Streetwear"],
        1,
        false,
    ))?;
    store.insert_product(&product(
        CROP_TOP,
        Slot::BaseTop,
        "crop top",
        "Tops",
        "Black",
        &["Casual"],
        &["Streetwear"],
        1,
        true,
    ))?;
    store.insert_product(&product(
        LONER,
        Slot::BaseTop,
        "plain tee",
        "Tops",
        "White",
        &["Casual"],
        &[],
        1,
        false,
    ))?;

    // Candidates
    store.insert_product(&product(
        SHORTS,
        Slot::PrimaryBottom,
        "athletic shorts",
        "Bottoms",
        "Black",
        &["Gym", "Casual"],
        &["Athletic"],
        1,
        false,
    ))?;
    store.insert_product(&product(
        SNEAKER_1,
        Slot::Footwear,
        "running shoe",
        "Footwear",
        "White",
        &["Gym", "Casual", "Everyday"],
        &["Athletic"],
        1,
        false,
    ))?;
    store.insert_product(&product(
        CAP,
        Slot::Accessory,
        "baseball cap",
        "Accessories",
        "Black",
        &["Gym", "Casual", "Everyday"],
        &["Athletic", "Streetwear"],
        1,
        false,
    ))?;
    store.insert_product(&product(
        JOGGERS,
        Slot::PrimaryBottom,
        "joggers",
        "Bottoms",
        "Gray",
        &["Casual", "Everyday"],
        &["Streetwear"],
        1,
        false,
    ))?;
    store.insert_product(&product(
        SNEAKER_2,
        Slot::Footwear,
        "sneaker",
        "Footwear",
        "White",
        &["Casual"],
        &["Streetwear"],
        1,
        false,
    ))?;
    store.insert_product(&product(
        HOODIE,
        Slot::Outerwear,
        "hoodie",
        "Hoodie",
        "Gray",
        &["Casual", "Everyday"],
        &["Streetwear"],
        1,
        false,
    ))?;
    store.insert_product(&product(
        BEANIE,
        Slot::Accessory,
        "beanie",
        "Accessories",
        "Gray",
        &["Casual"],
        &["Streetwear"],
        1,
        false,
    ))?;
    store.insert_product(&product(
        DENIM_JACKET,
        Slot::Outerwear,
        "denim jacket",
        "Denim Jacket",
        "Gray",
        &["Casual"],
        &["Streetwear"],
        1,
        false,
    ))?;
    store.insert_product(&product(
        BLAZER,
        Slot::Outerwear,
        "blazer",
        "Blazer",
        "Navy",
        &["Casual", "Work"],
        &["Classic"],
        4,
        false,
    ))?;

    // Edges out of the gym anchor
    store.insert_edge(GYM_TANK, SHORTS, Slot::PrimaryBottom, 0.92)?;
    store.insert_edge(GYM_TANK, SNEAKER_1, Slot::Footwear, 0.90)?;
    store.insert_edge(GYM_TANK, CAP, Slot::Accessory, 0.85)?;
    store.insert_edge(GYM_TANK, JOGGERS, Slot::PrimaryBottom, 0.84)?;
    store.insert_edge(GYM_TANK, SNEAKER_2, Slot::Footwear, 0.82)?;
    store.insert_edge(GYM_TANK, HOODIE, Slot::Outerwear, 0.80)?;
    store.insert_edge(GYM_TANK, BLAZER, Slot::Outerwear, 0.75)?;
    store.insert_edge(GYM_TANK, BEANIE, Slot::Accessory, 0.70)?;

    // Edges out of the statement-piece anchor
    store.insert_edge(CROP_TOP, SHORTS, Slot::PrimaryBottom, 0.95)?;
    store.insert_edge(CROP_TOP, HOODIE, Slot::Outerwear, 0.90)?;
    store.insert_edge(CROP_TOP, JOGGERS, Slot::PrimaryBottom, 0.85)?;
    store.insert_edge(CROP_TOP, SNEAKER_2, Slot::Footwear, 0.80)?;
    store.insert_edge(CROP_TOP, CAP, Slot::Accessory, 0.75)?;
    store.insert_edge(CROP_TOP, DENIM_JACKET, Slot::Outerwear, 0.70)?;

    // Cross-candidate edges
    store.insert_edge(SHORTS, SNEAKER_1, Slot::Footwear, 0.88)?;
    store.insert_edge(SHORTS, CAP, Slot::Accessory, 0.80)?;
    store.insert_edge(SHORTS, HOODIE, Slot::Outerwear, 0.90)?;
    store.insert_edge(SNEAKER_1, CAP, Slot::Accessory, 0.82)?;
    store.insert_edge(JOGGERS, SNEAKER_2, Slot::Footwear, 0.86)?;
    store.insert_edge(JOGGERS, HOODIE, Slot::Outerwear, 0.84)?;
    store.insert_edge(JOGGERS, CAP, Slot::Accessory, 0.75)?;
    store.insert_edge(SNEAKER_2, HOODIE, Slot::Outerwear, 0.78)?;
    store.insert_edge(SNEAKER_2, CAP, Slot::Accessory, 0.73)?;
    store.insert_edge(HOODIE, CAP, Slot::Accessory, 0.70)?;
    store.insert_edge(BEANIE, JOGGERS, Slot::PrimaryBottom, 0.50)?;

    Ok((dir, db_path))
}
