// storefront/src/store/seed.rs

//! Demo catalog for local runs.

use super::Store;
use crate::errors::Result;
use crate::models::Product;
use chrono::{Duration, Utc};
use uuid::Uuid;

/// (name, description, price, category, stock)
const DEMO_PRODUCTS: &[(&str, &str, i64, &str, i32)] = &[
  ("Basic Cotton T-Shirt", "Everyday crew neck tee.", 19_000, "clothing", 120),
  ("Denim Jacket", "Washed denim, regular fit.", 89_000, "clothing", 8),
  ("Wireless Earbuds", "Bluetooth 5.3 with charging case.", 129_000, "electronics", 35),
  ("USB-C Charger 65W", "GaN fast charger.", 45_000, "electronics", 0),
  ("The Rust Programming Language", "Paperback edition.", 42_000, "books", 14),
  ("Cold Brew Coffee Beans 1kg", "Medium roast blend.", 32_000, "food", 60),
  ("Yoga Mat", "6mm non-slip mat.", 27_000, "sports", 5),
  ("Vitamin C Serum", "30ml brightening serum.", 38_000, "beauty", 22),
  ("Ceramic Mug", "350ml, dishwasher safe.", 12_000, "home", 200),
];

/// Deterministic ids so reseeding updates rather than duplicates.
fn demo_id(index: usize) -> Uuid {
  Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0000 | index as u128)
}

/// Upserts the demo catalog and returns how many products were written.
pub async fn seed_catalog(store: &dyn Store) -> Result<usize> {
  let now = Utc::now();
  for (index, (name, description, price, category, stock)) in DEMO_PRODUCTS.iter().enumerate() {
    // Stagger creation times so "latest" ordering is stable.
    let created_at = now - Duration::minutes(index as i64);
    let product = Product {
      id: demo_id(index),
      name: (*name).to_string(),
      description: Some((*description).to_string()),
      price: *price,
      category: Some((*category).to_string()),
      stock_quantity: *stock,
      is_active: true,
      created_at,
      updated_at: now,
    };
    store.upsert_product(&product).await?;
  }
  Ok(DEMO_PRODUCTS.len())
}
