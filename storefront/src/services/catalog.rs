// storefront/src/services/catalog.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::product::UNCATEGORIZED;
use crate::models::{Product, ProductPage, ProductQuery};
use crate::store::Store;
use std::collections::BTreeMap;
use tracing::{instrument, warn};
use uuid::Uuid;

#[instrument(name = "catalog::list_products", skip(store))]
pub async fn list_products(store: &dyn Store, query: &ProductQuery) -> AppResult<ProductPage> {
  let (products, total) = store.list_products(query).await?;
  Ok(ProductPage::new(products, total, query))
}

/// Inactive products are returned too, so detail pages can mark them unavailable.
pub async fn get_product(store: &dyn Store, id: Uuid) -> AppResult<Product> {
  store
    .get_product(id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", id)))
}

pub async fn featured_products(store: &dyn Store, limit: i64) -> AppResult<Vec<Product>> {
  store.featured_products(limit).await
}

/// Fails open to an empty map.
#[instrument(name = "catalog::category_counts", skip(store))]
pub async fn category_counts(store: &dyn Store) -> BTreeMap<String, i64> {
  match store.category_counts().await {
    Ok(raw) => {
      let mut counts = BTreeMap::new();
      for (category, count) in raw {
        let key = category.unwrap_or_else(|| UNCATEGORIZED.to_string());
        *counts.entry(key).or_insert(0) += count;
      }
      counts
    }
    Err(e) => {
      warn!(error = %e, "Category counts unavailable, returning none.");
      BTreeMap::new()
    }
  }
}
