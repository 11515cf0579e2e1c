// storefront/src/pipelines/common_steps.rs

//! Checks shared by the cart and checkout pipelines.

use crate::errors::{AppError, Result as AppResult};
use crate::models::Product;
use tracing::warn;
use uuid::Uuid;

/// The product must exist, be on sale and have at least `requested` in stock.
pub fn ensure_purchasable(product: Option<&Product>, product_id: Uuid, requested: i32) -> AppResult<&Product> {
  let Some(product) = product else {
    warn!(%product_id, "Product not found.");
    return Err(AppError::NotFound(format!("Product {} not found.", product_id)));
  };
  if !product.is_active {
    warn!(%product_id, "Product is not on sale.");
    return Err(AppError::Inactive(product.name.clone()));
  }
  if product.stock_quantity < requested {
    warn!(
      %product_id,
      available = product.stock_quantity,
      requested,
      "Insufficient stock."
    );
    return Err(AppError::InsufficientStock {
      product: product.name.clone(),
      available: product.stock_quantity,
    });
  }
  Ok(product)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn product(stock: i32, active: bool) -> Product {
    Product {
      id: Uuid::new_v4(),
      name: "Canvas Tote".to_string(),
      description: None,
      price: 15_000,
      category: Some("clothing".to_string()),
      stock_quantity: stock,
      is_active: active,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn missing_inactive_and_short_products_are_rejected() {
    let id = Uuid::new_v4();
    assert!(matches!(ensure_purchasable(None, id, 1), Err(AppError::NotFound(_))));

    let inactive = product(5, false);
    assert!(matches!(
      ensure_purchasable(Some(&inactive), inactive.id, 1),
      Err(AppError::Inactive(_))
    ));

    let empty = product(0, true);
    assert!(matches!(
      ensure_purchasable(Some(&empty), empty.id, 1),
      Err(AppError::InsufficientStock { available: 0, .. })
    ));
  }

  #[test]
  fn exact_stock_is_enough() {
    let p = product(3, true);
    assert_eq!(ensure_purchasable(Some(&p), p.id, 3).unwrap().id, p.id);
  }
}
