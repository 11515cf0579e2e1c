// storefront/src/models/cart_item.rs

use super::{Product, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const MIN_CART_QUANTITY: i32 = 1;
pub const MAX_CART_QUANTITY: i32 = 999;

/// One (owner, product) line; the pair is unique.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct CartItem {
  pub id: Uuid,
  pub owner_id: UserId,
  pub product_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartItemWithProduct {
  #[serde(flatten)]
  pub item: CartItem,
  pub product: Product,
}

impl CartItemWithProduct {
  /// Line subtotal at the product's live price.
  pub fn subtotal(&self) -> i64 {
    self.product.price * i64::from(self.item.quantity)
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
  pub total_items: i64,
  pub total_amount: i64,
  pub items: Vec<CartItemWithProduct>,
}

impl CartSummary {
  pub fn from_items(items: Vec<CartItemWithProduct>) -> Self {
    let total_items = items.iter().map(|i| i64::from(i.item.quantity)).sum();
    let total_amount = items.iter().map(CartItemWithProduct::subtotal).sum();
    Self {
      total_items,
      total_amount,
      items,
    }
  }
}
