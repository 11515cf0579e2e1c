// storefront/src/models/order_item.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable snapshot of one product line at order creation.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub product_name: String,
  pub quantity: i32,
  /// Unit price at order creation.
  pub price: i64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
  pub product_id: Uuid,
  pub product_name: String,
  pub quantity: i32,
  pub price: i64,
}

impl NewOrderItem {
  pub fn subtotal(&self) -> i64 {
    self.price * i64::from(self.quantity)
  }
}
