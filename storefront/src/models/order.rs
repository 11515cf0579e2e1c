// storefront/src/models/order.rs

use super::{OrderItem, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  /// Forward edges of the order lifecycle. Self-transitions are not edges.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (self, next),
      (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Shipped) | (Confirmed, Cancelled) | (Shipped, Delivered)
    )
  }

  /// The only transition that commits stock and clears the cart.
  pub fn is_confirmation(from: OrderStatus, to: OrderStatus) -> bool {
    from == OrderStatus::Pending && to == OrderStatus::Confirmed
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| format!("Unknown order status '{}'", s))
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
  pub name: String,
  pub phone: String,
  pub postal_code: String,
  pub address: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address_detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Order {
  pub id: Uuid,
  pub owner_id: UserId,
  /// Fixed at creation, never recomputed.
  pub total_amount: i64,
  pub status: OrderStatus,
  pub shipping_address: Option<Json<ShippingAddress>>,
  pub order_note: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub owner_id: UserId,
  pub total_amount: i64,
  pub shipping_address: ShippingAddress,
  pub order_note: Option<String>,
}

/// A status write guarded by the status read beforehand.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
  pub order_id: Uuid,
  pub owner_id: UserId,
  pub from: OrderStatus,
  pub to: OrderStatus,
  /// Decrement stock by the order lines and clear the owner's cart in the
  /// same write.
  pub commit_stock: bool,
}
