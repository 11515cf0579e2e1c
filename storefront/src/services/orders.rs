// storefront/src/services/orders.rs

use crate::models::{Order, OrderWithItems, UserId};
use crate::store::Store;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Caller-scoped. A foreign id, a missing id and a store failure all read as
/// `None`.
#[instrument(name = "orders::get", skip(store))]
pub async fn get_order(store: &dyn Store, owner: &UserId, order_id: Uuid) -> Option<OrderWithItems> {
  let order = match store.get_order(owner, order_id).await {
    Ok(found) => found?,
    Err(e) => {
      warn!(error = %e, "Order lookup failed, reporting not found.");
      return None;
    }
  };
  match store.get_order_items(order_id).await {
    Ok(items) => Some(OrderWithItems { order, items }),
    Err(e) => {
      warn!(error = %e, "Order lines unavailable, reporting not found.");
      None
    }
  }
}

/// Newest first; fails open to an empty list.
#[instrument(name = "orders::list", skip(store))]
pub async fn list_orders(store: &dyn Store, owner: &UserId) -> Vec<Order> {
  store.list_orders(owner).await.unwrap_or_else(|e| {
    warn!(error = %e, "Order list unavailable, returning none.");
    Vec::new()
  })
}
