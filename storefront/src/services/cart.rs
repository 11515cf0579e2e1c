// storefront/src/services/cart.rs

//! Cart reads and removal. Adds and quantity changes run as pipelines.

use crate::errors::Result as AppResult;
use crate::models::{CartItemWithProduct, CartSummary, UserId};
use crate::store::Store;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Fails open to an empty cart.
#[instrument(name = "cart::list", skip(store))]
pub async fn cart_items(store: &dyn Store, owner: &UserId) -> Vec<CartItemWithProduct> {
  store.list_cart(owner).await.unwrap_or_else(|e| {
    warn!(error = %e, "Cart lines unavailable, returning an empty cart.");
    Vec::new()
  })
}

/// Totals at live prices; not price-locked.
pub async fn cart_summary(store: &dyn Store, owner: &UserId) -> CartSummary {
  CartSummary::from_items(cart_items(store, owner).await)
}

/// Number of lines, 0 when the store fails.
pub async fn cart_count(store: &dyn Store, owner: &UserId) -> i64 {
  store.count_cart_lines(owner).await.unwrap_or_else(|e| {
    warn!(error = %e, "Cart count unavailable, reporting 0.");
    0
  })
}

#[instrument(name = "cart::remove", skip(store))]
pub async fn remove_from_cart(store: &dyn Store, owner: &UserId, line_id: Uuid) -> AppResult<()> {
  store.delete_cart_line(owner, line_id).await?;
  info!("Cart line removed (if present).");
  Ok(())
}
