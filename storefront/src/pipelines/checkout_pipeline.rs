// storefront/src/pipelines/checkout_pipeline.rs

//! Turns the caller's cart into a pending order.
//!
//! Stock is only checked here. It is committed when the order is confirmed,
//! and the cart is cleared at the same time.

use crate::errors::AppError;
use crate::models::{NewOrder, NewOrderItem};
use crate::pipelines::common_steps::ensure_purchasable;
use crate::pipelines::contexts::CreateOrderCtxData;
use crate::validation::validate_checkout;
use std::sync::Arc;
use storeflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{error, info, warn};

pub fn register_create_order_pipeline(registry: &Arc<FlowRegistry<AppError>>) {
  let mut p = Pipeline::<CreateOrderCtxData, AppError>::new(&[
    ("validate_checkout_input", false, None),
    ("load_cart", false, None),
    ("verify_products_and_price", false, None),
    ("insert_order_record", false, None),
    ("insert_order_lines", false, None),
  ]);

  p.on_root("validate_checkout_input", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      validate_checkout(&guard.shipping_address, guard.order_note.as_deref())?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("load_cart", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let (store, owner_id) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.owner_id.clone())
      };
      let cart = store.list_cart_lines(&owner_id).await?;
      if cart.is_empty() {
        warn!(%owner_id, "Checkout attempted with an empty cart.");
        return Err(AppError::EmptyCart);
      }
      ctx_data.write().cart = cart;
      Ok(PipelineControl::Continue)
    })
  });

  // Cart lines only carry a product id; price, name and stock come from the
  // live product.
  p.on_root("verify_products_and_price", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let (store, cart) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.cart.clone())
      };

      let mut order_lines = Vec::with_capacity(cart.len());
      for line in &cart {
        let live = store.get_product(line.product_id).await?;
        let product = ensure_purchasable(live.as_ref(), line.product_id, line.quantity)?;
        order_lines.push(NewOrderItem {
          product_id: product.id,
          product_name: product.name.clone(),
          quantity: line.quantity,
          price: product.price,
        });
      }

      let total_amount = order_lines.iter().map(NewOrderItem::subtotal).sum();
      {
        let mut guard = ctx_data.write();
        guard.order_lines = order_lines;
        guard.total_amount = total_amount;
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("insert_order_record", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let (store, new_order) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          NewOrder {
            owner_id: guard.owner_id.clone(),
            total_amount: guard.total_amount,
            shipping_address: guard.shipping_address.clone(),
            order_note: guard.order_note.clone(),
          },
        )
      };
      let order = store.insert_order(new_order).await?;
      info!(order_id = %order.id, total_amount = order.total_amount, "Pending order recorded.");
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // An order row without lines must never survive.
  p.compensate_root("insert_order_record", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let (store, order_id) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.order.as_ref().map(|o| o.id))
      };
      if let Some(order_id) = order_id {
        store.delete_order(order_id).await?;
        warn!(%order_id, "Order record removed after line insertion failed.");
        ctx_data.write().order = None;
      }
      Ok::<_, AppError>(())
    })
  });

  p.on_root("insert_order_lines", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let (store, order_id, lines) = {
        let guard = ctx_data.read();
        let order_id = guard
          .order
          .as_ref()
          .map(|o| o.id)
          .ok_or_else(|| AppError::Internal("Order record missing from context.".to_string()))?;
        (guard.app_state.store.clone(), order_id, guard.order_lines.clone())
      };
      match store.insert_order_items(order_id, &lines).await {
        Ok(items) => {
          info!(%order_id, lines = items.len(), "Order lines recorded.");
          Ok(PipelineControl::Continue)
        }
        Err(e) => {
          error!(%order_id, error = %e, "Order line insertion failed.");
          Err(AppError::OrderItemsCreationFailed)
        }
      }
    })
  });

  registry.register_pipeline(p);
}
