// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::models::cart_item::MAX_CART_QUANTITY;
use crate::pipelines::common_steps::ensure_purchasable;
use crate::pipelines::contexts::{AddToCartCtxData, UpdateCartQuantityCtxData};
use crate::validation::validate_cart_quantity;
use std::sync::Arc;
use storeflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{info, warn};

pub fn register_add_to_cart_pipeline(registry: &Arc<FlowRegistry<AppError>>) {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false, None),
    ("fetch_product_for_cart", false, None),
    ("check_product_stock_for_cart", false, None),
    ("add_or_update_cart_item", false, None),
  ]);

  p.on_root("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let quantity = ctx_data.read().quantity;
      validate_cart_quantity(quantity)?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Loads the product and the owner's existing line for it.
  p.on_root("fetch_product_for_cart", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (store, owner_id, product_id) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.owner_id.clone(), guard.product_id)
      };

      let product = store.get_product(product_id).await?;
      let existing_line = store.find_cart_line(&owner_id, product_id).await?;
      {
        let mut guard = ctx_data.write();
        guard.product = product;
        guard.existing_line = existing_line;
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("check_product_stock_for_cart", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let already_in_cart = guard.existing_line.as_ref().map_or(0, |line| line.quantity);
      let merged = already_in_cart.saturating_add(guard.quantity);

      ensure_purchasable(guard.product.as_ref(), guard.product_id, merged)?;
      if merged > MAX_CART_QUANTITY {
        warn!(product_id = %guard.product_id, merged, "Merged cart quantity above the line limit.");
        return Err(AppError::Validation(format!(
          "Quantity must be between 1 and {}.",
          MAX_CART_QUANTITY
        )));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("add_or_update_cart_item", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (store, owner_id, product_id, quantity, existing_line) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.owner_id.clone(),
          guard.product_id,
          guard.quantity,
          guard.existing_line.clone(),
        )
      };

      let cart_item = match existing_line {
        Some(line) => store
          .set_cart_quantity(&owner_id, line.id, line.quantity + quantity)
          .await?
          .ok_or_else(|| AppError::Conflict("Cart line was removed concurrently.".to_string()))?,
        None => store.insert_cart_line(&owner_id, product_id, quantity).await?,
      };

      info!(
        owner_id = %owner_id,
        %product_id,
        line_id = %cart_item.id,
        quantity = cart_item.quantity,
        "Cart line added or incremented."
      );
      ctx_data.write().cart_item = Some(cart_item);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
}

pub fn register_update_cart_quantity_pipeline(registry: &Arc<FlowRegistry<AppError>>) {
  let mut p = Pipeline::<UpdateCartQuantityCtxData, AppError>::new(&[
    ("validate_cart_quantity", false, None),
    ("fetch_cart_line", false, None),
    ("fetch_product_for_line", false, None),
    ("check_product_stock_for_line", false, None),
    ("write_cart_quantity", false, None),
  ]);

  p.on_root("validate_cart_quantity", |ctx_data: ContextData<UpdateCartQuantityCtxData>| {
    Box::pin(async move {
      let quantity = ctx_data.read().quantity;
      validate_cart_quantity(quantity)?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("fetch_cart_line", |ctx_data: ContextData<UpdateCartQuantityCtxData>| {
    Box::pin(async move {
      let (store, owner_id, line_id) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.owner_id.clone(), guard.line_id)
      };
      let Some(line) = store.get_cart_line(&owner_id, line_id).await? else {
        warn!(%line_id, "Cart line not found for caller.");
        return Err(AppError::NotFound(format!("Cart item {} not found.", line_id)));
      };
      ctx_data.write().line = Some(line);
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("fetch_product_for_line", |ctx_data: ContextData<UpdateCartQuantityCtxData>| {
    Box::pin(async move {
      let (store, product_id) = {
        let guard = ctx_data.read();
        let product_id = guard
          .line
          .as_ref()
          .map(|line| line.product_id)
          .ok_or_else(|| AppError::Internal("Cart line missing from context.".to_string()))?;
        (guard.app_state.store.clone(), product_id)
      };
      let product = store.get_product(product_id).await?;
      ctx_data.write().product = product;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root(
    "check_product_stock_for_line",
    |ctx_data: ContextData<UpdateCartQuantityCtxData>| {
      Box::pin(async move {
        let guard = ctx_data.read();
        let product_id = guard.line.as_ref().map(|line| line.product_id).unwrap_or_default();
        ensure_purchasable(guard.product.as_ref(), product_id, guard.quantity)?;
        Ok::<_, AppError>(PipelineControl::Continue)
      })
    },
  );

  p.on_root("write_cart_quantity", |ctx_data: ContextData<UpdateCartQuantityCtxData>| {
    Box::pin(async move {
      let (store, owner_id, line_id, quantity) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.owner_id.clone(), guard.line_id, guard.quantity)
      };
      let Some(cart_item) = store.set_cart_quantity(&owner_id, line_id, quantity).await? else {
        return Err(AppError::NotFound(format!("Cart item {} not found.", line_id)));
      };
      info!(%line_id, quantity, "Cart line quantity set.");
      ctx_data.write().cart_item = Some(cart_item);
      Ok(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
}
