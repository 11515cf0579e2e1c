// storefront/src/pipelines/order_status_pipeline.rs

use crate::config::StatusPolicy;
use crate::errors::AppError;
use crate::models::{OrderStatus, StatusChange};
use crate::pipelines::contexts::OrderStatusCtxData;
use std::sync::Arc;
use storeflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{info, warn};

/// Whether `from -> to` may be written under `policy`. Self-transitions are
/// handled before this is asked.
pub fn transition_allowed(policy: StatusPolicy, from: OrderStatus, to: OrderStatus) -> bool {
  match policy {
    StatusPolicy::Strict => from.can_transition_to(to),
    StatusPolicy::Permissive => true,
  }
}

pub fn register_order_status_pipeline(registry: &Arc<FlowRegistry<AppError>>) {
  let mut p = Pipeline::<OrderStatusCtxData, AppError>::new(&[
    ("load_order_for_status", false, None),
    ("check_status_transition", false, None),
    ("apply_status_change", false, None),
  ]);

  p.on_root("load_order_for_status", |ctx_data: ContextData<OrderStatusCtxData>| {
    Box::pin(async move {
      let (store, owner_id, order_id) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.owner_id.clone(), guard.order_id)
      };
      let Some(order) = store.get_order(&owner_id, order_id).await? else {
        warn!(%order_id, "Order not found for caller.");
        return Err(AppError::NotFound(format!("Order {} not found.", order_id)));
      };
      ctx_data.write().previous_status = Some(order.status);
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("check_status_transition", |ctx_data: ContextData<OrderStatusCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let Some(from) = guard.previous_status else {
        return Err(AppError::Internal("Order status missing from context.".to_string()));
      };
      let to = guard.new_status;

      if from == to {
        info!(order_id = %guard.order_id, status = %to, "Status unchanged; nothing to write.");
        return Ok(PipelineControl::Stop);
      }
      if !transition_allowed(guard.app_state.config.order_status_policy, from, to) {
        warn!(order_id = %guard.order_id, %from, %to, "Illegal status transition rejected.");
        return Err(AppError::Validation(format!(
          "Cannot change order status from {} to {}.",
          from, to
        )));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("apply_status_change", |ctx_data: ContextData<OrderStatusCtxData>| {
    Box::pin(async move {
      let (store, change) = {
        let guard = ctx_data.read();
        let from = guard
          .previous_status
          .ok_or_else(|| AppError::Internal("Order status missing from context.".to_string()))?;
        (
          guard.app_state.store.clone(),
          StatusChange {
            order_id: guard.order_id,
            owner_id: guard.owner_id.clone(),
            from,
            to: guard.new_status,
            commit_stock: OrderStatus::is_confirmation(from, guard.new_status),
          },
        )
      };

      if !store.apply_status_change(&change).await? {
        warn!(order_id = %change.order_id, from = %change.from, "Order status changed concurrently.");
        return Err(AppError::Conflict(format!(
          "Order {} was modified concurrently; status is no longer {}.",
          change.order_id, change.from
        )));
      }

      info!(
        order_id = %change.order_id,
        from = %change.from,
        to = %change.to,
        stock_committed = change.commit_stock,
        "Order status changed."
      );
      ctx_data.write().changed = true;
      Ok(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
}

#[cfg(test)]
mod tests {
  use super::*;
  use OrderStatus::*;

  #[test]
  fn permissive_policy_allows_any_edge() {
    assert!(!transition_allowed(StatusPolicy::Strict, Delivered, Pending));
    assert!(transition_allowed(StatusPolicy::Permissive, Delivered, Pending));
    assert!(transition_allowed(StatusPolicy::Strict, Pending, Confirmed));
  }
}
