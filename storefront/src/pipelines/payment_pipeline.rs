// storefront/src/pipelines/payment_pipeline.rs

//! Payment preparation and settlement.
//!
//! A reported success is checked against the stored order and then confirmed
//! through the order status pipeline, so stock is committed in exactly one
//! place.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{OrderStatus, UserId};
use crate::pipelines::contexts::{OrderStatusCtxData, PaymentSettlementCtxData};
use crate::services::payment_gateway::{self, PaymentOutcome, PaymentRequest};
use crate::state::AppState;
use std::sync::Arc;
use storeflow::{ContextData, FlowRegistry, Pipeline, PipelineControl, PipelineResult};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub fn register_payment_settlement_pipeline(registry: &Arc<FlowRegistry<AppError>>) {
  let mut p = Pipeline::<PaymentSettlementCtxData, AppError>::new(&[
    ("resolve_order_reference", false, None),
    ("load_order_for_payment", false, None),
    ("verify_payment_amount", false, None),
    ("confirm_paid_order", false, None),
  ]);

  p.on_root("resolve_order_reference", |ctx_data: ContextData<PaymentSettlementCtxData>| {
    Box::pin(async move {
      let order_id = {
        let guard = ctx_data.read();
        payment_gateway::parse_external_order_id(&guard.app_state.config.payment_order_id_prefix, &guard.external_order_id)?
      };
      ctx_data.write().order_id = Some(order_id);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("load_order_for_payment", |ctx_data: ContextData<PaymentSettlementCtxData>| {
    Box::pin(async move {
      let (store, owner_id, order_id) = {
        let guard = ctx_data.read();
        let order_id = guard
          .order_id
          .ok_or_else(|| AppError::Internal("Order id missing from context.".to_string()))?;
        (guard.app_state.store.clone(), guard.owner_id.clone(), order_id)
      };
      let Some(order) = store.get_order(&owner_id, order_id).await? else {
        warn!(%order_id, "Payment reported for an unknown order.");
        return Err(AppError::NotFound(format!("Order {} not found.", order_id)));
      };
      ctx_data.write().order = Some(order);
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("verify_payment_amount", |ctx_data: ContextData<PaymentSettlementCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let Some(order) = guard.order.as_ref() else {
        return Err(AppError::Internal("Order missing from context.".to_string()));
      };

      if order.total_amount != guard.reported_amount {
        warn!(
          order_id = %order.id,
          expected = order.total_amount,
          reported = guard.reported_amount,
          "Payment amount does not match the order total."
        );
        return Err(AppError::Validation(format!(
          "Payment amount {} does not match order total {}.",
          guard.reported_amount, order.total_amount
        )));
      }
      match order.status {
        OrderStatus::Pending => Ok(PipelineControl::Continue),
        OrderStatus::Confirmed => {
          info!(order_id = %order.id, "Order already confirmed; payment report ignored.");
          Ok(PipelineControl::Stop)
        }
        other => {
          warn!(order_id = %order.id, status = %other, "Payment reported for an order that is not payable.");
          Err(AppError::Validation(format!("Order is {} and cannot be paid.", other)))
        }
      }
    })
  });

  p.on_root("confirm_paid_order", |ctx_data: ContextData<PaymentSettlementCtxData>| {
    Box::pin(async move {
      let (app_state, owner_id, order_id, payment_key) = {
        let guard = ctx_data.read();
        let order_id = guard
          .order_id
          .ok_or_else(|| AppError::Internal("Order id missing from context.".to_string()))?;
        (guard.app_state.clone(), guard.owner_id.clone(), order_id, guard.payment_key.clone())
      };

      let status_ctx = ContextData::new(OrderStatusCtxData::new(
        app_state.clone(),
        owner_id,
        order_id,
        OrderStatus::Confirmed,
      ));
      app_state.flows.run(status_ctx).await?;

      info!(%order_id, %payment_key, "Payment settled; order confirmed.");
      ctx_data.write().confirmed = true;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
}

/// Applies a gateway success report for `owner`'s order.
pub async fn settle_payment(
  app_state: &AppState,
  owner: UserId,
  external_order_id: String,
  payment_key: String,
  amount: i64,
) -> AppResult<PipelineResult> {
  let ctx = ContextData::new(PaymentSettlementCtxData::new(
    app_state.clone(),
    owner,
    external_order_id,
    payment_key,
    amount,
  ));
  app_state.flows.run(ctx).await
}

/// Opens a payment for a pending order and settles synchronous outcomes
/// through the same path as the callbacks.
#[instrument(name = "payment::prepare", skip(app_state))]
pub async fn prepare_payment(app_state: &AppState, owner: &UserId, order_id: Uuid) -> AppResult<PaymentOutcome> {
  let store = app_state.store.as_ref();
  let order = store
    .get_order(owner, order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))?;
  if order.status != OrderStatus::Pending {
    warn!(%order_id, status = %order.status, "Payment requested for an order that is not pending.");
    return Err(AppError::Validation(format!(
      "Only pending orders can be paid; order is {}.",
      order.status
    )));
  }

  let names: Vec<String> = store
    .get_order_items(order_id)
    .await?
    .into_iter()
    .map(|item| item.product_name)
    .collect();
  let request = PaymentRequest {
    external_order_id: payment_gateway::external_order_id(&app_state.config.payment_order_id_prefix, order_id),
    order_name: payment_gateway::order_display_name(&names),
    amount: order.total_amount,
    customer_key: owner.to_string(),
  };

  let outcome = app_state.payments.initiate(&request).await?;
  match &outcome {
    PaymentOutcome::Succeeded { payment_key, amount } => {
      settle_payment(
        app_state,
        owner.clone(),
        request.external_order_id.clone(),
        payment_key.clone(),
        *amount,
      )
      .await?;
    }
    PaymentOutcome::Failed { code, message } => {
      warn!(%order_id, %code, %message, "Payment declined; order left pending.");
    }
    PaymentOutcome::AwaitingCallback { .. } => {
      info!(%order_id, gateway = app_state.payments.name(), "Payment handed to the widget.");
    }
  }
  Ok(outcome)
}
