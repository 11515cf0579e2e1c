// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storeflow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{OrderStatus, ShippingAddress};
use crate::pipelines::contexts::{CreateOrderCtxData, OrderStatusCtxData};
use crate::services::orders;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
  pub shipping_address: ShippingAddress,
  #[serde(default)]
  pub order_note: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: String,
}

#[instrument(name = "handler::create_order", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateOrderPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let order_note = payload.order_note.filter(|note| !note.trim().is_empty());
  let ctx = ContextData::new(CreateOrderCtxData::new(
    app_state.get_ref().clone(),
    auth_user.user_id,
    payload.shipping_address,
    order_note,
  ));

  let result = app_state.flows.run(ctx.clone()).await?;
  let order_id = match (result, ctx.read().order.as_ref()) {
    (PipelineResult::Completed, Some(order)) => order.id,
    _ => return Err(AppError::Internal("Order creation finished without an order.".to_string())),
  };
  info!(%order_id, "Order created.");

  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "orderId": order_id,
  })))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> HttpResponse {
  let orders = orders::list_orders(app_state.store.as_ref(), &auth_user.user_id).await;
  HttpResponse::Ok().json(json!({ "success": true, "orders": orders }))
}

#[instrument(name = "handler::get_order", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id, order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  match orders::get_order(app_state.store.as_ref(), &auth_user.user_id, order_id).await {
    Some(order) => Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order }))),
    None => Err(AppError::NotFound(format!("Order {} not found.", order_id))),
  }
}

#[instrument(
  name = "handler::update_order_status",
  skip(app_state, path, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, order_id = %path.as_ref(), status = %req_payload.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateStatusPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let new_status: OrderStatus = req_payload.status.trim().parse().map_err(|e: String| {
    warn!(error = %e, "Rejected unknown order status.");
    AppError::Validation(e)
  })?;
  let ctx = ContextData::new(OrderStatusCtxData::new(
    app_state.get_ref().clone(),
    auth_user.user_id,
    path.into_inner(),
    new_status,
  ));

  app_state.flows.run(ctx.clone()).await?;
  let changed = ctx.read().changed;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "status": new_status,
    "changed": changed,
  })))
}
