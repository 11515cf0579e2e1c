// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storeflow::{ContextData, PipelineResult};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::CartItem;
use crate::pipelines::contexts::{AddToCartCtxData, UpdateCartQuantityCtxData};
use crate::services::cart;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

fn default_quantity() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityPayload {
  pub quantity: i32,
}

/// Reads the line a completed cart pipeline left in its context.
fn finished_line(result: PipelineResult, line: Option<CartItem>) -> Result<CartItem, AppError> {
  match (result, line) {
    (PipelineResult::Completed, Some(line)) => Ok(line),
    (PipelineResult::Completed, None) => Err(AppError::Internal(
      "Cart update completed, but item details are unavailable.".to_string(),
    )),
    (PipelineResult::Stopped, _) => Err(AppError::Internal("Cart update was halted.".to_string())),
  }
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(AddToCartCtxData::new(
    app_state.get_ref().clone(),
    auth_user.user_id,
    payload.product_id,
    payload.quantity,
  ));

  let result = app_state.flows.run(ctx.clone()).await?;
  let cart_item = finished_line(result, ctx.read().cart_item.clone())?;
  info!(line_id = %cart_item.id, quantity = cart_item.quantity, "Item added to cart.");

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "cartItem": cart_item,
  })))
}

#[instrument(
  name = "handler::update_cart_quantity",
  skip(app_state, path, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, line_id = %path.as_ref())
)]
pub async fn update_cart_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(UpdateCartQuantityCtxData::new(
    app_state.get_ref().clone(),
    auth_user.user_id,
    path.into_inner(),
    req_payload.quantity,
  ));

  let result = app_state.flows.run(ctx.clone()).await?;
  let cart_item = finished_line(result, ctx.read().cart_item.clone())?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "cartItem": cart_item,
  })))
}

#[instrument(name = "handler::remove_from_cart", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart::remove_from_cart(app_state.store.as_ref(), &auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[instrument(name = "handler::cart_items", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_items_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> HttpResponse {
  let items = cart::cart_items(app_state.store.as_ref(), &auth_user.user_id).await;
  HttpResponse::Ok().json(json!({ "success": true, "items": items }))
}

#[instrument(name = "handler::cart_summary", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_summary_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> HttpResponse {
  let summary = cart::cart_summary(app_state.store.as_ref(), &auth_user.user_id).await;
  HttpResponse::Ok().json(json!({
    "success": true,
    "totalItems": summary.total_items,
    "totalAmount": summary.total_amount,
    "items": summary.items,
  }))
}

#[instrument(name = "handler::cart_count", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_count_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> HttpResponse {
  let count = cart::cart_count(app_state.store.as_ref(), &auth_user.user_id).await;
  HttpResponse::Ok().json(json!({ "success": true, "count": count }))
}
