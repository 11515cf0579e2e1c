// storefront/src/web/handlers/payment_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storeflow::PipelineResult;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipelines::payment_pipeline;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccessQuery {
  pub order_id: String,
  pub payment_key: String,
  pub amount: i64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailQuery {
  #[serde(default)]
  pub order_id: Option<String>,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub code: Option<String>,
}

#[instrument(name = "handler::prepare_payment", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id, order_id = %path.as_ref()))]
pub async fn prepare_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let outcome = payment_pipeline::prepare_payment(app_state.get_ref(), &auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "payment": outcome,
  })))
}

#[instrument(
  name = "handler::payment_success",
  skip(app_state, query, auth_user),
  fields(user_id = %auth_user.user_id, order_ref = %query.order_id, amount = query.amount)
)]
pub async fn payment_success_handler(
  app_state: web::Data<AppState>,
  query: web::Query<PaymentSuccessQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let report = query.into_inner();
  let result = payment_pipeline::settle_payment(
    app_state.get_ref(),
    auth_user.user_id,
    report.order_id,
    report.payment_key,
    report.amount,
  )
  .await?;

  let already_confirmed = result == PipelineResult::Stopped;
  info!(already_confirmed, "Payment success report applied.");
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "alreadyConfirmed": already_confirmed,
  })))
}

/// The gateway reported a failure. Nothing changes; the order stays pending.
#[instrument(name = "handler::payment_fail", skip(query))]
pub async fn payment_fail_handler(query: web::Query<PaymentFailQuery>) -> HttpResponse {
  let report = query.into_inner();
  warn!(
    order_ref = report.order_id.as_deref().unwrap_or("-"),
    code = report.code.as_deref().unwrap_or("-"),
    message = report.message.as_deref().unwrap_or("-"),
    "Payment failure reported."
  );
  HttpResponse::Ok().json(json!({
    "success": false,
    "error": report.message.unwrap_or_else(|| "Payment failed.".to_string()),
    "code": report.code,
    "orderId": report.order_id,
  }))
}
