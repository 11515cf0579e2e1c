// storefront/src/services/payment_gateway.rs

//! The hosted payment widget, seen from the server.
//!
//! The widget itself runs in the browser and reports back through the
//! success/fail callbacks. `MockPaymentGateway` settles in-process instead.

use crate::config::{AppConfig, PaymentGatewayKind};
use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Order id as the gateway sees it: `<prefix><uuid>`.
pub fn external_order_id(prefix: &str, order_id: Uuid) -> String {
  format!("{}{}", prefix, order_id)
}

/// Strips `prefix` if present; bare ids are accepted as they are.
pub fn parse_external_order_id(prefix: &str, raw: &str) -> AppResult<Uuid> {
  let trimmed = raw.trim();
  let bare = if prefix.is_empty() {
    trimmed
  } else {
    trimmed.strip_prefix(prefix).unwrap_or(trimmed)
  };
  Uuid::parse_str(bare).map_err(|_| AppError::Validation(format!("Invalid order id '{}'.", raw)))
}

/// `"<first product>"`, or `"<first product> and N more"` for several lines.
pub fn order_display_name(product_names: &[String]) -> String {
  match product_names {
    [] => "Order".to_string(),
    [only] => only.clone(),
    [first, rest @ ..] => format!("{} and {} more", first, rest.len()),
  }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
  pub external_order_id: String,
  pub order_name: String,
  pub amount: i64,
  /// The paying user's id.
  pub customer_key: String,
}

/// What the browser needs to open the hosted widget.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSession {
  pub client_key: String,
  pub customer_key: String,
  pub order_id: String,
  pub order_name: String,
  pub amount: i64,
  pub success_url: String,
  pub fail_url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentOutcome {
  Succeeded {
    #[serde(rename = "paymentKey")]
    payment_key: String,
    amount: i64,
  },
  Failed { code: String, message: String },
  /// Settled later through the success/fail callbacks.
  AwaitingCallback { widget: WidgetSession },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  fn name(&self) -> &'static str;

  async fn initiate(&self, request: &PaymentRequest) -> AppResult<PaymentOutcome>;
}

pub struct HostedWidgetGateway {
  client_key: String,
  callback_base_url: String,
}

impl HostedWidgetGateway {
  pub fn new(client_key: impl Into<String>, app_base_url: &str) -> Self {
    Self {
      client_key: client_key.into(),
      callback_base_url: format!("{}/api/v1/payments", app_base_url.trim_end_matches('/')),
    }
  }
}

#[async_trait]
impl PaymentGateway for HostedWidgetGateway {
  fn name(&self) -> &'static str {
    "hosted_widget"
  }

  #[instrument(name = "payment::hosted_initiate", skip(self, request), fields(order = %request.external_order_id, amount = request.amount))]
  async fn initiate(&self, request: &PaymentRequest) -> AppResult<PaymentOutcome> {
    if request.amount <= 0 {
      return Err(AppError::Payment("Amount must be greater than zero".to_string()));
    }
    let widget = WidgetSession {
      client_key: self.client_key.clone(),
      customer_key: request.customer_key.clone(),
      order_id: request.external_order_id.clone(),
      order_name: request.order_name.clone(),
      amount: request.amount,
      success_url: format!("{}/success?orderId={}", self.callback_base_url, request.external_order_id),
      fail_url: format!("{}/fail?orderId={}", self.callback_base_url, request.external_order_id),
    };
    info!("Hosted widget session prepared.");
    Ok(PaymentOutcome::AwaitingCallback { widget })
  }
}

/// Settles immediately. Amounts ending in ...123 (mod 1000) are declined.
#[derive(Default)]
pub struct MockPaymentGateway;

impl MockPaymentGateway {
  pub const DECLINE_SUFFIX: i64 = 123;
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
  fn name(&self) -> &'static str {
    "mock"
  }

  #[instrument(name = "payment::mock_initiate", skip(self, request), fields(order = %request.external_order_id, amount = request.amount))]
  async fn initiate(&self, request: &PaymentRequest) -> AppResult<PaymentOutcome> {
    if request.amount <= 0 {
      return Err(AppError::Payment("Amount must be greater than zero".to_string()));
    }
    if request.amount % 1000 == Self::DECLINE_SUFFIX {
      warn!("Mock payment declined by test condition.");
      return Ok(PaymentOutcome::Failed {
        code: "MOCK_DECLINED".to_string(),
        message: "Mock payment failed due to test condition".to_string(),
      });
    }
    let payment_key = format!("mock_pk_{}", Uuid::new_v4().simple());
    info!(%payment_key, "Mock payment succeeded.");
    Ok(PaymentOutcome::Succeeded {
      payment_key,
      amount: request.amount,
    })
  }
}

pub fn gateway_from_config(config: &AppConfig) -> AppResult<Arc<dyn PaymentGateway>> {
  match config.payment_gateway {
    PaymentGatewayKind::Mock => Ok(Arc::new(MockPaymentGateway)),
    PaymentGatewayKind::Hosted => {
      let client_key = config
        .payment_client_key
        .clone()
        .ok_or_else(|| AppError::Config("PAYMENT_CLIENT_KEY is required for the hosted gateway".to_string()))?;
      Ok(Arc::new(HostedWidgetGateway::new(client_key, &config.app_base_url)))
    }
  }
}
