// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storeflow::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Authentication required")]
  Unauthenticated,

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  /// The product exists but is not on sale.
  #[error("Product is not on sale: {0}")]
  Inactive(String),

  #[error("Insufficient stock for {product} (available: {available})")]
  InsufficientStock { product: String, available: i32 },

  #[error("Cart is empty")]
  EmptyCart,

  #[error("Failed to create order items")]
  OrderItemsCreationFailed,

  /// A concurrent writer changed the record first.
  #[error("{0}")]
  Conflict(String),

  #[error("Payment failed: {0}")]
  Payment(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Store(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Store(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl AppError {
  /// Text safe to show to a client. Store and engine details stay in the logs.
  pub fn public_message(&self) -> String {
    match self {
      AppError::Store(_) => "A storage operation failed. Please try again.".to_string(),
      AppError::Workflow { .. } | AppError::Internal(_) => "An internal error occurred.".to_string(),
      AppError::Config(_) => "Service is misconfigured.".to_string(),
      other => other.to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
      AppError::Validation(_)
      | AppError::Inactive(_)
      | AppError::InsufficientStock { .. }
      | AppError::EmptyCart => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Payment(_) => StatusCode::PAYMENT_REQUIRED,
      AppError::OrderItemsCreationFailed
      | AppError::Config(_)
      | AppError::Store(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with rejection");
    }
    HttpResponse::build(status).json(json!({
      "success": false,
      "error": self.public_message(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn store_details_are_not_exposed() {
    let err = AppError::Store(sqlx::Error::Protocol("relation \"orders\" does not exist".to_string()));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!err.public_message().contains("orders"));
  }

  #[test]
  fn insufficient_stock_message_includes_available() {
    let err = AppError::InsufficientStock {
      product: "Mug".to_string(),
      available: 3,
    };
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(err.public_message().contains("available: 3"));
  }

  #[test]
  fn anyhow_wrapping_sqlx_is_recovered() {
    let err: AppError = anyhow::Error::new(sqlx::Error::RowNotFound).into();
    assert!(matches!(err, AppError::Store(sqlx::Error::RowNotFound)));
  }
}
