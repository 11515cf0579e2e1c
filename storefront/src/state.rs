// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines;
use crate::services::payment_gateway::{self, PaymentGateway};
use crate::store::{self, Store};
use std::sync::Arc;
use storeflow::FlowRegistry;

/// Shared by every request handler and carried in every pipeline context.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub payments: Arc<dyn PaymentGateway>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the given collaborators and registers every pipeline.
  pub fn new(config: Arc<AppConfig>, store: Arc<dyn Store>, payments: Arc<dyn PaymentGateway>) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);
    Self {
      store,
      flows,
      payments,
      config,
    }
  }

  /// Builds the configured store and payment gateway.
  pub async fn from_config(config: AppConfig) -> AppResult<Self> {
    let store = store::init_store(&config).await?;
    let payments = payment_gateway::gateway_from_config(&config)?;
    Ok(Self::new(Arc::new(config), store, payments))
  }
}
