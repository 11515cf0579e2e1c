// storefront/src/pipelines/mod.rs

//! Multi-step write workflows, each a `storeflow` pipeline keyed by its
//! context type.

use crate::errors::AppError;
use std::sync::Arc;
use storeflow::FlowRegistry;

pub mod common_steps;
pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod order_status_pipeline;
pub mod payment_pipeline;

/// Registers every pipeline. Called once while building `AppState`.
pub fn register_all_pipelines(registry: &Arc<FlowRegistry<AppError>>) {
  tracing::info!("Registering storefront pipelines...");

  cart_pipeline::register_add_to_cart_pipeline(registry);
  cart_pipeline::register_update_cart_quantity_pipeline(registry);
  checkout_pipeline::register_create_order_pipeline(registry);
  order_status_pipeline::register_order_status_pipeline(registry);
  payment_pipeline::register_payment_settlement_pipeline(registry);

  tracing::info!("All storefront pipelines registered.");
}
