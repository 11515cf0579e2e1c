// tests/common/mod.rs
#![allow(dead_code)]

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use std::sync::Arc;
use storefront::config::{AppConfig, StatusPolicy};
use storefront::models::{Product, ShippingAddress, UserId};
use storefront::services::payment_gateway::MockPaymentGateway;
use storefront::state::AppState;
use storefront::store::{CatalogRepository, MemoryStore};
use tracing::Level;
use uuid::Uuid;

pub struct TestApp {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
}

pub fn test_app() -> TestApp {
  test_app_with_policy(StatusPolicy::Strict)
}

pub fn test_app_with_policy(policy: StatusPolicy) -> TestApp {
  let mut config = AppConfig::for_memory_store();
  config.order_status_policy = policy;
  let store = Arc::new(MemoryStore::new());
  let state = AppState::new(Arc::new(config), store.clone(), Arc::new(MockPaymentGateway));
  TestApp { state, store }
}

pub fn user(id: &str) -> UserId {
  UserId::parse(id).expect("test user id")
}

/// `age_minutes` back-dates `created_at` for ordering tests.
pub fn product(name: &str, price: i64, stock: i32, category: Option<&str>, age_minutes: i64) -> Product {
  let now = Utc::now();
  Product {
    id: Uuid::new_v4(),
    name: name.to_string(),
    description: None,
    price,
    category: category.map(str::to_string),
    stock_quantity: stock,
    is_active: true,
    created_at: now - Duration::minutes(age_minutes),
    updated_at: now,
  }
}

pub async fn insert_product(store: &MemoryStore, product: &Product) {
  store.upsert_product(product).await.expect("upsert product");
}

pub async fn stock_of(store: &MemoryStore, id: Uuid) -> i32 {
  store
    .get_product(id)
    .await
    .expect("read product")
    .expect("product exists")
    .stock_quantity
}

pub fn address() -> ShippingAddress {
  ShippingAddress {
    name: "Jamie Park".to_string(),
    phone: "010-1234-5678".to_string(),
    postal_code: "06236".to_string(),
    address: "123 Teheran-ro, Gangnam-gu".to_string(),
    address_detail: Some("Unit 502".to_string()),
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub mod flows {
  use super::*;
  use storefront::errors::AppError;
  use storefront::models::{CartItem, OrderStatus};
  use storefront::pipelines::contexts::{
    AddToCartCtxData, CreateOrderCtxData, OrderStatusCtxData, UpdateCartQuantityCtxData,
  };
  use storeflow::{ContextData, PipelineResult};

  pub async fn add_to_cart(app: &TestApp, owner: &UserId, product_id: Uuid, quantity: i32) -> Result<CartItem, AppError> {
    let ctx = ContextData::new(AddToCartCtxData::new(app.state.clone(), owner.clone(), product_id, quantity));
    app.state.flows.run(ctx.clone()).await?;
    let line = ctx.read().cart_item.clone();
    Ok(line.expect("cart pipeline sets the line"))
  }

  pub async fn set_quantity(app: &TestApp, owner: &UserId, line_id: Uuid, quantity: i32) -> Result<CartItem, AppError> {
    let ctx = ContextData::new(UpdateCartQuantityCtxData::new(app.state.clone(), owner.clone(), line_id, quantity));
    app.state.flows.run(ctx.clone()).await?;
    let line = ctx.read().cart_item.clone();
    Ok(line.expect("cart pipeline sets the line"))
  }

  pub async fn create_order(app: &TestApp, owner: &UserId) -> Result<Uuid, AppError> {
    let ctx = ContextData::new(CreateOrderCtxData::new(app.state.clone(), owner.clone(), address(), None));
    app.state.flows.run(ctx.clone()).await?;
    let order_id = ctx.read().order.as_ref().map(|o| o.id);
    Ok(order_id.expect("checkout pipeline sets the order"))
  }

  pub async fn set_status(
    app: &TestApp,
    owner: &UserId,
    order_id: Uuid,
    status: OrderStatus,
  ) -> Result<(PipelineResult, bool), AppError> {
    let ctx = ContextData::new(OrderStatusCtxData::new(app.state.clone(), owner.clone(), order_id, status));
    let result = app.state.flows.run(ctx.clone()).await?;
    let changed = ctx.read().changed;
    Ok((result, changed))
  }
}
