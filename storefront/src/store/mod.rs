// storefront/src/store/mod.rs

//! Persistence behind three repository traits, with Postgres and in-memory
//! backends.

use crate::config::{AppConfig, StoreBackend};
use crate::errors::{AppError, Result};
use crate::models::{
  CartItem, CartItemWithProduct, NewOrder, NewOrderItem, Order, OrderItem, Product, ProductQuery, StatusChange,
  UserId,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
  /// Active products matching `query`, plus the total match count.
  async fn list_products(&self, query: &ProductQuery) -> Result<(Vec<Product>, i64)>;

  /// Returns inactive products too.
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;

  async fn featured_products(&self, limit: i64) -> Result<Vec<Product>>;

  /// Active product count per category; `None` is the uncategorized bucket.
  async fn category_counts(&self) -> Result<BTreeMap<Option<String>, i64>>;

  async fn upsert_product(&self, product: &Product) -> Result<()>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
  async fn find_cart_line(&self, owner: &UserId, product_id: Uuid) -> Result<Option<CartItem>>;

  async fn get_cart_line(&self, owner: &UserId, line_id: Uuid) -> Result<Option<CartItem>>;

  async fn insert_cart_line(&self, owner: &UserId, product_id: Uuid, quantity: i32) -> Result<CartItem>;

  /// `None` when the line is not the owner's.
  async fn set_cart_quantity(&self, owner: &UserId, line_id: Uuid, quantity: i32) -> Result<Option<CartItem>>;

  /// Deleting an absent line is not an error.
  async fn delete_cart_line(&self, owner: &UserId, line_id: Uuid) -> Result<()>;

  /// Lines joined with their current product, newest first. Lines whose
  /// product no longer exists are left out.
  async fn list_cart(&self, owner: &UserId) -> Result<Vec<CartItemWithProduct>>;

  /// Every line the owner holds, newest first, whether or not its product
  /// still exists.
  async fn list_cart_lines(&self, owner: &UserId) -> Result<Vec<CartItem>>;

  async fn count_cart_lines(&self, owner: &UserId) -> Result<i64>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
  async fn insert_order(&self, order: NewOrder) -> Result<Order>;

  async fn insert_order_items(&self, order_id: Uuid, items: &[NewOrderItem]) -> Result<Vec<OrderItem>>;

  /// Removes the order and, by cascade, its lines.
  async fn delete_order(&self, order_id: Uuid) -> Result<()>;

  async fn get_order(&self, owner: &UserId, order_id: Uuid) -> Result<Option<Order>>;

  /// Lines in creation order.
  async fn get_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>>;

  /// Newest first.
  async fn list_orders(&self, owner: &UserId) -> Result<Vec<Order>>;

  /// Applies `change` only if the order still has status `change.from`.
  ///
  /// With `commit_stock`, product stock is decremented by every order line
  /// (floored at zero) and the owner's cart is emptied in the same atomic write.
  /// Returns `false` when the status no longer matched and nothing was written.
  async fn apply_status_change(&self, change: &StatusChange) -> Result<bool>;
}

pub trait Store: CatalogRepository + CartRepository + OrderRepository {}

impl<T: CatalogRepository + CartRepository + OrderRepository> Store for T {}

/// Builds the configured backend, running migrations and seeding if asked to.
pub async fn init_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
  let store: Arc<dyn Store> = match config.store_backend {
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;
      let pg = PgStore::connect(url, config.database_max_connections).await?;
      info!("Successfully connected to the database.");
      if config.run_migrations {
        pg.migrate().await?;
      }
      Arc::new(pg)
    }
    StoreBackend::Memory => {
      info!("Using the in-memory store; data is lost on restart.");
      Arc::new(MemoryStore::new())
    }
  };

  if config.seed_db {
    let seeded = seed::seed_catalog(store.as_ref()).await?;
    info!(products = seeded, "Demo catalog seeded.");
  }
  Ok(store)
}
