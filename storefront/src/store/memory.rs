// storefront/src/store/memory.rs

//! In-memory store for tests and database-less runs.

use super::{CartRepository, CatalogRepository, OrderRepository};
use crate::errors::{AppError, Result};
use crate::models::{
  CartItem, CartItemWithProduct, NewOrder, NewOrderItem, Order, OrderItem, Product, ProductQuery, ProductSort,
  StatusChange, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  products: HashMap<Uuid, Product>,
  cart_items: HashMap<Uuid, CartItem>,
  orders: HashMap<Uuid, Order>,
  order_items: Vec<OrderItem>,
}

/// Every call takes the single table lock, so each call is atomic.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
  fail_on_read: RwLock<bool>,
  fail_on_order_items: RwLock<bool>,
  fail_on_status_change: RwLock<bool>,
}

fn injected(op: &str) -> AppError {
  AppError::Store(sqlx::Error::Protocol(format!("injected failure: {}", op)))
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes every read query fail.
  pub async fn set_fail_on_read(&self, fail: bool) {
    *self.fail_on_read.write().await = fail;
  }

  /// Makes order line insertion fail after the order row exists.
  pub async fn set_fail_on_order_items(&self, fail: bool) {
    *self.fail_on_order_items.write().await = fail;
  }

  pub async fn set_fail_on_status_change(&self, fail: bool) {
    *self.fail_on_status_change.write().await = fail;
  }

  /// Deletes a product outright. Cart lines referencing it are kept.
  pub async fn remove_product(&self, id: Uuid) {
    self.tables.write().await.products.remove(&id);
  }

  pub async fn order_count(&self) -> usize {
    self.tables.read().await.orders.len()
  }

  pub async fn order_item_count(&self) -> usize {
    self.tables.read().await.order_items.len()
  }

  async fn check_read(&self, op: &str) -> Result<()> {
    if *self.fail_on_read.read().await {
      return Err(injected(op));
    }
    Ok(())
  }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
  async fn list_products(&self, query: &ProductQuery) -> Result<(Vec<Product>, i64)> {
    self.check_read("list_products").await?;
    let tables = self.tables.read().await;
    let needle = query.search.as_ref().map(|s| s.to_lowercase());
    let mut matched: Vec<Product> = tables
      .products
      .values()
      .filter(|p| p.is_active)
      .filter(|p| query.category.is_none() || p.category == query.category)
      .filter(|p| needle.as_ref().map_or(true, |n| p.name.to_lowercase().contains(n)))
      .cloned()
      .collect();

    match query.sort {
      ProductSort::Latest => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
      ProductSort::PriceAsc => matched.sort_by(|a, b| a.price.cmp(&b.price)),
      ProductSort::PriceDesc => matched.sort_by(|a, b| b.price.cmp(&a.price)),
      ProductSort::NameAsc => matched.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    let total = matched.len() as i64;
    let page = matched
      .into_iter()
      .skip(query.offset() as usize)
      .take(query.limit as usize)
      .collect();
    Ok((page, total))
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    self.check_read("get_product").await?;
    Ok(self.tables.read().await.products.get(&id).cloned())
  }

  async fn featured_products(&self, limit: i64) -> Result<Vec<Product>> {
    self.check_read("featured_products").await?;
    let tables = self.tables.read().await;
    let mut active: Vec<Product> = tables.products.values().filter(|p| p.is_active).cloned().collect();
    active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    active.truncate(limit.max(0) as usize);
    Ok(active)
  }

  async fn category_counts(&self) -> Result<BTreeMap<Option<String>, i64>> {
    self.check_read("category_counts").await?;
    let tables = self.tables.read().await;
    let mut counts = BTreeMap::new();
    for product in tables.products.values().filter(|p| p.is_active) {
      *counts.entry(product.category.clone()).or_insert(0) += 1;
    }
    Ok(counts)
  }

  async fn upsert_product(&self, product: &Product) -> Result<()> {
    self.tables.write().await.products.insert(product.id, product.clone());
    Ok(())
  }
}

#[async_trait]
impl CartRepository for MemoryStore {
  async fn find_cart_line(&self, owner: &UserId, product_id: Uuid) -> Result<Option<CartItem>> {
    self.check_read("find_cart_line").await?;
    let tables = self.tables.read().await;
    Ok(
      tables
        .cart_items
        .values()
        .find(|c| &c.owner_id == owner && c.product_id == product_id)
        .cloned(),
    )
  }

  async fn get_cart_line(&self, owner: &UserId, line_id: Uuid) -> Result<Option<CartItem>> {
    self.check_read("get_cart_line").await?;
    let tables = self.tables.read().await;
    Ok(tables.cart_items.get(&line_id).filter(|c| &c.owner_id == owner).cloned())
  }

  async fn insert_cart_line(&self, owner: &UserId, product_id: Uuid, quantity: i32) -> Result<CartItem> {
    let mut tables = self.tables.write().await;
    if tables
      .cart_items
      .values()
      .any(|c| &c.owner_id == owner && c.product_id == product_id)
    {
      return Err(AppError::Conflict("Cart line already exists for this product.".to_string()));
    }
    let now = Utc::now();
    let item = CartItem {
      id: Uuid::new_v4(),
      owner_id: owner.clone(),
      product_id,
      quantity,
      created_at: now,
      updated_at: now,
    };
    tables.cart_items.insert(item.id, item.clone());
    Ok(item)
  }

  async fn set_cart_quantity(&self, owner: &UserId, line_id: Uuid, quantity: i32) -> Result<Option<CartItem>> {
    let mut tables = self.tables.write().await;
    match tables.cart_items.get_mut(&line_id) {
      Some(item) if &item.owner_id == owner => {
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
      }
      _ => Ok(None),
    }
  }

  async fn delete_cart_line(&self, owner: &UserId, line_id: Uuid) -> Result<()> {
    let mut tables = self.tables.write().await;
    if tables.cart_items.get(&line_id).is_some_and(|c| &c.owner_id == owner) {
      tables.cart_items.remove(&line_id);
    }
    Ok(())
  }

  async fn list_cart(&self, owner: &UserId) -> Result<Vec<CartItemWithProduct>> {
    self.check_read("list_cart").await?;
    let tables = self.tables.read().await;
    let mut lines: Vec<CartItemWithProduct> = tables
      .cart_items
      .values()
      .filter(|c| &c.owner_id == owner)
      .filter_map(|c| {
        tables.products.get(&c.product_id).map(|p| CartItemWithProduct {
          item: c.clone(),
          product: p.clone(),
        })
      })
      .collect();
    lines.sort_by(|a, b| b.item.created_at.cmp(&a.item.created_at));
    Ok(lines)
  }

  async fn list_cart_lines(&self, owner: &UserId) -> Result<Vec<CartItem>> {
    self.check_read("list_cart_lines").await?;
    let tables = self.tables.read().await;
    let mut lines: Vec<CartItem> = tables.cart_items.values().filter(|c| &c.owner_id == owner).cloned().collect();
    lines.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(lines)
  }

  async fn count_cart_lines(&self, owner: &UserId) -> Result<i64> {
    self.check_read("count_cart_lines").await?;
    let tables = self.tables.read().await;
    Ok(tables.cart_items.values().filter(|c| &c.owner_id == owner).count() as i64)
  }
}

#[async_trait]
impl OrderRepository for MemoryStore {
  async fn insert_order(&self, order: NewOrder) -> Result<Order> {
    let now = Utc::now();
    let row = Order {
      id: Uuid::new_v4(),
      owner_id: order.owner_id,
      total_amount: order.total_amount,
      status: crate::models::OrderStatus::Pending,
      shipping_address: Some(Json(order.shipping_address)),
      order_note: order.order_note,
      created_at: now,
      updated_at: now,
    };
    self.tables.write().await.orders.insert(row.id, row.clone());
    Ok(row)
  }

  async fn insert_order_items(&self, order_id: Uuid, items: &[NewOrderItem]) -> Result<Vec<OrderItem>> {
    if *self.fail_on_order_items.read().await {
      return Err(injected("insert_order_items"));
    }
    let mut tables = self.tables.write().await;
    if !tables.orders.contains_key(&order_id) {
      return Err(AppError::Store(sqlx::Error::RowNotFound));
    }
    let now = Utc::now();
    let rows: Vec<OrderItem> = items
      .iter()
      .map(|item| OrderItem {
        id: Uuid::new_v4(),
        order_id,
        product_id: item.product_id,
        product_name: item.product_name.clone(),
        quantity: item.quantity,
        price: item.price,
        created_at: now,
      })
      .collect();
    tables.order_items.extend(rows.iter().cloned());
    Ok(rows)
  }

  async fn delete_order(&self, order_id: Uuid) -> Result<()> {
    let mut tables = self.tables.write().await;
    tables.orders.remove(&order_id);
    tables.order_items.retain(|i| i.order_id != order_id);
    Ok(())
  }

  async fn get_order(&self, owner: &UserId, order_id: Uuid) -> Result<Option<Order>> {
    self.check_read("get_order").await?;
    let tables = self.tables.read().await;
    Ok(tables.orders.get(&order_id).filter(|o| &o.owner_id == owner).cloned())
  }

  async fn get_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    self.check_read("get_order_items").await?;
    let tables = self.tables.read().await;
    // Insertion order doubles as creation order.
    Ok(tables.order_items.iter().filter(|i| i.order_id == order_id).cloned().collect())
  }

  async fn list_orders(&self, owner: &UserId) -> Result<Vec<Order>> {
    self.check_read("list_orders").await?;
    let tables = self.tables.read().await;
    let mut orders: Vec<Order> = tables.orders.values().filter(|o| &o.owner_id == owner).cloned().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }

  async fn apply_status_change(&self, change: &StatusChange) -> Result<bool> {
    if *self.fail_on_status_change.read().await {
      return Err(injected("apply_status_change"));
    }
    let mut tables = self.tables.write().await;
    let now = Utc::now();

    match tables.orders.get_mut(&change.order_id) {
      Some(order) if order.owner_id == change.owner_id && order.status == change.from => {
        order.status = change.to;
        order.updated_at = now;
      }
      _ => return Ok(false),
    }

    if change.commit_stock {
      let Tables {
        products,
        cart_items,
        order_items,
        ..
      } = &mut *tables;
      for line in order_items.iter().filter(|i| i.order_id == change.order_id) {
        if let Some(product) = products.get_mut(&line.product_id) {
          product.stock_quantity = (product.stock_quantity - line.quantity).max(0);
          product.updated_at = now;
        }
      }
      cart_items.retain(|_, c| c.owner_id != change.owner_id);
    }
    Ok(true)
  }
}
