// storefront/src/store/postgres.rs

use super::{CartRepository, CatalogRepository, OrderRepository};
use crate::errors::{AppError, Result};
use crate::models::{
  CartItem, CartItemWithProduct, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, Product, ProductQuery,
  StatusChange, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::BTreeMap;
use tracing::{error, info, instrument};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
  "id, name, description, price, category, stock_quantity, is_active, created_at, updated_at";
const CART_COLUMNS: &str = "id, owner_id, product_id, quantity, created_at, updated_at";
const ORDER_COLUMNS: &str =
  "id, owner_id, total_amount, status, shipping_address, order_note, created_at, updated_at";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, price, created_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await
      .map_err(|e| {
        error!(error = %e, "Failed to connect to the database.");
        AppError::Store(e)
      })?;
    Ok(Self::new(pool))
  }

  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .map_err(|e| AppError::Store(e.into()))?;
    info!("Database migrations applied.");
    Ok(())
  }
}

/// Escapes LIKE wildcards so search text matches literally.
fn like_pattern(search: &str) -> String {
  let escaped = search.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
  format!("%{}%", escaped)
}

fn push_product_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, query: &'a ProductQuery) {
  qb.push(" WHERE is_active = TRUE");
  if let Some(category) = &query.category {
    qb.push(" AND category = ").push_bind(category);
  }
  if let Some(search) = &query.search {
    qb.push(" AND name ILIKE ").push_bind(like_pattern(search));
  }
}

#[async_trait]
impl CatalogRepository for PgStore {
  #[instrument(name = "store::list_products", skip(self))]
  async fn list_products(&self, query: &ProductQuery) -> Result<(Vec<Product>, i64)> {
    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
    push_product_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
    push_product_filters(&mut qb, query);
    qb.push(" ORDER BY ")
      .push(query.sort.order_by_sql())
      .push(", id")
      .push(" LIMIT ")
      .push_bind(query.limit)
      .push(" OFFSET ")
      .push_bind(query.offset());
    let products = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;
    Ok((products, total))
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  async fn featured_products(&self, limit: i64) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products WHERE is_active = TRUE ORDER BY created_at DESC LIMIT $1",
      PRODUCT_COLUMNS
    ))
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;
    Ok(products)
  }

  async fn category_counts(&self) -> Result<BTreeMap<Option<String>, i64>> {
    let rows: Vec<(Option<String>, i64)> =
      sqlx::query_as("SELECT category, COUNT(*) FROM products WHERE is_active = TRUE GROUP BY category")
        .fetch_all(&self.pool)
        .await?;
    Ok(rows.into_iter().collect())
  }

  async fn upsert_product(&self, product: &Product) -> Result<()> {
    sqlx::query(
      r#"
      INSERT INTO products (id, name, description, price, category, stock_quantity, is_active, created_at, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
      ON CONFLICT (id) DO UPDATE SET
        name = EXCLUDED.name,
        description = EXCLUDED.description,
        price = EXCLUDED.price,
        category = EXCLUDED.category,
        stock_quantity = EXCLUDED.stock_quantity,
        is_active = EXCLUDED.is_active,
        updated_at = EXCLUDED.updated_at
      "#,
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.category)
    .bind(product.stock_quantity)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }
}

/// `cart_items` joined with `products`, columns prefixed to keep them apart.
#[derive(FromRow)]
struct CartLineRow {
  id: Uuid,
  owner_id: UserId,
  product_id: Uuid,
  quantity: i32,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  p_name: String,
  p_description: Option<String>,
  p_price: i64,
  p_category: Option<String>,
  p_stock_quantity: i32,
  p_is_active: bool,
  p_created_at: DateTime<Utc>,
  p_updated_at: DateTime<Utc>,
}

impl From<CartLineRow> for CartItemWithProduct {
  fn from(row: CartLineRow) -> Self {
    CartItemWithProduct {
      product: Product {
        id: row.product_id,
        name: row.p_name,
        description: row.p_description,
        price: row.p_price,
        category: row.p_category,
        stock_quantity: row.p_stock_quantity,
        is_active: row.p_is_active,
        created_at: row.p_created_at,
        updated_at: row.p_updated_at,
      },
      item: CartItem {
        id: row.id,
        owner_id: row.owner_id,
        product_id: row.product_id,
        quantity: row.quantity,
        created_at: row.created_at,
        updated_at: row.updated_at,
      },
    }
  }
}

#[async_trait]
impl CartRepository for PgStore {
  async fn find_cart_line(&self, owner: &UserId, product_id: Uuid) -> Result<Option<CartItem>> {
    let line = sqlx::query_as::<_, CartItem>(&format!(
      "SELECT {} FROM cart_items WHERE owner_id = $1 AND product_id = $2",
      CART_COLUMNS
    ))
    .bind(owner)
    .bind(product_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(line)
  }

  async fn get_cart_line(&self, owner: &UserId, line_id: Uuid) -> Result<Option<CartItem>> {
    let line = sqlx::query_as::<_, CartItem>(&format!(
      "SELECT {} FROM cart_items WHERE id = $1 AND owner_id = $2",
      CART_COLUMNS
    ))
    .bind(line_id)
    .bind(owner)
    .fetch_optional(&self.pool)
    .await?;
    Ok(line)
  }

  async fn insert_cart_line(&self, owner: &UserId, product_id: Uuid, quantity: i32) -> Result<CartItem> {
    sqlx::query_as::<_, CartItem>(&format!(
      "INSERT INTO cart_items (id, owner_id, product_id, quantity) VALUES ($1, $2, $3, $4) RETURNING {}",
      CART_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(owner)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| match e.as_database_error() {
      Some(db) if db.is_unique_violation() => {
        AppError::Conflict("Cart line already exists for this product.".to_string())
      }
      _ => AppError::Store(e),
    })
  }

  async fn set_cart_quantity(&self, owner: &UserId, line_id: Uuid, quantity: i32) -> Result<Option<CartItem>> {
    let line = sqlx::query_as::<_, CartItem>(&format!(
      "UPDATE cart_items SET quantity = $1, updated_at = NOW() WHERE id = $2 AND owner_id = $3 RETURNING {}",
      CART_COLUMNS
    ))
    .bind(quantity)
    .bind(line_id)
    .bind(owner)
    .fetch_optional(&self.pool)
    .await?;
    Ok(line)
  }

  async fn delete_cart_line(&self, owner: &UserId, line_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM cart_items WHERE id = $1 AND owner_id = $2")
      .bind(line_id)
      .bind(owner)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn list_cart(&self, owner: &UserId) -> Result<Vec<CartItemWithProduct>> {
    let rows = sqlx::query_as::<_, CartLineRow>(
      r#"
      SELECT c.id, c.owner_id, c.product_id, c.quantity, c.created_at, c.updated_at,
             p.name AS p_name, p.description AS p_description, p.price AS p_price,
             p.category AS p_category, p.stock_quantity AS p_stock_quantity,
             p.is_active AS p_is_active, p.created_at AS p_created_at, p.updated_at AS p_updated_at
      FROM cart_items c
      JOIN products p ON p.id = c.product_id -- lines of deleted products drop out
      WHERE c.owner_id = $1
      ORDER BY c.created_at DESC
      "#,
    )
    .bind(owner)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(CartItemWithProduct::from).collect())
  }

  async fn list_cart_lines(&self, owner: &UserId) -> Result<Vec<CartItem>> {
    let lines = sqlx::query_as::<_, CartItem>(&format!(
      "SELECT {} FROM cart_items WHERE owner_id = $1 ORDER BY created_at DESC",
      CART_COLUMNS
    ))
    .bind(owner)
    .fetch_all(&self.pool)
    .await?;
    Ok(lines)
  }

  async fn count_cart_lines(&self, owner: &UserId) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE owner_id = $1")
      .bind(owner)
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }
}

#[async_trait]
impl OrderRepository for PgStore {
  async fn insert_order(&self, order: NewOrder) -> Result<Order> {
    let row = sqlx::query_as::<_, Order>(&format!(
      r#"
      INSERT INTO orders (id, owner_id, total_amount, status, shipping_address, order_note)
      VALUES ($1, $2, $3, $4, $5, $6)
      RETURNING {}
      "#,
      ORDER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&order.owner_id)
    .bind(order.total_amount)
    .bind(OrderStatus::Pending)
    .bind(Json(&order.shipping_address))
    .bind(&order.order_note)
    .fetch_one(&self.pool)
    .await?;
    Ok(row)
  }

  #[instrument(name = "store::insert_order_items", skip(self, items), fields(lines = items.len()))]
  async fn insert_order_items(&self, order_id: Uuid, items: &[NewOrderItem]) -> Result<Vec<OrderItem>> {
    let mut tx = self.pool.begin().await?;
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
      let row = sqlx::query_as::<_, OrderItem>(&format!(
        r#"
        INSERT INTO order_items (id, order_id, product_id, product_name, quantity, price)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        ORDER_ITEM_COLUMNS
      ))
      .bind(Uuid::new_v4())
      .bind(order_id)
      .bind(item.product_id)
      .bind(&item.product_name)
      .bind(item.quantity)
      .bind(item.price)
      .fetch_one(&mut *tx)
      .await?;
      rows.push(row);
    }
    tx.commit().await?;
    Ok(rows)
  }

  async fn delete_order(&self, order_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(order_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn get_order(&self, owner: &UserId, order_id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE id = $1 AND owner_id = $2",
      ORDER_COLUMNS
    ))
    .bind(order_id)
    .bind(owner)
    .fetch_optional(&self.pool)
    .await?;
    Ok(order)
  }

  async fn get_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(&format!(
      "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY created_at ASC, id",
      ORDER_ITEM_COLUMNS
    ))
    .bind(order_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  async fn list_orders(&self, owner: &UserId) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE owner_id = $1 ORDER BY created_at DESC",
      ORDER_COLUMNS
    ))
    .bind(owner)
    .fetch_all(&self.pool)
    .await?;
    Ok(orders)
  }

  #[instrument(
    name = "store::apply_status_change",
    skip(self, change),
    fields(order_id = %change.order_id, from = %change.from, to = %change.to, commit_stock = change.commit_stock)
  )]
  async fn apply_status_change(&self, change: &StatusChange) -> Result<bool> {
    let mut tx = self.pool.begin().await?;

    let current: Option<OrderStatus> =
      sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 AND owner_id = $2 FOR UPDATE")
        .bind(change.order_id)
        .bind(&change.owner_id)
        .fetch_optional(&mut *tx)
        .await?;
    if current != Some(change.from) {
      tx.rollback().await?;
      return Ok(false);
    }

    sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
      .bind(change.to)
      .bind(change.order_id)
      .execute(&mut *tx)
      .await?;

    if change.commit_stock {
      sqlx::query(
        r#"
        UPDATE products p
        SET stock_quantity = GREATEST(p.stock_quantity - oi.qty, 0)::INTEGER, updated_at = NOW()
        FROM (
          SELECT product_id, SUM(quantity) AS qty FROM order_items WHERE order_id = $1 GROUP BY product_id
        ) oi
        WHERE p.id = oi.product_id
        "#,
      )
      .bind(change.order_id)
      .execute(&mut *tx)
      .await?;

      sqlx::query("DELETE FROM cart_items WHERE owner_id = $1")
        .bind(&change.owner_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
  }
}
