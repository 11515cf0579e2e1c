// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Below this many units a product is reported as running low.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  /// Smallest currency unit.
  pub price: i64,
  pub category: Option<String>,
  pub stock_quantity: i32,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn stock_status(&self) -> StockStatus {
    StockStatus::from_quantity(self.stock_quantity)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
  InStock,
  LowStock,
  OutOfStock,
}

impl StockStatus {
  pub fn from_quantity(quantity: i32) -> Self {
    if quantity <= 0 {
      StockStatus::OutOfStock
    } else if quantity < LOW_STOCK_THRESHOLD {
      StockStatus::LowStock
    } else {
      StockStatus::InStock
    }
  }
}

/// A product as returned to clients, with its derived stock label.
#[derive(Debug, Serialize)]
pub struct ProductView<'a> {
  #[serde(flatten)]
  pub product: &'a Product,
  pub stock_status: StockStatus,
}

impl<'a> From<&'a Product> for ProductView<'a> {
  fn from(product: &'a Product) -> Self {
    ProductView {
      product,
      stock_status: product.stock_status(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
  #[default]
  Latest,
  PriceAsc,
  PriceDesc,
  NameAsc,
}

impl ProductSort {
  pub fn order_by_sql(self) -> &'static str {
    match self {
      ProductSort::Latest => "created_at DESC",
      ProductSort::PriceAsc => "price ASC",
      ProductSort::PriceDesc => "price DESC",
      ProductSort::NameAsc => "name ASC",
    }
  }
}

/// Normalized catalog listing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
  pub page: i64,
  pub category: Option<String>,
  pub sort: ProductSort,
  pub search: Option<String>,
  pub limit: i64,
}

impl ProductQuery {
  pub const MAX_LIMIT: i64 = 100;

  pub fn new(
    page: Option<i64>,
    category: Option<String>,
    sort: Option<ProductSort>,
    search: Option<String>,
    limit: Option<i64>,
    default_limit: i64,
  ) -> Self {
    let non_blank = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    Self {
      page: page.unwrap_or(1).max(1),
      category: non_blank(category),
      sort: sort.unwrap_or_default(),
      search: non_blank(search),
      limit: limit.unwrap_or(default_limit).clamp(1, Self::MAX_LIMIT),
    }
  }

  /// Saturates for absurd page numbers, which then read an empty page.
  pub fn offset(&self) -> i64 {
    (self.page - 1).saturating_mul(self.limit)
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
  pub products: Vec<Product>,
  pub total: i64,
  pub page: i64,
  pub total_pages: i64,
  pub limit: i64,
}

impl ProductPage {
  pub fn new(products: Vec<Product>, total: i64, query: &ProductQuery) -> Self {
    Self {
      products,
      total,
      page: query.page,
      total_pages: (total + query.limit - 1) / query.limit,
      limit: query.limit,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stock_status_thresholds() {
    assert_eq!(StockStatus::from_quantity(0), StockStatus::OutOfStock);
    assert_eq!(StockStatus::from_quantity(1), StockStatus::LowStock);
    assert_eq!(StockStatus::from_quantity(9), StockStatus::LowStock);
    assert_eq!(StockStatus::from_quantity(10), StockStatus::InStock);
  }

  #[test]
  fn query_normalizes_inputs() {
    let q = ProductQuery::new(Some(0), Some("  ".to_string()), None, Some(" mug ".to_string()), Some(500), 12);
    assert_eq!(q.page, 1);
    assert_eq!(q.category, None);
    assert_eq!(q.search.as_deref(), Some("mug"));
    assert_eq!(q.limit, ProductQuery::MAX_LIMIT);
    assert_eq!(q.sort, ProductSort::Latest);
  }

  #[test]
  fn total_pages_rounds_up() {
    let q = ProductQuery::new(Some(2), None, None, None, None, 12);
    assert_eq!(q.offset(), 12);
    assert_eq!(ProductPage::new(vec![], 25, &q).total_pages, 3);
    assert_eq!(ProductPage::new(vec![], 24, &q).total_pages, 2);
    assert_eq!(ProductPage::new(vec![], 0, &q).total_pages, 0);
  }

  #[test]
  fn huge_page_saturates_offset() {
    let q = ProductQuery::new(Some(i64::MAX), None, None, None, None, 12);
    assert_eq!(q.offset(), i64::MAX);
    let q = ProductQuery::new(Some(i64::MAX), None, None, None, Some(100), 12);
    assert_eq!(q.offset(), i64::MAX);
  }
}
