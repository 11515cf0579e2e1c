// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::product::ProductView;
use crate::models::{ProductQuery, ProductSort};
use crate::services::catalog;
use crate::state::AppState;

#[derive(Deserialize, Debug, Default)]
pub struct ListProductsQuery {
  pub page: Option<i64>,
  pub category: Option<String>,
  pub sort: Option<ProductSort>,
  pub search: Option<String>,
  pub limit: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FeaturedQuery {
  pub limit: Option<i64>,
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let params = query_params.into_inner();
  let query = ProductQuery::new(
    params.page,
    params.category,
    params.sort,
    params.search,
    params.limit,
    app_state.config.products_per_page,
  );
  let page = catalog::list_products(app_state.store.as_ref(), &query).await?;
  info!(total = page.total, returned = page.products.len(), "Products listed.");

  let products: Vec<ProductView<'_>> = page.products.iter().map(ProductView::from).collect();
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "products": products,
    "total": page.total,
    "page": page.page,
    "totalPages": page.total_pages,
    "limit": page.limit,
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = catalog::get_product(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "product": ProductView::from(&product),
  })))
}

#[instrument(name = "handler::featured_products", skip(app_state))]
pub async fn featured_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<FeaturedQuery>,
) -> Result<HttpResponse, AppError> {
  let limit = query_params
    .limit
    .unwrap_or(app_state.config.featured_products_limit)
    .clamp(1, ProductQuery::MAX_LIMIT);
  let products = catalog::featured_products(app_state.store.as_ref(), limit).await?;
  let views: Vec<ProductView<'_>> = products.iter().map(ProductView::from).collect();
  Ok(HttpResponse::Ok().json(json!({ "success": true, "products": views })))
}

#[instrument(name = "handler::category_counts", skip(app_state))]
pub async fn category_counts_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let counts = catalog::category_counts(app_state.store.as_ref()).await;
  HttpResponse::Ok().json(json!({ "success": true, "counts": counts }))
}
