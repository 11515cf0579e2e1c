// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{cart_handlers, order_handlers, payment_handlers, product_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      // Literal segments are registered before `/{product_id}`.
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/featured", web::get().to(product_handlers::featured_products_handler))
          .route("/categories", web::get().to(product_handlers::category_counts_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      .service(
        web::scope("/cart")
          .route("/items", web::get().to(cart_handlers::get_cart_items_handler))
          .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
          .route(
            "/items/{cart_item_id}",
            web::patch().to(cart_handlers::update_cart_quantity_handler),
          )
          .route(
            "/items/{cart_item_id}",
            web::delete().to(cart_handlers::remove_from_cart_handler),
          )
          .route("/summary", web::get().to(cart_handlers::get_cart_summary_handler))
          .route("/count", web::get().to(cart_handlers::get_cart_count_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route(
            "/{order_id}/status",
            web::patch().to(order_handlers::update_order_status_handler),
          ),
      )
      .service(
        web::scope("/payments")
          .route("/success", web::get().to(payment_handlers::payment_success_handler))
          .route("/fail", web::get().to(payment_handlers::payment_fail_handler))
          .route("/{order_id}", web::post().to(payment_handlers::prepare_payment_handler)),
      ),
  );
}
