// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::env;
use storefront::config::AppConfig;
use storefront::state::AppState;
use storefront::web::configure_app_routes;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);

  if env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
    builder.json().init();
  } else {
    builder.init();
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Read .env before the subscriber so RUST_LOG and LOG_FORMAT can live there.
  dotenvy::dotenv().ok();
  init_tracing();

  tracing::info!("Starting storefront server...");

  let app_config = AppConfig::from_env().map_err(|e| {
    tracing::error!(error = %e, "Failed to load application configuration.");
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
  })?;
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);

  let app_state = AppState::from_config(app_config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialize application state.");
    std::io::Error::other(e.to_string())
  })?;

  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
