// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
      "memory" => Ok(StoreBackend::Memory),
      other => Err(AppError::Config(format!("Invalid STORE_BACKEND '{}'", other))),
    }
  }
}

/// How strictly order status changes are checked against the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
  #[default]
  Strict,
  /// Any status may move to any other. Confirmation side effects are still
  /// gated on pending -> confirmed.
  Permissive,
}

impl FromStr for StatusPolicy {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "strict" => Ok(StatusPolicy::Strict),
      "permissive" => Ok(StatusPolicy::Permissive),
      other => Err(AppError::Config(format!("Invalid ORDER_STATUS_POLICY '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentGatewayKind {
  Hosted,
  Mock,
}

impl FromStr for PaymentGatewayKind {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "hosted" => Ok(PaymentGatewayKind::Hosted),
      "mock" => Ok(PaymentGatewayKind::Mock),
      other => Err(AppError::Config(format!("Invalid PAYMENT_GATEWAY '{}'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub app_base_url: String,

  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub seed_db: bool,

  pub products_per_page: i64,
  pub featured_products_limit: i64,
  pub order_status_policy: StatusPolicy,

  pub payment_gateway: PaymentGatewayKind,
  pub payment_client_key: Option<String>,
  pub payment_order_id_prefix: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process
  /// environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| lookup(var_name).filter(|v| !v.trim().is_empty());

    fn parse<T: FromStr>(var_name: &str, raw: String) -> Result<T>
    where
      T::Err: std::fmt::Display,
    {
      raw
        .trim()
        .parse::<T>()
        .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e)))
    }

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port: u16 = parse("SERVER_PORT", get_env("SERVER_PORT").unwrap_or_else(|| "8080".to_string()))?;
    let app_base_url = get_env("APP_BASE_URL").unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));

    let database_url = get_env("DATABASE_URL");
    let store_backend = match get_env("STORE_BACKEND") {
      Some(raw) => raw.parse::<StoreBackend>()?,
      None if database_url.is_some() => StoreBackend::Postgres,
      None => StoreBackend::Memory,
    };
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "STORE_BACKEND=postgres requires DATABASE_URL".to_string(),
      ));
    }
    let database_max_connections: u32 = parse(
      "DATABASE_MAX_CONNECTIONS",
      get_env("DATABASE_MAX_CONNECTIONS").unwrap_or_else(|| "10".to_string()),
    )?;
    let run_migrations: bool = parse(
      "RUN_MIGRATIONS",
      get_env("RUN_MIGRATIONS").unwrap_or_else(|| "true".to_string()),
    )?;
    let seed_db: bool = parse("SEED_DB", get_env("SEED_DB").unwrap_or_else(|| "false".to_string()))?;

    let products_per_page: i64 = parse(
      "PRODUCTS_PER_PAGE",
      get_env("PRODUCTS_PER_PAGE").unwrap_or_else(|| "12".to_string()),
    )?;
    let featured_products_limit: i64 = parse(
      "FEATURED_PRODUCTS_LIMIT",
      get_env("FEATURED_PRODUCTS_LIMIT").unwrap_or_else(|| "8".to_string()),
    )?;
    if products_per_page <= 0 || featured_products_limit <= 0 {
      return Err(AppError::Config(
        "PRODUCTS_PER_PAGE and FEATURED_PRODUCTS_LIMIT must be positive".to_string(),
      ));
    }

    let order_status_policy = match get_env("ORDER_STATUS_POLICY") {
      Some(raw) => raw.parse::<StatusPolicy>()?,
      None => StatusPolicy::Strict,
    };

    let payment_client_key = get_env("PAYMENT_CLIENT_KEY");
    let payment_gateway = match get_env("PAYMENT_GATEWAY") {
      Some(raw) => raw.parse::<PaymentGatewayKind>()?,
      None if payment_client_key.is_some() => PaymentGatewayKind::Hosted,
      None => PaymentGatewayKind::Mock,
    };
    let payment_order_id_prefix = lookup("PAYMENT_ORDER_ID_PREFIX").unwrap_or_else(|| "order-".to_string());

    tracing::info!(
      ?store_backend,
      ?order_status_policy,
      ?payment_gateway,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      app_base_url,
      store_backend,
      database_url,
      database_max_connections,
      run_migrations,
      seed_db,
      products_per_page,
      featured_products_limit,
      order_status_policy,
      payment_gateway,
      payment_client_key,
      payment_order_id_prefix,
    })
  }

  /// In-memory defaults, used by tests and local runs without a database.
  pub fn for_memory_store() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      app_base_url: "http://127.0.0.1:8080".to_string(),
      store_backend: StoreBackend::Memory,
      database_url: None,
      database_max_connections: 10,
      run_migrations: false,
      seed_db: false,
      products_per_page: 12,
      featured_products_limit: 8,
      order_status_policy: StatusPolicy::Strict,
      payment_gateway: PaymentGatewayKind::Mock,
      payment_client_key: None,
      payment_order_id_prefix: "order-".to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(move |name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_select_memory_backend_without_database_url() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg.store_backend, StoreBackend::Memory);
    assert_eq!(cfg.server_port, 8080);
    assert_eq!(cfg.app_base_url, "http://127.0.0.1:8080");
    assert_eq!(cfg.products_per_page, 12);
    assert_eq!(cfg.featured_products_limit, 8);
    assert_eq!(cfg.order_status_policy, StatusPolicy::Strict);
    assert_eq!(cfg.payment_order_id_prefix, "order-");
    assert_eq!(cfg.payment_gateway, PaymentGatewayKind::Mock);
  }

  #[test]
  fn client_key_selects_hosted_gateway() {
    let cfg = config_from(&[("PAYMENT_CLIENT_KEY", "test_ck_123")]).unwrap();
    assert_eq!(cfg.payment_gateway, PaymentGatewayKind::Hosted);
  }

  #[test]
  fn database_url_implies_postgres() {
    let cfg = config_from(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap();
    assert_eq!(cfg.store_backend, StoreBackend::Postgres);
  }

  #[test]
  fn postgres_without_url_is_rejected() {
    let err = config_from(&[("STORE_BACKEND", "postgres")]).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
  }

  #[test]
  fn invalid_values_fail() {
    assert!(config_from(&[("SERVER_PORT", "eighty")]).is_err());
    assert!(config_from(&[("ORDER_STATUS_POLICY", "lenient")]).is_err());
    assert!(config_from(&[("PRODUCTS_PER_PAGE", "0")]).is_err());
  }

  #[test]
  fn permissive_policy_is_parsed() {
    let cfg = config_from(&[("ORDER_STATUS_POLICY", "Permissive"), ("PAYMENT_GATEWAY", "mock")]).unwrap();
    assert_eq!(cfg.order_status_policy, StatusPolicy::Permissive);
    assert_eq!(cfg.payment_gateway, PaymentGatewayKind::Mock);
  }
}
