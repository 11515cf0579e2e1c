// storefront/src/web/extractors.rs

use crate::errors::AppError;
use crate::models::UserId;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

/// Header set by the upstream auth proxy after it has verified the session.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// The verified caller. Requests without a usable `X-User-ID` are rejected with
/// `Unauthenticated`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: UserId,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let user_id = req
      .headers()
      .get(USER_ID_HEADER)
      .and_then(|value| value.to_str().ok())
      .and_then(UserId::parse);

    match user_id {
      Some(user_id) => ready(Ok(AuthenticatedUser { user_id })),
      None => {
        warn!("Missing or blank {} header.", USER_ID_HEADER);
        ready(Err(AppError::Unauthenticated))
      }
    }
  }
}
