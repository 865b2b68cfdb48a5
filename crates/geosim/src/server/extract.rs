//! Request extractors that reject with `ApiError`

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::server::state::AppState;
use crate::session::{Account, Credentials};

/// Resolves the request's session, rejecting with 401 when there is none
pub struct CurrentAccount(pub Account);

impl FromRequestParts<AppState> for CurrentAccount {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
    let credentials = Credentials::from_headers(&parts.headers);
    match state.sessions.current_user(&credentials).await {
      Ok(Some(account)) => Ok(CurrentAccount(account)),
      Ok(None) => Err(ApiError::Unauthorized),
      Err(e) => {
        tracing::warn!(error = %e, "Session lookup failed");
        Err(ApiError::Unauthorized)
      }
    }
  }
}

/// `Json` body whose rejections render as the JSON error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
