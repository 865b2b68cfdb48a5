//! HTTP error boundary
//!
//! Handlers return `ApiError`; it renders as a JSON `{error, details?}` body
//! with the matching status code.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::LifecycleError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Unauthorized")]
  Unauthorized,

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{message}")]
  Internal { message: String, details: Option<String> },
}

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
  pub error: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

impl ApiError {
  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::BadRequest(message.into())
  }

  pub fn forbidden(message: impl Into<String>) -> Self {
    Self::Forbidden(message.into())
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::NotFound(message.into())
  }

  pub fn internal(message: impl Into<String>, details: impl ToString) -> Self {
    Self::Internal { message: message.into(), details: Some(details.to_string()) }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  pub fn body(&self) -> ErrorBody {
    let details = match self {
      ApiError::Internal { details, .. } => details.clone(),
      _ => None,
    };
    ErrorBody { error: self.to_string(), details }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    if let ApiError::Internal { message, details } = &self {
      tracing::error!(details = details.as_deref().unwrap_or(""), "{message}");
    }
    (self.status(), Json(self.body())).into_response()
  }
}

/// Malformed, mistyped or non-JSON request bodies
impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
  }
}

impl From<StoreError> for ApiError {
  fn from(error: StoreError) -> Self {
    ApiError::internal("Database error", error)
  }
}

impl From<LifecycleError> for ApiError {
  fn from(error: LifecycleError) -> Self {
    match error {
      LifecycleError::Model(e) => ApiError::internal("Simulation failed", e),
      LifecycleError::Store(e) => ApiError::internal("Failed to save simulation", e),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::ModelError;

  #[test]
  fn test_status_codes() {
    assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
    assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::internal("x", "y").status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_only_internal_errors_carry_details() {
    let body = ApiError::not_found("Simulation not found").body();
    assert_eq!(body, ErrorBody { error: "Simulation not found".to_string(), details: None });
    assert_eq!(serde_json::to_value(&body).unwrap(), serde_json::json!({ "error": "Simulation not found" }));

    let store = ApiError::from(StoreError::Decode("bad row".to_string())).body();
    assert_eq!(store.error, "Database error");
    assert_eq!(store.details.as_deref(), Some("Malformed store response: bad row"));
  }

  #[test]
  fn test_lifecycle_errors_map_to_internal() {
    let error = ApiError::from(LifecycleError::Model(ModelError::Provider { status: 500, body: "boom".to_string() }));
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error.body().error, "Simulation failed");
  }
}
