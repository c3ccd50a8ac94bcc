//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cinetrunk_core::error::ErrorClass;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  /// The movie database could not be reached or answered with an error.
  #[error("upstream error: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error through the core taxonomy.
  pub fn store<E: Into<cinetrunk_core::Error>>(e: E) -> Self {
    Self::from(e.into())
  }
}

impl From<cinetrunk_core::Error> for ApiError {
  fn from(e: cinetrunk_core::Error) -> Self {
    match e.class() {
      ErrorClass::Validation | ErrorClass::Conflict => Self::BadRequest(e.to_string()),
      ErrorClass::NotFound => Self::NotFound(e.to_string()),
      ErrorClass::Transient => Self::Store(Box::new(e)),
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self { Self::Upstream(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

/// Parse a path segment as a UUID, rejecting malformed ids with 400.
pub fn parse_id(raw: &str) -> Result<uuid::Uuid, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("invalid id: {raw:?}")))
}
