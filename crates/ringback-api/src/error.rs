//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{FormRejection, JsonRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use ringback_core::AuthError;
use serde_json::json;
use thiserror::Error;

/// Body sent with every `401`, whatever the underlying reason.
pub const UNAUTHORIZED_MESSAGE: &str = "could not validate credentials";

/// An error returned by an API handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("authentication failed: {0}")]
  Auth(#[from] AuthError),

  #[error("account already exists")]
  DuplicateUser,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("token error: {0}")]
  Token(#[from] ringback_auth::Error),

  #[error("store error: {0}")]
  Store(#[source] ringback_store_sqlite::Error),
}

impl From<ringback_store_sqlite::Error> for ApiError {
  fn from(e: ringback_store_sqlite::Error) -> Self {
    match e {
      ringback_store_sqlite::Error::DuplicateUser => ApiError::DuplicateUser,
      e => ApiError::Store(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(e: JsonRejection) -> Self { ApiError::BadRequest(e.body_text()) }
}

impl From<FormRejection> for ApiError {
  fn from(e: FormRejection) -> Self { ApiError::BadRequest(e.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Auth(reason) => {
        tracing::warn!(%reason, "rejected request");
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": UNAUTHORIZED_MESSAGE })),
        )
          .into_response();
        res
          .headers_mut()
          .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        return res;
      }
      ApiError::DuplicateUser => (StatusCode::CONFLICT, self.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Token(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
