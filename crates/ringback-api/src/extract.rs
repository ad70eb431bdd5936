//! Request-body extractors whose rejections render as [`ApiError`].

use axum::{
  Form, Json,
  extract::{FromRequest, Request},
  http::header,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// [`Json`] whose rejections are `400` with a JSON error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// A body sent either as JSON or as `application/x-www-form-urlencoded`.
///
/// OAuth2 password-grant clients post their credentials as a form.
pub struct JsonOrForm<T>(pub T);

fn is_form(req: &Request) -> bool {
  req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(';').next())
    .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
  S: Send + Sync,
  T: DeserializeOwned + Send,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    if is_form(&req) {
      let Form(value) = Form::<T>::from_request(req, state).await?;
      Ok(Self(value))
    } else {
      let Json(value) = Json::<T>::from_request(req, state).await?;
      Ok(Self(value))
    }
  }
}
