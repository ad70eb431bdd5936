//! Bearer-token extractors.
//!
//! [`CurrentAccount`] rejects a request that does not carry a valid token;
//! [`MaybeAccount`] lets an anonymous request through but still rejects a
//! token that is present and bad. Both resolve the token's subject to an
//! [`Account`] before the handler runs.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use ringback_core::{AuthError, account::Account};
use ringback_store_sqlite::accounts;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// The authenticated caller. Present in a handler means the request carried a
/// valid, unexpired token for an existing account.
pub struct CurrentAccount(pub Account);

/// The caller if a token was supplied, `None` for anonymous requests.
pub struct MaybeAccount(pub Option<Account>);

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// Any other scheme counts as no token at all.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("bearer") {
    return None;
  }
  let token = token.trim();
  (!token.is_empty()).then_some(token)
}

/// Validate `token` and resolve its subject to an account.
pub async fn resolve(state: &AppState, token: &str) -> Result<Account, ApiError> {
  let claims = state.tokens.validate(token)?;
  let subject = claims.check(Utc::now())?;

  let Ok(account_id) = Uuid::parse_str(subject) else {
    tracing::warn!(subject, "token subject is not an account id");
    return Err(AuthError::InvalidCredentials.into());
  };

  let account = state
    .db
    .run(move |conn| accounts::find_by_id(conn, account_id))
    .await?;

  account.ok_or_else(|| {
    tracing::warn!(%account_id, "token subject does not resolve to an account");
    AuthError::InvalidCredentials.into()
  })
}

impl FromRequestParts<AppState> for CurrentAccount {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(AuthError::MissingCredentials)?;
    resolve(state, token).await.map(CurrentAccount)
  }
}

impl FromRequestParts<AppState> for MaybeAccount {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    match bearer_token(&parts.headers) {
      Some(token) => resolve(state, token).await.map(|a| MaybeAccount(Some(a))),
      None => Ok(MaybeAccount(None)),
    }
  }
}
