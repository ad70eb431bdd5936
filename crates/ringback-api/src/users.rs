//! Handlers for account endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/register` | Body: `{"username","password"}`; 409 if taken |
//! | `POST` | `/login`    | JSON or OAuth2 password form; 401 on mismatch |
//! | `GET`  | `/me`       | Optional auth; `{"account": null}` when anonymous |

use axum::{Json, extract::State};
use ringback_core::{AuthError, account::Account};
use ringback_store_sqlite::accounts;
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::MaybeAccount,
  error::ApiError,
  extract::{ApiJson, JsonOrForm},
};

// ─── Bodies ───────────────────────────────────────────────────────────────────

/// Login and registration body. Extra form fields such as `grant_type` are
/// ignored.
#[derive(Debug, Deserialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl Credentials {
  /// Trim the username and reject blank fields.
  fn validated(self) -> Result<Self, ApiError> {
    let username = self.username.trim().to_owned();
    if username.is_empty() || self.password.is_empty() {
      return Err(ApiError::BadRequest(
        "username and password are required".to_owned(),
      ));
    }
    Ok(Self { username, password: self.password })
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
  pub token_type:   String,
}

impl TokenResponse {
  fn bearer(access_token: String) -> Self {
    Self { access_token, token_type: "bearer".to_owned() }
  }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
  pub account: Option<Account>,
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /register`
pub async fn register(
  State(state): State<AppState>,
  ApiJson(body): ApiJson<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
  let Credentials { username, password } = body.validated()?;

  let account = state
    .db
    .run(move |conn| accounts::create(conn, &username, &password))
    .await?;

  tracing::info!(
    account_id = %account.account_id,
    username = %account.username,
    "account registered"
  );

  let token = state.tokens.issue(&account.account_id.to_string())?;
  Ok(Json(TokenResponse::bearer(token)))
}

// ─── Login ────────────────────────────────────────────────────────────────────

/// `POST /login`
pub async fn login(
  State(state): State<AppState>,
  JsonOrForm(body): JsonOrForm<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
  let Credentials { username, password } = body.validated()?;
  let attempted = username.clone();

  let account = state
    .db
    .run(move |conn| accounts::authenticate(conn, &username, &password))
    .await?;

  let Some(account) = account else {
    tracing::info!(username = %attempted, "login failed");
    return Err(AuthError::InvalidCredentials.into());
  };

  tracing::info!(account_id = %account.account_id, "login succeeded");
  let token = state.tokens.issue(&account.account_id.to_string())?;
  Ok(Json(TokenResponse::bearer(token)))
}

// ─── Me ───────────────────────────────────────────────────────────────────────

/// `GET /me`
pub async fn me(MaybeAccount(account): MaybeAccount) -> Json<MeResponse> {
  Json(MeResponse { account })
}
