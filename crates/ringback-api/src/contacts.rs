//! Handlers for `/contacts` endpoints. Every route requires a bearer token and
//! only ever sees the caller's own contacts.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | Never-called first, then most overdue |
//! | `POST`   | `/contacts` | Body: `{"name":"..."}`; returns 201 + contact |
//! | `POST`   | `/contacts/:id/called` | 404 if not the caller's |
//! | `DELETE` | `/contacts/:id` | `{"success":true}`; 404 if not the caller's |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ringback_core::contact::Contact;
use ringback_store_sqlite::contacts;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::CurrentAccount, error::ApiError, extract::ApiJson};

/// Parse a contact reference from the path. A malformed id cannot name any
/// contact, so it is reported the same way as a missing one.
fn contact_ref(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| not_found(raw))
}

fn not_found(raw: &str) -> ApiError { ApiError::NotFound(format!("contact {raw} not found")) }

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list(
  CurrentAccount(account): CurrentAccount,
  State(state): State<AppState>,
) -> Result<Json<Vec<Contact>>, ApiError> {
  let owner = account.account_id;
  let contacts = state.db.run(move |conn| contacts::list(conn, owner)).await?;
  Ok(Json(contacts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /contacts` — body: `{"name":"Mom"}`
pub async fn create(
  CurrentAccount(account): CurrentAccount,
  State(state): State<AppState>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let name = body.name.trim().to_owned();
  if name.is_empty() {
    return Err(ApiError::BadRequest("name is required".to_owned()));
  }

  let owner = account.account_id;
  let contact = state
    .db
    .run(move |conn| contacts::create(conn, owner, &name))
    .await?;
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Mark called ──────────────────────────────────────────────────────────────

/// `POST /contacts/:id/called`
pub async fn mark_called(
  CurrentAccount(account): CurrentAccount,
  State(state): State<AppState>,
  Path(raw): Path<String>,
) -> Result<Json<Contact>, ApiError> {
  let id = contact_ref(&raw)?;
  let owner = account.account_id;
  state
    .db
    .run(move |conn| contacts::mark_called(conn, owner, id))
    .await?
    .map(Json)
    .ok_or_else(|| not_found(&raw))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
  pub success: bool,
}

/// `DELETE /contacts/:id`
pub async fn delete(
  CurrentAccount(account): CurrentAccount,
  State(state): State<AppState>,
  Path(raw): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
  let id = contact_ref(&raw)?;
  let owner = account.account_id;
  let removed = state
    .db
    .run(move |conn| contacts::delete(conn, owner, id))
    .await?;

  if removed {
    Ok(Json(DeleteResponse { success: true }))
  } else {
    Err(not_found(&raw))
  }
}
