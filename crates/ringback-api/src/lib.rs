//! JSON REST API for Ringback.
//!
//! Exposes an axum [`Router`] over a [`Database`] and a [`TokenService`].
//! Account routes are open; contact routes require a bearer token obtained
//! from `/register` or `/login`.

pub mod auth;
pub mod contacts;
pub mod error;
pub mod extract;
pub mod users;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use ringback_auth::{TokenService, token::DEFAULT_TTL_MINUTES};
use ringback_store_sqlite::{Database, PoolConfig};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from an optional TOML file
/// layered under `RINGBACK_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  /// Path to the SQLite file, optionally prefixed with `sqlite://`.
  /// `:memory:` opens a throwaway in-memory database.
  #[serde(default = "default_database_url")]
  pub database_url:    String,
  #[serde(default = "default_pool_min_size")]
  pub pool_min_size:   u32,
  #[serde(default = "default_pool_max_size")]
  pub pool_max_size:   u32,
  pub jwt_secret:      String,
  /// One of `HS256`, `HS384`, `HS512`.
  #[serde(default = "default_jwt_algorithm")]
  pub jwt_algorithm:   String,
  #[serde(default = "default_jwt_ttl_minutes")]
  pub jwt_ttl_minutes: i64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_database_url() -> String { "ringback.db".to_owned() }
fn default_pool_min_size() -> u32 { PoolConfig::default().min_size }
fn default_pool_max_size() -> u32 { PoolConfig::default().max_size }
fn default_jwt_algorithm() -> String { "HS256".to_owned() }
fn default_jwt_ttl_minutes() -> i64 { DEFAULT_TTL_MINUTES }

impl ServerConfig {
  pub fn pool_config(&self) -> PoolConfig {
    PoolConfig { min_size: self.pool_min_size, max_size: self.pool_max_size }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub db:     Database,
  pub tokens: Arc<TokenService>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Routes relative to the API root.
pub fn api_router(state: AppState) -> Router {
  Router::new()
    .route("/register", post(users::register))
    .route("/login", post(users::login))
    .route("/me", get(users::me))
    .route("/contacts", get(contacts::list).post(contacts::create))
    .route("/contacts/{id}/called", post(contacts::mark_called))
    .route("/contacts/{id}", delete(contacts::delete))
    .with_state(state)
}

/// The full application: the API nested under `/api`, with request tracing.
pub fn router(state: AppState) -> Router {
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
  };
  use chrono::TimeDelta;
  use jsonwebtoken::Algorithm;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use crate::error::UNAUTHORIZED_MESSAGE;

  const SECRET: &[u8] = b"integration-test-secret";

  async fn make_state() -> AppState {
    AppState {
      db:     Database::open_in_memory().await.unwrap(),
      tokens: Arc::new(
        TokenService::new(SECRET, Algorithm::HS256, TimeDelta::minutes(60)).unwrap(),
      ),
    }
  }

  struct Reply {
    status:  StatusCode,
    headers: HeaderMap,
    body:    Value,
  }

  async fn send(
    state:  &AppState,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    Reply { status, headers, body }
  }

  async fn register(state: &AppState, username: &str) -> String {
    let reply = send(
      state,
      "POST",
      "/api/register",
      None,
      Some(json!({ "username": username, "password": "pw-for-tests" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "register: {}", reply.body);
    assert_eq!(reply.body["token_type"], "bearer");
    reply.body["access_token"].as_str().unwrap().to_owned()
  }

  async fn add_contact(state: &AppState, token: &str, name: &str) -> Value {
    let reply =
      send(state, "POST", "/api/contacts", Some(token), Some(json!({ "name": name }))).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    reply.body
  }

  fn assert_unauthorized(reply: &Reply) {
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
      reply.headers.get(header::WWW_AUTHENTICATE).unwrap(),
      "Bearer"
    );
    assert_eq!(reply.body, json!({ "error": UNAUTHORIZED_MESSAGE }));
  }

  // ── Registration and login ──────────────────────────────────────────────────

  #[tokio::test]
  async fn register_then_login_yields_tokens_for_the_same_account() {
    let state = make_state().await;
    let registered = register(&state, "alice").await;

    let login = send(
      &state,
      "POST",
      "/api/login",
      None,
      Some(json!({ "username": "alice", "password": "pw-for-tests" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    let logged_in = login.body["access_token"].as_str().unwrap();

    let me_a = send(&state, "GET", "/api/me", Some(&registered), None).await;
    let me_b = send(&state, "GET", "/api/me", Some(logged_in), None).await;
    assert_eq!(me_a.body["account"]["username"], "alice");
    assert_eq!(me_a.body["account"]["account_id"], me_b.body["account"]["account_id"]);
  }

  #[tokio::test]
  async fn login_accepts_an_oauth2_password_form() {
    let state = make_state().await;
    register(&state, "alice").await;

    let login = |password: &'static str| {
      let state = state.clone();
      async move {
        let req = Request::builder()
          .method("POST")
          .uri("/api/login")
          .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
          .body(Body::from(format!(
            "grant_type=password&username=alice&password={password}"
          )))
          .unwrap();
        router(state).oneshot(req).await.unwrap()
      }
    };

    let ok = login("pw-for-tests").await;
    assert_eq!(ok.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(ok.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap();

    let me = send(&state, "GET", "/api/me", Some(token), None).await;
    assert_eq!(me.body["account"]["username"], "alice");

    let wrong = login("nope").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn malformed_bodies_are_400_with_a_json_error() {
    let state = make_state().await;

    let missing_field = send(
      &state,
      "POST",
      "/api/register",
      None,
      Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
    assert!(missing_field.body["error"].is_string());

    let token = register(&state, "alice").await;
    let wrong_type =
      send(&state, "POST", "/api/contacts", Some(&token), Some(json!({ "name": 5 }))).await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert!(wrong_type.body["error"].is_string());

    let not_json = Request::builder()
      .method("POST")
      .uri("/api/login")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let resp = router(state).oneshot(not_json).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn duplicate_registration_is_409() {
    let state = make_state().await;
    register(&state, "alice").await;

    let reply = send(
      &state,
      "POST",
      "/api/register",
      None,
      Some(json!({ "username": "alice", "password": "other" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body, json!({ "error": "account already exists" }));
  }

  #[tokio::test]
  async fn blank_registration_is_400() {
    let state = make_state().await;
    let reply = send(
      &state,
      "POST",
      "/api/register",
      None,
      Some(json!({ "username": "   ", "password": "pw" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn bad_login_looks_the_same_for_wrong_password_and_unknown_user() {
    let state = make_state().await;
    register(&state, "alice").await;

    let wrong_password = send(
      &state,
      "POST",
      "/api/login",
      None,
      Some(json!({ "username": "alice", "password": "nope" })),
    )
    .await;
    let unknown_user = send(
      &state,
      "POST",
      "/api/login",
      None,
      Some(json!({ "username": "mallory", "password": "pw-for-tests" })),
    )
    .await;

    assert_unauthorized(&wrong_password);
    assert_unauthorized(&unknown_user);
  }

  // ── Authentication middleware ───────────────────────────────────────────────

  #[tokio::test]
  async fn every_token_failure_is_the_same_401() {
    let state = make_state().await;
    let token = register(&state, "alice").await;
    let me = send(&state, "GET", "/api/me", Some(&token), None).await;
    let account_id = me.body["account"]["account_id"].as_str().unwrap().to_owned();

    let expired = jsonwebtoken::encode(
      &jsonwebtoken::Header::new(Algorithm::HS256),
      &json!({
        "sub": account_id,
        "exp": (chrono::Utc::now() - TimeDelta::minutes(5)).timestamp(),
      }),
      &jsonwebtoken::EncodingKey::from_secret(SECRET),
    )
    .unwrap();
    let foreign_key =
      TokenService::new(b"some-other-secret", Algorithm::HS256, TimeDelta::minutes(5))
        .unwrap()
        .issue(&account_id)
        .unwrap();
    let unknown_subject = state.tokens.issue(&Uuid::new_v4().to_string()).unwrap();
    let non_uuid_subject = state.tokens.issue("alice").unwrap();

    // Missing header.
    assert_unauthorized(&send(&state, "GET", "/api/contacts", None, None).await);

    for bad in [
      "garbage",
      expired.as_str(),
      foreign_key.as_str(),
      unknown_subject.as_str(),
      non_uuid_subject.as_str(),
    ] {
      assert_unauthorized(&send(&state, "GET", "/api/contacts", Some(bad), None).await);
    }

    // The real token still works.
    let ok = send(&state, "GET", "/api/contacts", Some(&token), None).await;
    assert_eq!(ok.status, StatusCode::OK);
  }

  #[tokio::test]
  async fn non_bearer_scheme_counts_as_missing() {
    let state = make_state().await;
    let req = Request::builder()
      .uri("/api/contacts")
      .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
      .body(Body::empty())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn me_is_optional_but_rejects_bad_tokens() {
    let state = make_state().await;

    let anonymous = send(&state, "GET", "/api/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
    assert_eq!(anonymous.body, json!({ "account": null }));

    assert_unauthorized(&send(&state, "GET", "/api/me", Some("garbage"), None).await);
  }

  // ── Contacts ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn contact_lifecycle() {
    let state = make_state().await;
    let token = register(&state, "alice").await;

    let mom = add_contact(&state, &token, "Mom").await;
    assert_eq!(mom["name"], "Mom");
    assert!(mom["last_called"].is_null());
    let id = mom["contact_id"].as_str().unwrap().to_owned();

    let listed = send(&state, "GET", "/api/contacts", Some(&token), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body, json!([mom]));

    let called = send(
      &state,
      "POST",
      &format!("/api/contacts/{id}/called"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(called.status, StatusCode::OK);
    assert!(called.body["last_called"].is_string());

    let uri = format!("/api/contacts/{id}");
    let first = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body, json!({ "success": true }));

    let second = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);

    let listed = send(&state, "GET", "/api/contacts", Some(&token), None).await;
    assert_eq!(listed.body, json!([]));
  }

  #[tokio::test]
  async fn list_puts_never_called_first() {
    let state = make_state().await;
    let token = register(&state, "alice").await;

    add_contact(&state, &token, "A").await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    add_contact(&state, &token, "B").await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let c = add_contact(&state, &token, "C").await;
    let c_id = c["contact_id"].as_str().unwrap();
    send(&state, "POST", &format!("/api/contacts/{c_id}/called"), Some(&token), None).await;

    let listed = send(&state, "GET", "/api/contacts", Some(&token), None).await;
    let names: Vec<&str> = listed
      .body
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["name"].as_str().unwrap())
      .collect();
    assert_eq!(names, ["B", "A", "C"]);
  }

  #[tokio::test]
  async fn other_accounts_cannot_see_or_touch_contacts() {
    let state = make_state().await;
    let alice = register(&state, "alice").await;
    let bob = register(&state, "bob").await;

    let mom = add_contact(&state, &alice, "Mom").await;
    let id = mom["contact_id"].as_str().unwrap();

    let bobs_list = send(&state, "GET", "/api/contacts", Some(&bob), None).await;
    assert_eq!(bobs_list.body, json!([]));

    let called =
      send(&state, "POST", &format!("/api/contacts/{id}/called"), Some(&bob), None).await;
    assert_eq!(called.status, StatusCode::NOT_FOUND);

    let deleted = send(&state, "DELETE", &format!("/api/contacts/{id}"), Some(&bob), None).await;
    assert_eq!(deleted.status, StatusCode::NOT_FOUND);

    // Same response as for a contact that never existed.
    let missing = Uuid::new_v4();
    let never =
      send(&state, "DELETE", &format!("/api/contacts/{missing}"), Some(&bob), None).await;
    assert_eq!(never.status, deleted.status);

    let alices_list = send(&state, "GET", "/api/contacts", Some(&alice), None).await;
    assert_eq!(alices_list.body, json!([mom]));
  }

  #[tokio::test]
  async fn malformed_contact_ref_is_404() {
    let state = make_state().await;
    let token = register(&state, "alice").await;
    let reply =
      send(&state, "POST", "/api/contacts/not-a-uuid/called", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn blank_contact_name_is_400() {
    let state = make_state().await;
    let token = register(&state, "alice").await;
    let reply =
      send(&state, "POST", "/api/contacts", Some(&token), Some(json!({ "name": "  " }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
  }
}
