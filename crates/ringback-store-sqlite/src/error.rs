//! Error type for `ringback-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("connection pool error: {0}")]
  Pool(#[from] r2d2::Error),

  #[error("blocking task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  #[error("credential error: {0}")]
  Credential(#[from] ringback_auth::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("invalid pool size: min {min} exceeds max {max}, or max is zero")]
  PoolSize { min: u32, max: u32 },

  /// The username is already registered. Carries no detail on purpose.
  #[error("account already exists")]
  DuplicateUser,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
