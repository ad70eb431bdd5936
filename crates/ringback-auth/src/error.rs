//! Error type for `ringback-auth`.

use jsonwebtoken::Algorithm;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("password hashing failed: {0}")]
  Hash(String),

  #[error("token encoding failed: {0}")]
  Encode(#[from] jsonwebtoken::errors::Error),

  #[error("signing secret must not be empty")]
  EmptySecret,

  #[error("token lifetime {0} must be positive and representable")]
  InvalidTtl(chrono::TimeDelta),

  #[error("unsupported signing algorithm {0:?}; expected HS256, HS384 or HS512")]
  UnsupportedAlgorithm(Algorithm),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
