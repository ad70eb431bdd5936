//! Authentication failure taxonomy shared by the token service and the HTTP
//! layer.

use thiserror::Error;

/// Why a caller could not be authenticated.
///
/// The variants are kept distinct for logging only. On the wire every one of
/// them becomes the same `401`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
  /// No bearer token on a request that requires one.
  #[error("missing credentials")]
  MissingCredentials,

  /// Signature mismatch or an undecodable payload.
  #[error("invalid token")]
  InvalidToken,

  /// The token carried no expiry, or the expiry has passed.
  #[error("token expired")]
  Expired,

  /// Bad username/password, or a token subject that does not resolve to an
  /// account.
  #[error("invalid credentials")]
  InvalidCredentials,
}
