//! Signed bearer tokens.
//!
//! Tokens are JWTs carrying `sub` (the account UUID as a string), `iat` and
//! `exp`. [`TokenService::validate`] only checks the signature and shape;
//! expiry and subject presence are checked by the caller through
//! [`TokenClaims::check`] so each failure can be told apart in logs.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ringback_core::AuthError;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default token lifetime: 52 weeks.
pub const DEFAULT_TTL_MINUTES: i64 = 60 * 24 * 7 * 52;

/// Wire form of the JWT payload. Every field is optional so that a
/// well-signed token with missing claims still decodes and is rejected by
/// [`TokenClaims::check`] with the right reason.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  sub: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  exp: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  iat: Option<i64>,
}

/// Claims recovered from a token whose signature verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
  pub subject:    Option<String>,
  pub expires_at: Option<DateTime<Utc>>,
}

impl TokenClaims {
  /// Enforce expiry and subject presence as of `now`.
  ///
  /// Returns the subject on success.
  pub fn check(&self, now: DateTime<Utc>) -> Result<&str, AuthError> {
    match self.expires_at {
      Some(exp) if exp > now => {}
      _ => return Err(AuthError::Expired),
    }
    match self.subject.as_deref() {
      Some(sub) if !sub.is_empty() => Ok(sub),
      _ => Err(AuthError::InvalidCredentials),
    }
  }
}

/// Issues and validates HMAC-signed tokens under one server secret.
#[derive(Clone)]
pub struct TokenService {
  algorithm:  Algorithm,
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        TimeDelta,
}

impl TokenService {
  /// Build a service for `secret` signed with `algorithm`.
  ///
  /// Only the HMAC family is accepted since the key is a shared secret. The
  /// lifetime must be positive and must not push expiry past what a
  /// timestamp can hold.
  pub fn new(secret: &[u8], algorithm: Algorithm, ttl: TimeDelta) -> Result<Self> {
    if secret.is_empty() {
      return Err(Error::EmptySecret);
    }
    if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
      return Err(Error::UnsupportedAlgorithm(algorithm));
    }
    if ttl <= TimeDelta::zero() || Utc::now().checked_add_signed(ttl).is_none() {
      return Err(Error::InvalidTtl(ttl));
    }

    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    Ok(Self {
      algorithm,
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
      ttl,
    })
  }

  /// Issue a token for `subject` expiring one TTL from now.
  pub fn issue(&self, subject: &str) -> Result<String> {
    let now = Utc::now();
    let expires_at = now
      .checked_add_signed(self.ttl)
      .ok_or(Error::InvalidTtl(self.ttl))?;
    let claims = Claims {
      sub: Some(subject.to_owned()),
      exp: Some(expires_at.timestamp()),
      iat: Some(now.timestamp()),
    };
    Ok(jsonwebtoken::encode(
      &Header::new(self.algorithm),
      &claims,
      &self.encoding,
    )?)
  }

  /// Verify the signature of `token` and decode its claims.
  pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
    let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
      .map_err(|e| {
        tracing::debug!(error = %e, "token failed to decode");
        AuthError::InvalidToken
      })?;

    let expires_at = match data.claims.exp {
      Some(exp) => Some(DateTime::from_timestamp(exp, 0).ok_or(AuthError::InvalidToken)?),
      None => None,
    };

    Ok(TokenClaims { subject: data.claims.sub, expires_at })
  }
}
