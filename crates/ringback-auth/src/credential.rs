//! argon2 password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$…`), so the salt and
//! parameters travel with the hash and verification needs nothing else.

use std::sync::LazyLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

/// Hash used to burn a verification when the username does not exist.
static ABSENT_HASH: LazyLock<Option<String>> =
  LazyLock::new(|| hash_password("ringback:no-such-account").ok());

/// Hash `password` with a freshly generated salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// Check `password` against a stored PHC string.
///
/// A hash that cannot be parsed is treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Build the hash [`verify_absent`] checks against.
///
/// Call once at startup so the first unknown-username login does not also pay
/// for hashing. Returns `false` if the hash could not be built, in which case
/// unknown usernames are rejected without the matching work.
pub fn warm_up() -> bool { LazyLock::force(&ABSENT_HASH).is_some() }

/// Spend one verification's worth of work and report a mismatch.
///
/// Called when a login names an account that does not exist, so that an
/// unknown username costs the same as a wrong password.
pub fn verify_absent(password: &str) -> bool {
  if let Some(hash) = ABSENT_HASH.as_deref() {
    let _ = verify_password(password, hash);
  }
  false
}
