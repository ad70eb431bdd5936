//! Password hashing and bearer-token handling for Ringback.
//!
//! Neither module does any I/O; both are safe to call from any number of
//! tasks at once.

pub mod credential;
pub mod error;
pub mod token;

pub use error::{Error, Result};
pub use token::{TokenClaims, TokenService};
