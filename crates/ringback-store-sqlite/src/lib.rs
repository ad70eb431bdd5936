//! SQLite backend for Ringback.
//!
//! [`Database`] owns a bounded [`r2d2`] pool and runs each unit of work on a
//! blocking thread with one pooled connection. The [`accounts`] and
//! [`contacts`] repositories are plain functions over an explicit
//! [`rusqlite::Connection`], so a caller decides exactly which connection or
//! transaction they run against.

mod database;
mod encode;
mod schema;

pub mod accounts;
pub mod contacts;
pub mod error;

pub use database::{Database, PoolConfig};
pub use error::{Error, Result};
