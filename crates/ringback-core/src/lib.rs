//! Core types for Ringback.
//!
//! This crate is deliberately free of HTTP, crypto, and database
//! dependencies. Every other crate in the workspace depends on it.

pub mod account;
pub mod contact;
pub mod error;

pub use error::AuthError;
