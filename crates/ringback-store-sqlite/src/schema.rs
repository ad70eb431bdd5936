//! SQL schema for the Ringback SQLite store.
//!
//! Executed once when the pool is opened. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS account (
    id          TEXT PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- One hash per account, written in the same transaction as the account row.
CREATE TABLE IF NOT EXISTS credential (
    account_id     TEXT NOT NULL UNIQUE REFERENCES account(id) ON DELETE CASCADE,
    password_hash  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contact (
    id           TEXT PRIMARY KEY,
    account_id   TEXT NOT NULL REFERENCES account(id) ON DELETE CASCADE,
    name         TEXT NOT NULL,
    last_called  TEXT,            -- NULL until the first call event
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS contact_account_idx ON contact(account_id);

PRAGMA user_version = 1;
";

/// Applied to every pooled connection as it is opened.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
";
