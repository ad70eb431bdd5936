//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings. Timestamps are stored as
//! RFC 3339 UTC with a fixed six fractional digits, so that comparing the
//! strings orders them chronologically and `ORDER BY` works on the raw
//! column.

use chrono::{DateTime, SecondsFormat, Timelike as _, Utc};
use ringback_core::{account::Account, contact::Contact};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current instant, truncated to what survives a round-trip through
/// [`encode_dt`].
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  now
    .with_nanosecond(now.timestamp_subsec_micros() * 1_000)
    .unwrap_or(now)
}

// ─── Raw row types ────────────────────────────────────────────────────────────

/// Columns selected for an account, in this order.
pub const ACCOUNT_COLUMNS: &str = "id, username, created_at, updated_at";

/// An `account` row before decoding.
pub struct RawAccount {
  pub id:         String,
  pub username:   String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      username:   row.get(1)?,
      created_at: row.get(2)?,
      updated_at: row.get(3)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id: decode_uuid(&self.id)?,
      username:   self.username,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Columns selected for a contact, in this order.
pub const CONTACT_COLUMNS: &str =
  "id, account_id, name, last_called, created_at, updated_at";

/// A `contact` row before decoding.
pub struct RawContact {
  pub id:          String,
  pub account_id:  String,
  pub name:        String,
  pub last_called: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      account_id:  row.get(1)?,
      name:        row.get(2)?,
      last_called: row.get(3)?,
      created_at:  row.get(4)?,
      updated_at:  row.get(5)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:  decode_uuid(&self.id)?,
      account_id:  decode_uuid(&self.account_id)?,
      name:        self.name,
      last_called: self.last_called.as_deref().map(decode_dt).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}
