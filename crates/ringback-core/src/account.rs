//! Account — the owner of a contact list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// `account_id` is assigned at registration and never changes; it is the only
/// key used to scope owned data and the subject of issued tokens. The password
/// hash lives in a separate table and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub account_id: Uuid,
  pub username:   String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
