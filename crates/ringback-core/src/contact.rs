//! Contact — a "loved one" the account owner wants to keep calling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single contact owned by exactly one account.
///
/// `last_called` starts out `None` and is only ever set to the current time
/// by a call event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub contact_id:  Uuid,
  pub account_id:  Uuid,
  pub name:        String,
  pub last_called: Option<DateTime<Utc>>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}
