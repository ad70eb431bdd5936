//! Contact repository.
//!
//! Every statement filters on the owning account. A contact that belongs to
//! someone else is indistinguishable from one that does not exist.

use ringback_core::contact::Contact;
use rusqlite::{Connection, OptionalExtension as _};
use uuid::Uuid;

use crate::{
  Result,
  encode::{self, CONTACT_COLUMNS, RawContact, encode_dt, encode_uuid},
};

/// All of `owner`'s contacts, most in need of a call first.
///
/// Never-called contacts lead, newest first; called contacts follow, least
/// recently called first.
pub fn list(conn: &Connection, owner: Uuid) -> Result<Vec<Contact>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {CONTACT_COLUMNS}
     FROM contact
     WHERE account_id = ?1
     ORDER BY last_called IS NOT NULL,
              CASE WHEN last_called IS NULL THEN created_at END DESC,
              last_called ASC,
              id"
  ))?;

  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(owner)], RawContact::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawContact::into_contact).collect()
}

/// Add a never-called contact named `name` for `owner`.
pub fn create(conn: &Connection, owner: Uuid, name: &str) -> Result<Contact> {
  let now = encode::now();
  let contact = Contact {
    contact_id:  Uuid::new_v4(),
    account_id:  owner,
    name:        name.to_owned(),
    last_called: None,
    created_at:  now,
    updated_at:  now,
  };

  conn.execute(
    "INSERT INTO contact (id, account_id, name, last_called, created_at, updated_at)
     VALUES (?1, ?2, ?3, NULL, ?4, ?4)",
    rusqlite::params![
      encode_uuid(contact.contact_id),
      encode_uuid(owner),
      name,
      encode_dt(now),
    ],
  )?;

  Ok(contact)
}

/// Record a call to contact `id` at the current time.
///
/// Returns `None`, without touching anything, if `owner` has no such contact.
/// `last_called` never moves backwards, even if the wall clock does.
pub fn mark_called(conn: &Connection, owner: Uuid, id: Uuid) -> Result<Option<Contact>> {
  let raw = conn
    .query_row(
      &format!(
        "UPDATE contact
         SET last_called = max(coalesce(last_called, ?1), ?1),
             updated_at  = ?1
         WHERE id = ?2 AND account_id = ?3
         RETURNING {CONTACT_COLUMNS}"
      ),
      rusqlite::params![encode_dt(encode::now()), encode_uuid(id), encode_uuid(owner)],
      RawContact::from_row,
    )
    .optional()?;

  raw.map(RawContact::into_contact).transpose()
}

/// Delete contact `id`. `true` iff exactly one of `owner`'s rows was removed.
pub fn delete(conn: &Connection, owner: Uuid, id: Uuid) -> Result<bool> {
  let removed = conn.execute(
    "DELETE FROM contact WHERE id = ?1 AND account_id = ?2",
    rusqlite::params![encode_uuid(id), encode_uuid(owner)],
  )?;
  Ok(removed == 1)
}
