//! Account repository.
//!
//! Every function takes the connection it should run on. Callers normally get
//! one from [`Database::run`](crate::Database::run).

use ringback_auth::credential;
use ringback_core::account::Account;
use rusqlite::{Connection, OptionalExtension as _};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{self, ACCOUNT_COLUMNS, RawAccount, encode_dt, encode_uuid},
};

/// Register `username` with `password`.
///
/// The account row and its credential row are written in one transaction.
/// A taken username is reported as [`Error::DuplicateUser`], detected from the
/// `UNIQUE` constraint rather than checked up front.
pub fn create(conn: &mut Connection, username: &str, password: &str) -> Result<Account> {
  let password_hash = credential::hash_password(password)?;
  let now = encode::now();
  let account = Account {
    account_id: Uuid::new_v4(),
    username:   username.to_owned(),
    created_at: now,
    updated_at: now,
  };

  let id_str = encode_uuid(account.account_id);
  let at_str = encode_dt(now);

  let tx = conn.transaction()?;
  tx.execute(
    "INSERT INTO account (id, username, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
    rusqlite::params![id_str, username, at_str],
  )
  .map_err(unique_violation)?;
  tx.execute(
    "INSERT INTO credential (account_id, password_hash) VALUES (?1, ?2)",
    rusqlite::params![id_str, password_hash],
  )?;
  tx.commit()?;

  Ok(account)
}

/// Look up an account by its id. `None` if there is no such account.
pub fn find_by_id(conn: &Connection, id: Uuid) -> Result<Option<Account>> {
  let raw = conn
    .query_row(
      &format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawAccount::from_row,
    )
    .optional()?;

  raw.map(RawAccount::into_account).transpose()
}

/// Resolve `username` and check `password` against its stored hash.
///
/// An unknown username and a wrong password both yield `None`, and both run
/// one full hash verification.
pub fn authenticate(
  conn: &Connection,
  username: &str,
  password: &str,
) -> Result<Option<Account>> {
  let row = conn
    .query_row(
      "SELECT a.id, a.username, a.created_at, a.updated_at, c.password_hash
       FROM account a
       JOIN credential c ON c.account_id = a.id
       WHERE a.username = ?1",
      rusqlite::params![username],
      |row| Ok((RawAccount::from_row(row)?, row.get::<_, String>(4)?)),
    )
    .optional()?;

  let Some((raw, hash)) = row else {
    credential::verify_absent(password);
    return Ok(None);
  };

  if credential::verify_password(password, &hash) {
    raw.into_account().map(Some)
  } else {
    Ok(None)
  }
}

fn unique_violation(e: rusqlite::Error) -> Error {
  match e {
    rusqlite::Error::SqliteFailure(ref f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
    {
      Error::DuplicateUser
    }
    e => Error::Database(e),
  }
}
