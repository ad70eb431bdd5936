//! [`Database`] — the process-wide SQLite connection pool.

use std::{path::Path, time::Duration};

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::{
  Error, Result,
  schema::{CONNECTION_PRAGMAS, SCHEMA},
};

/// How long a writer waits on SQLite's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Pool sizing ──────────────────────────────────────────────────────────────

/// Bounds for the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
  /// Connections kept open while idle.
  pub min_size: u32,
  /// Hard cap on concurrently checked-out connections.
  pub max_size: u32,
}

impl Default for PoolConfig {
  fn default() -> Self { Self { min_size: 10, max_size: 20 } }
}

impl PoolConfig {
  fn validate(self) -> Result<Self> {
    if self.max_size == 0 || self.min_size > self.max_size {
      return Err(Error::PoolSize { min: self.min_size, max: self.max_size });
    }
    Ok(self)
  }
}

// ─── Database ─────────────────────────────────────────────────────────────────

/// A bounded pool of SQLite connections.
///
/// Opened once at startup and cloned into request state; clones share the
/// same pool. Work is submitted through [`Database::run`], which holds exactly
/// one connection for the duration of the closure and returns it to the pool
/// afterwards, whether the closure succeeded or not.
#[derive(Clone)]
pub struct Database {
  pool: r2d2::Pool<SqliteConnectionManager>,
}

impl Database {
  /// Open (or create) a database file at `path` and run schema
  /// initialisation.
  pub async fn open(path: impl AsRef<Path>, config: PoolConfig) -> Result<Self> {
    let config = config.validate()?;
    let manager = SqliteConnectionManager::file(path.as_ref());
    let pool = tokio::task::spawn_blocking(move || {
      r2d2::Pool::builder()
        .min_idle(Some(config.min_size))
        .max_size(config.max_size)
        .build(with_pragmas(manager))
    })
    .await??;

    let db = Self { pool };
    db.init_schema().await?;
    Ok(db)
  }

  /// Open an in-memory database — useful for testing.
  ///
  /// Every SQLite `:memory:` connection is a separate database, so the pool
  /// is pinned to a single connection that is never recycled or health
  /// checked: a replacement would come up empty.
  pub async fn open_in_memory() -> Result<Self> {
    let manager = SqliteConnectionManager::memory();
    let pool = tokio::task::spawn_blocking(move || {
      r2d2::Pool::builder()
        .min_idle(Some(1))
        .max_size(1)
        .max_lifetime(None)
        .idle_timeout(None)
        .test_on_check_out(false)
        .build(with_pragmas(manager))
    })
    .await??;

    let db = Self { pool };
    db.init_schema().await?;
    Ok(db)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .run(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run `f` against one pooled connection on the blocking thread pool.
  pub async fn run<F, T>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let pool = self.pool.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = pool.get()?;
      f(&mut conn)
    })
    .await?
  }

  /// Current connection counts.
  pub fn state(&self) -> r2d2::State { self.pool.state() }

  /// Release this handle at shutdown.
  ///
  /// Connections close once the last clone of the pool is dropped; by the
  /// time the server has drained, this is normally that last clone.
  pub fn close(self) {
    let state = self.state();
    tracing::info!(
      connections = state.connections,
      idle = state.idle_connections,
      "closing database pool"
    );
    drop(self.pool);
  }
}

fn with_pragmas(manager: SqliteConnectionManager) -> SqliteConnectionManager {
  manager.with_init(|conn| {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch(CONNECTION_PRAGMAS)
  })
}
