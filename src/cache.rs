//! Persistent artifact cache.
//!
//! Thumbnail decoding and encoding dominate the cost of rendering a page, and
//! the gallery rescans the whole tree on every request. This module keeps the
//! derived artifact for every item (its rendered HTML fragment, thumbnail
//! inlined) in a SQLite file so a rescan only pays for files that changed.
//!
//! # Design
//!
//! ## Records
//!
//! One table, one row per content key:
//!
//! ```text
//! items
//! ├── key    TEXT PRIMARY KEY   content key (see crate::keys)
//! ├── data   BLOB NOT NULL      opaque payload
//! └── mtime  INTEGER NOT NULL   source mtime the payload was derived from
//! ```
//!
//! The payload is plain bytes. The cache never interprets it; whoever owns a
//! key knows what its payload means.
//!
//! ## Staleness
//!
//! A record is served only when its stored `mtime` equals the mtime the
//! caller observed on disk. Any difference, newer or older, regenerates the
//! payload and overwrites the row in place with a single upsert.
//!
//! ## Schema
//!
//! There is no schema versioning. [`ArtifactCache::create`] attempts the
//! `CREATE TABLE` on every startup and treats "already exists" as success.
//!
//! ## Concurrency
//!
//! A cache handle wraps one SQLite connection and is used by one request at a
//! time. Concurrent requests open their own handles; SQLite serialises the
//! writers, and a busy connection waits up to the configured timeout. Two
//! requests may regenerate the same stale key at once. Both write the same
//! bytes, so the race is harmless.

use rusqlite::{Connection, OptionalExtension, params};
use std::cell::Cell;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default time a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A stored artifact and the source modification time it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub data: Vec<u8>,
    pub mtime: i64,
}

/// Key → (bytes, mtime) store backed by a SQLite file.
pub struct ArtifactCache {
    conn: Connection,
    stats: Cell<CacheStats>,
}

impl ArtifactCache {
    /// Open the database and make sure the `items` table exists.
    ///
    /// Called once at startup. An existing table is left untouched.
    pub fn create(db_path: &Path, busy_timeout: Duration) -> Result<Self, CacheError> {
        let cache = Self::open(db_path, busy_timeout)?;
        cache.create_table()?;
        Ok(cache)
    }

    /// Open a connection to an already-initialised database.
    pub fn open(db_path: &Path, busy_timeout: Duration) -> Result<Self, CacheError> {
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(busy_timeout)?;
        Ok(Self {
            conn,
            stats: Cell::new(CacheStats::default()),
        })
    }

    /// In-memory cache, gone when dropped. Used by tests and dry runs.
    pub fn in_memory() -> Result<Self, CacheError> {
        let cache = Self {
            conn: Connection::open_in_memory()?,
            stats: Cell::new(CacheStats::default()),
        };
        cache.create_table()?;
        Ok(cache)
    }

    fn create_table(&self) -> Result<(), CacheError> {
        let result = self.conn.execute(
            "CREATE TABLE items (
                key   TEXT PRIMARY KEY,
                data  BLOB NOT NULL,
                mtime INTEGER NOT NULL
            )",
            [],
        );
        match result {
            Ok(_) => {
                tracing::debug!("created cache table");
                Ok(())
            }
            // Reported as `SqlInputError` or `SqliteFailure` depending on
            // the SQLite build; both carry the same message.
            Err(e) if e.to_string().contains("already exists") => {
                tracing::debug!("cache table already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up the record for `key`. No side effects.
    pub fn get(&self, key: &str) -> Result<Option<CacheRecord>, CacheError> {
        let record = self
            .conn
            .query_row(
                "SELECT data, mtime FROM items WHERE key = ?1",
                params![key],
                |row| {
                    Ok(CacheRecord {
                        data: row.get(0)?,
                        mtime: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Insert or replace the record for `key` in a single statement.
    ///
    /// The connection is in autocommit mode, so the row is durable once this
    /// returns.
    pub fn put(&self, key: &str, data: &[u8], mtime: i64) -> Result<(), CacheError> {
        self.conn.execute(
            "INSERT INTO items (key, data, mtime) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data, mtime = excluded.mtime",
            params![key, data, mtime],
        )?;
        Ok(())
    }

    /// Return the cached payload for `key` if it was built from
    /// `expected_mtime`; otherwise run `generate`, store its output under
    /// `expected_mtime`, and return it.
    ///
    /// Errors from `generate` are returned as-is and nothing is stored.
    pub fn get_or_generate<F, E>(
        &self,
        key: &str,
        expected_mtime: i64,
        generate: F,
    ) -> Result<Vec<u8>, E>
    where
        F: FnOnce() -> Result<Vec<u8>, E>,
        E: From<CacheError>,
    {
        if let Some(record) = self.get(key)?
            && record.mtime == expected_mtime
        {
            self.record(CacheStats::hit);
            tracing::debug!(key, mtime = expected_mtime, "cache hit");
            return Ok(record.data);
        }

        self.record(CacheStats::miss);
        tracing::debug!(key, mtime = expected_mtime, "cache miss, generating");
        let data = generate()?;
        self.put(key, &data, expected_mtime)?;
        Ok(data)
    }

    /// Hits and misses served by this handle so far.
    pub fn stats(&self) -> CacheStats {
        self.stats.get()
    }

    fn record(&self, update: fn(&mut CacheStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

/// Summary of cache behaviour for one scan/render cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} generated ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} generated", self.misses)
        }
    }
}
