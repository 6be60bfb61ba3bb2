//! Persistent on-disk cache for mark payloads.
//!
//! Payloads are kept in a small SQLite file keyed by mark code. Expired
//! entries are not removed on lookup: they are still handed back (flagged as
//! stale) so the fetcher can fall back to them when the source is down.
//!
//! Every operation is best-effort. Storage failures are logged and treated
//! as a cache miss or a no-op, never returned to the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, warn};

use crate::domain::MarkCode;

/// Default cache file name, created in the user's home directory.
const DEFAULT_FILE_NAME: &str = ".gdbjsoncache";

/// Default expiry: 6 hours.
const DEFAULT_EXPIRY: Duration = Duration::from_secs(6 * 60 * 60);

/// Timestamp layout in the `cachedate` column (matches SQLite `datetime()`).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How long to wait for another process holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS gdb_json(
    code VARCHAR(4) NOT NULL PRIMARY KEY,
    cachedate DATETIME NOT NULL,
    json TEXT NOT NULL
)";

/// The default cache file, `~/.gdbjsoncache`.
///
/// Falls back to the current directory when there is no home directory.
pub fn default_cache_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_FILE_NAME)
}

/// Configuration for the persistent cache.
#[derive(Debug, Clone)]
pub struct FileCacheConfig {
    /// Path to the SQLite cache file.
    pub path: PathBuf,
    /// How long a cached payload is considered fresh.
    pub expiry: Duration,
    /// Whether the cache is used at all.
    pub enabled: bool,
    /// Delete expired entries when the cache is configured.
    pub purge_on_init: bool,
}

impl FileCacheConfig {
    /// Create a config for the given file with the default expiry (6 hours).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            expiry: DEFAULT_EXPIRY,
            enabled: true,
            purge_on_init: false,
        }
    }

    /// Set a custom expiry.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Set the expiry in whole hours.
    pub fn with_expiry_hours(self, hours: u64) -> Self {
        self.with_expiry(Duration::from_secs(hours.saturating_mul(60 * 60)))
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_purge_on_init(mut self, purge: bool) -> Self {
        self.purge_on_init = purge;
        self
    }
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self::new(default_cache_path())
    }
}

/// A payload read back from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPayload {
    /// Raw JSON text as returned by the source.
    pub payload: String,
    /// When the payload was stored.
    pub cached_at: DateTime<Utc>,
    /// Whether the entry is younger than the configured expiry.
    pub is_fresh: bool,
}

/// SQLite-backed persistent cache.
#[derive(Debug, Clone)]
pub struct FileCache {
    config: FileCacheConfig,
}

impl FileCache {
    /// Set up the cache, purging expired entries first if the config asks.
    pub fn configure(config: FileCacheConfig) -> Self {
        let cache = Self { config };
        if cache.config.enabled && cache.config.purge_on_init {
            let purged = cache.purge_expired();
            debug!(purged, path = %cache.path().display(), "purged expired cache entries");
        }
        cache
    }

    /// Look up a cached payload.
    ///
    /// Returns `None` on a miss, when the cache is disabled, or when the
    /// cache file cannot be read. Stale entries are returned with
    /// `is_fresh = false`.
    pub fn lookup(&self, code: &MarkCode) -> Option<CachedPayload> {
        if !self.config.enabled || !self.config.path.exists() {
            return None;
        }

        match self.try_lookup(code) {
            Ok(found) => found,
            Err(e) => {
                warn!(%code, error = %e, "persistent cache lookup failed");
                None
            }
        }
    }

    /// Save a payload with the current time.
    pub fn store(&self, code: &MarkCode, payload: &str) {
        self.store_at(code, payload, Utc::now());
    }

    /// Delete entries older than the expiry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        if !self.config.enabled || !self.config.path.exists() {
            return 0;
        }

        let Some(cutoff) = chrono::Duration::from_std(self.config.expiry)
            .ok()
            .and_then(|expiry| Utc::now().checked_sub_signed(expiry))
        else {
            return 0;
        };

        match self.try_purge(cutoff) {
            Ok(purged) => purged,
            Err(e) => {
                warn!(error = %e, "persistent cache purge failed");
                0
            }
        }
    }

    /// Whether the cache is in use.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the cache expiry.
    pub fn expiry(&self) -> Duration {
        self.config.expiry
    }

    fn store_at(&self, code: &MarkCode, payload: &str, at: DateTime<Utc>) {
        if !self.config.enabled {
            return;
        }

        if let Err(e) = self.try_store(code, payload, at) {
            warn!(%code, error = %e, "persistent cache write failed");
        }
    }

    fn try_lookup(&self, code: &MarkCode) -> rusqlite::Result<Option<CachedPayload>> {
        let conn = Connection::open_with_flags(&self.config.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT json, cachedate FROM gdb_json WHERE code = ?1",
                params![code.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(row.map(|(payload, cachedate)| {
            let cached_at = parse_timestamp(&cachedate);
            CachedPayload {
                is_fresh: self.is_fresh(cached_at),
                payload,
                cached_at: cached_at.unwrap_or(DateTime::<Utc>::MIN_UTC),
            }
        }))
    }

    fn try_store(&self, code: &MarkCode, payload: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&self.config.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute(CREATE_TABLE_SQL, [])?;
        conn.execute(
            "INSERT OR REPLACE INTO gdb_json(code, cachedate, json) VALUES (?1, ?2, ?3)",
            params![code.to_string(), format_timestamp(at), payload],
        )?;

        Ok(())
    }

    fn try_purge(&self, cutoff: DateTime<Utc>) -> rusqlite::Result<usize> {
        let conn = Connection::open(&self.config.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute(CREATE_TABLE_SQL, [])?;
        conn.execute(
            "DELETE FROM gdb_json WHERE cachedate < ?1",
            params![format_timestamp(cutoff)],
        )
    }

    /// Unreadable timestamps are treated as stale.
    fn is_fresh(&self, cached_at: Option<DateTime<Utc>>) -> bool {
        let Some(cached_at) = cached_at else {
            return false;
        };
        // A timestamp in the future counts as just written
        let age = (Utc::now() - cached_at).to_std().unwrap_or(Duration::ZERO);
        age < self.config.expiry
    }
}

#[derive(Debug, thiserror::Error)]
enum StoreError {
    #[error("failed to create cache directory: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
