//! Mark lookup with in-memory and persistent caching.
//!
//! Resolution order for a mark:
//!
//! 1. the in-memory cache (when the cache mode allows it), whose entries are
//!    never stale for the lifetime of the fetcher;
//! 2. the persistent cache, if configured, used directly when fresh;
//! 3. the mark source (web service or database);
//! 4. a stale persistent-cache payload, if the source failed.
//!
//! Only one source call is made per lookup. There is no retry.

use std::sync::Arc;

use moka::sync::Cache as MokaCache;
use tracing::{debug, info, warn};

use crate::domain::{MarkCode, MarkRecord};
use crate::file_cache::{FileCache, FileCacheConfig};
use crate::gdb::{
    DatabaseConfig, DatabaseSource, GdbError, HttpSource, HttpSourceConfig, MarkSource,
    SourceError,
};

/// Which caches a lookup may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Skip the in-memory cache. A configured persistent cache is still used.
    NoCache,
    /// Use the in-memory cache, and the persistent cache if configured.
    #[default]
    Memory,
    /// Use both caches, enabling the persistent cache with default settings
    /// if it is not already enabled.
    Persistent,
}

impl CacheMode {
    fn uses_memory(self) -> bool {
        !matches!(self, CacheMode::NoCache)
    }
}

/// Looks up geodetic marks.
///
/// Holds the active source and both caches, so independent fetchers (with
/// different sources or cache files) can coexist in one process.
pub struct MarkFetcher {
    source: Box<dyn MarkSource>,
    memory: MokaCache<MarkCode, Arc<MarkRecord>>,
    file_cache: Option<FileCache>,
}

impl MarkFetcher {
    /// Create a fetcher for the public web service with no persistent cache.
    pub fn new() -> Result<Self, SourceError> {
        let source = HttpSource::new(HttpSourceConfig::default())?;
        Ok(Self::with_source(Box::new(source)))
    }

    /// Create a fetcher that reads from the given source.
    pub fn with_source(source: Box<dyn MarkSource>) -> Self {
        Self {
            source,
            memory: MokaCache::builder().build(),
            file_cache: None,
        }
    }

    /// Use a persistent cache, replacing any existing one.
    pub fn set_cached(&mut self, config: FileCacheConfig) {
        debug!(
            path = %config.path.display(),
            expiry_secs = config.expiry.as_secs(),
            enabled = config.enabled,
            "configuring persistent cache"
        );
        self.file_cache = Some(FileCache::configure(config));
    }

    /// Stop using the persistent cache.
    pub fn disable_cached(&mut self) {
        self.file_cache = None;
    }

    /// The persistent cache, if one is configured.
    pub fn file_cache(&self) -> Option<&FileCache> {
        self.file_cache.as_ref()
    }

    /// Read marks straight from the database instead of the web service.
    ///
    /// Any previous source (including an earlier database connection) is
    /// dropped. On failure the current source is kept.
    pub fn set_database(&mut self, config: &DatabaseConfig) -> Result<(), SourceError> {
        let database = DatabaseSource::connect(config)?;
        self.set_source(Box::new(database));
        Ok(())
    }

    /// Replace the mark source.
    pub fn set_source(&mut self, source: Box<dyn MarkSource>) {
        info!(source = source.name(), "using mark source");
        self.source = source;
    }

    /// Drop all in-memory entries.
    pub fn clear_memory(&self) {
        self.memory.invalidate_all();
    }

    /// Look up a mark by code (`ABCD`) or numeric id (`ID:1234`).
    pub fn get(&mut self, code: &str, mode: CacheMode) -> Result<Arc<MarkRecord>, GdbError> {
        let code = MarkCode::parse(code)?;
        self.get_code(&code, mode)
    }

    /// Look up a mark by its numeric database id.
    pub fn get_by_id(&mut self, id: u32, mode: CacheMode) -> Result<Arc<MarkRecord>, GdbError> {
        self.get_code(&MarkCode::from_id(u64::from(id)), mode)
    }

    /// Look up an already validated mark code.
    pub fn get_code(
        &mut self,
        code: &MarkCode,
        mode: CacheMode,
    ) -> Result<Arc<MarkRecord>, GdbError> {
        let persistent_enabled = self.file_cache.as_ref().is_some_and(FileCache::is_enabled);
        if mode == CacheMode::Persistent && !persistent_enabled {
            self.set_cached(FileCacheConfig::default());
        }

        if mode.uses_memory()
            && let Some(record) = self.memory.get(code)
        {
            debug!(%code, "memory cache hit");
            return Ok(record);
        }

        let record = self.resolve_record(code)?;

        let record = Arc::new(record);
        if mode.uses_memory() {
            self.memory.insert(code.clone(), Arc::clone(&record));
        }

        Ok(record)
    }

    /// Find the record: fresh cache, then source, then stale cache.
    ///
    /// A source payload is written to the persistent cache only once it has
    /// decoded to a record, so a bad response never replaces a good entry.
    fn resolve_record(&self, code: &MarkCode) -> Result<MarkRecord, GdbError> {
        let cached = self.file_cache.as_ref().and_then(|cache| cache.lookup(code));

        if let Some(entry) = &cached
            && entry.is_fresh
        {
            debug!(%code, cached_at = %entry.cached_at, "persistent cache hit");
            return decode(code, &entry.payload);
        }

        match self.source.fetch(code) {
            Ok(Some(payload)) => {
                debug!(%code, source = self.source.name(), "fetched mark");
                let record = decode(code, &payload)?;
                if let Some(cache) = &self.file_cache {
                    cache.store(code, &payload);
                }
                Ok(record)
            }
            Ok(None) => Err(GdbError::UnknownMark(code.clone())),
            Err(source) => match cached {
                Some(entry) => {
                    warn!(
                        %code,
                        error = %source,
                        cached_at = %entry.cached_at,
                        "mark source failed, using expired cache entry"
                    );
                    decode(code, &entry.payload)
                }
                None => Err(GdbError::Connection {
                    code: code.clone(),
                    source,
                }),
            },
        }
    }
}

fn decode(code: &MarkCode, payload: &str) -> Result<MarkRecord, GdbError> {
    MarkRecord::from_json(payload)
        .map_err(|e| GdbError::InvalidPayload {
            code: code.clone(),
            message: e.0,
        })?
        .ok_or_else(|| GdbError::UnknownMark(code.clone()))
}
