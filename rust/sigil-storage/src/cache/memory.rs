use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use sieve_cache::SieveCache;
use sigil_common::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::{CacheConfig, CacheEntry, CacheKey, SignedUrl, StorageError, UrlCache};

/// Lifetime of entries stored without an explicit TTL: 24 hours
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Number of URLs held before the least useful ones are evicted
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Clone)]
struct Cached {
    url: SignedUrl,
    expires_at: SystemTime,
}

/// An in-process [UrlCache] bounded by a [SieveCache].
///
/// Expired entries are dropped when they are next looked up. When the cache
/// is full, SIEVE eviction makes room regardless of remaining TTL. Clones
/// share the same entries.
#[derive(Clone)]
pub struct MemoryUrlCache {
    entries: Arc<Mutex<SieveCache<CacheKey, Cached>>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MemoryUrlCache {
    /// Create a cache holding at most `capacity` URLs
    pub fn new(capacity: usize) -> Result<Self, StorageError> {
        let entries = SieveCache::new(capacity).map_err(|error| {
            StorageError::Cache(format!("Could not initialize cache: {error}"))
        })?;

        Ok(Self {
            entries: Arc::new(Mutex::new(entries)),
            default_ttl: DEFAULT_CACHE_TTL,
            clock: Arc::new(SystemClock),
        })
    }

    /// Create a cache sized and tuned by `config`
    pub fn from_config(config: &CacheConfig) -> Result<Self, StorageError> {
        Ok(Self::new(config.capacity)?.with_default_ttl(config.default_ttl()))
    }

    /// Lifetime of entries stored without an explicit TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Read the time from `clock` instead of the system clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Number of held entries, including expired ones not yet dropped
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// True when nothing is held
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UrlCache for MemoryUrlCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<SignedUrl>, StorageError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(cached) if now < cached.expires_at => return Ok(Some(cached.url.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
        }

        Ok(None)
    }

    async fn store(&self, entry: CacheEntry) -> Result<(), StorageError> {
        let ttl = entry.ttl.unwrap_or(self.default_ttl);
        let expires_at = self
            .clock
            .now()
            .checked_add(ttl)
            .ok_or_else(|| StorageError::Cache(format!("TTL of {ttl:?} is out of range")))?;

        self.entries.lock().await.insert(
            entry.key,
            Cached {
                url: entry.url,
                expires_at,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), StorageError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
