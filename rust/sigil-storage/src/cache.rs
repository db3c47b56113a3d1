//! Where minted URLs are kept between requests.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{CacheKey, SignedUrl, StorageError};

mod memory;
pub use memory::*;

/// A URL to cache, the key it is cached under and how long it may be served.
///
/// A `ttl` of `None` leaves the lifetime to the cache's own default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Where the URL is cached
    pub key: CacheKey,
    /// The cached URL
    pub url: SignedUrl,
    /// How long the URL may be served from the cache
    pub ttl: Option<Duration>,
}

impl CacheEntry {
    /// An entry with an explicit lifetime
    pub fn new(key: CacheKey, url: SignedUrl, ttl: Duration) -> Self {
        Self {
            key,
            url,
            ttl: Some(ttl),
        }
    }

    /// An entry that lives for the cache's default lifetime
    pub fn with_default_ttl(key: CacheKey, url: SignedUrl) -> Self {
        Self {
            key,
            url,
            ttl: None,
        }
    }
}

/// A key/value store for signed URLs with per-entry expiry.
///
/// Implementations must never return an entry after its TTL has elapsed.
#[async_trait]
pub trait UrlCache: Send + Sync {
    /// The live URL cached under `key`, if any
    async fn get(&self, key: &CacheKey) -> Result<Option<SignedUrl>, StorageError>;

    /// Cache `entry`, replacing whatever was cached under the same key
    async fn store(&self, entry: CacheEntry) -> Result<(), StorageError>;

    /// Forget whatever is cached under `key`
    async fn remove(&self, key: &CacheKey) -> Result<(), StorageError>;
}

#[async_trait]
impl<C> UrlCache for Arc<C>
where
    C: UrlCache + ?Sized,
{
    async fn get(&self, key: &CacheKey) -> Result<Option<SignedUrl>, StorageError> {
        self.as_ref().get(key).await
    }

    async fn store(&self, entry: CacheEntry) -> Result<(), StorageError> {
        self.as_ref().store(entry).await
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), StorageError> {
        self.as_ref().remove(key).await
    }
}
