use std::{sync::Arc, time::Duration};

use sigil_common::{Clock, SystemClock, unix_seconds};
use sigil_presign::DEFAULT_EXPIRES;
use tracing::{debug, instrument, warn};

use crate::{
    CacheEntry, CachePolicy, MemoryUrlCache, ObjectBackend, ObjectLocator, S3Backend, SignedUrl,
    StorageError, StoreConfig, UrlCache, cache_ttl,
};

/// Uploads, deletes and presigned URLs for objects in an [ObjectBackend],
/// with minted URLs remembered in a [UrlCache].
///
/// A container that cannot be resolved is not an error: uploads write `0`
/// bytes, deletes answer `false` and URL requests answer `None`. Failures
/// talking to the backend or the cache are returned as [StorageError]s.
///
/// Cached URLs are served until shortly before they expire (see
/// [CachePolicy]). Concurrent misses for the same object may each mint a URL;
/// the last one stored wins.
pub struct SignedUrlStore<Backend, Cache>
where
    Backend: ObjectBackend,
    Cache: UrlCache,
{
    backend: Backend,
    cache: Cache,
    policy: CachePolicy,
    default_expiration: Duration,
    clock: Arc<dyn Clock>,
}

impl SignedUrlStore<S3Backend, MemoryUrlCache> {
    /// A store for the S3-compatible service described by `config`, with an
    /// in-memory URL cache
    pub fn open(config: &StoreConfig) -> Result<Self, StorageError> {
        Ok(Self::new(
            S3Backend::from_config(config)?,
            MemoryUrlCache::from_config(&config.cache)?,
        )
        .with_policy(config.cache.policy())
        .with_default_expiration(config.default_expiration()))
    }
}

impl<Backend, Cache> SignedUrlStore<Backend, Cache>
where
    Backend: ObjectBackend,
    Cache: UrlCache,
{
    /// Front `backend` with `cache`, using the default [CachePolicy]
    pub fn new(backend: Backend, cache: Cache) -> Self {
        Self {
            backend,
            cache,
            policy: CachePolicy::default(),
            default_expiration: Duration::from_secs(DEFAULT_EXPIRES),
            clock: Arc::new(SystemClock),
        }
    }

    /// Derive cache TTLs with `policy`
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// URL validity for [get_url_with_default_expiration](Self::get_url_with_default_expiration)
    pub fn with_default_expiration(mut self, expiration: Duration) -> Self {
        self.default_expiration = expiration;
        self
    }

    /// Read the time from `clock` instead of the system clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The wrapped backend
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// The URL cache
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Write `content` to the object at `locator`, replacing what was there.
    ///
    /// Returns the number of bytes written, or `0` if the container does not
    /// exist.
    #[instrument(skip_all, fields(%locator, size = content.len()))]
    pub async fn put_object(
        &self,
        locator: &ObjectLocator,
        content: &[u8],
    ) -> Result<u64, StorageError> {
        let Some(bucket) = self.backend.bucket(locator.container()).await? else {
            warn!("container not found, nothing written");
            return Ok(0);
        };

        self.backend.upload(&bucket, locator.key(), content).await
    }

    /// Remove the object at `locator`.
    ///
    /// Returns `true` if an object was removed and `false` if the container or
    /// the object did not exist. A removed object's cached URL is dropped.
    #[instrument(skip_all, fields(%locator))]
    pub async fn delete_object(&self, locator: &ObjectLocator) -> Result<bool, StorageError> {
        let Some(bucket) = self.backend.bucket(locator.container()).await? else {
            warn!("container not found, nothing deleted");
            return Ok(false);
        };

        let removed = self.backend.remove(&bucket, locator.key()).await?;
        if removed {
            self.invalidate(locator).await?;
        }

        Ok(removed)
    }

    /// A URL granting GET access to the object at `locator` for
    /// `expiration`.
    ///
    /// With `use_cache`, an unexpired cached URL is returned without touching
    /// the backend, and a freshly minted one is cached before returning.
    /// Returns `None` if the container does not exist. The object itself need
    /// not exist.
    #[instrument(skip_all, fields(%locator, expiration_secs = expiration.as_secs(), use_cache = use_cache))]
    pub async fn get_url(
        &self,
        locator: &ObjectLocator,
        expiration: Duration,
        use_cache: bool,
    ) -> Result<Option<SignedUrl>, StorageError> {
        let key = locator.cache_key();

        if use_cache {
            if let Some(url) = self.cache.get(&key).await? {
                debug!("signed URL cache hit");
                return Ok(Some(url));
            }
            debug!("signed URL cache miss");
        }

        let Some(bucket) = self.backend.bucket(locator.container()).await? else {
            warn!("container not found, no URL minted");
            return Ok(None);
        };

        let url = self
            .backend
            .presign(&bucket, locator.key(), expiration)
            .await?;

        if use_cache {
            let entry = match url.expires_at() {
                Some(expires_at) => {
                    let ttl = cache_ttl(expires_at, self.clock.now(), &self.policy);
                    debug!(
                        expires_at = unix_seconds(expires_at),
                        ttl_secs = ttl.as_secs(),
                        "caching signed URL"
                    );
                    CacheEntry::new(key, url.clone(), ttl)
                }
                None => {
                    debug!("signed URL carries no expiry, caching with default TTL");
                    CacheEntry::with_default_ttl(key, url.clone())
                }
            };
            self.cache.store(entry).await?;
        }

        Ok(Some(url))
    }

    /// [get_url](Self::get_url) with the store's default expiration
    pub async fn get_url_with_default_expiration(
        &self,
        locator: &ObjectLocator,
        use_cache: bool,
    ) -> Result<Option<SignedUrl>, StorageError> {
        self.get_url(locator, self.default_expiration, use_cache)
            .await
    }

    /// Forget any cached URL for `locator`
    pub async fn invalidate(&self, locator: &ObjectLocator) -> Result<(), StorageError> {
        self.cache.remove(&locator.cache_key()).await
    }
}
