use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use sigil_common::{Clock, SystemClock};
use sigil_presign::{Credentials, Method, PresignRequest, Signer};
use tokio::sync::RwLock;
use url::Url;

use super::object_url;
use crate::{ObjectBackend, SignedUrl, StorageError};

const MEMORY_ENDPOINT: &str = "https://memory.invalid/";

type Objects = HashMap<String, Vec<u8>>;

/// Handle to a container of a [MemoryBackend]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBucket {
    name: String,
}

impl MemoryBucket {
    /// The container name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An [ObjectBackend] that keeps everything in process memory.
///
/// Containers must be created with [create_bucket](Self::create_bucket)
/// before use. URLs point at `memory.invalid` but are signed with the same
/// [Signer] an S3 backend would use, so they carry real expiry parameters.
/// Clones share the same contents.
#[derive(Clone)]
pub struct MemoryBackend {
    buckets: Arc<RwLock<HashMap<String, Objects>>>,
    signer: Signer,
    region: String,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(Signer::V2(Credentials::new("memory", "memory")))
    }
}

impl MemoryBackend {
    /// Create an empty backend that presigns with `signer`
    pub fn new(signer: Signer) -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            signer,
            region: "auto".into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Read the signing time from `clock` instead of the system clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Create the container `name` if it does not exist yet
    pub async fn create_bucket(&self, name: &str) {
        self.buckets
            .write()
            .await
            .entry(name.to_string())
            .or_default();
    }

    /// Drop the container `name` and everything in it
    pub async fn delete_bucket(&self, name: &str) {
        self.buckets.write().await.remove(name);
    }

    /// The stored content of `key` in container `name`
    pub async fn object(&self, name: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .read()
            .await
            .get(name)
            .and_then(|objects| objects.get(key))
            .cloned()
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    type Bucket = MemoryBucket;

    async fn bucket(&self, name: &str) -> Result<Option<MemoryBucket>, StorageError> {
        Ok(self
            .buckets
            .read()
            .await
            .contains_key(name)
            .then(|| MemoryBucket {
                name: name.to_string(),
            }))
    }

    async fn upload(
        &self,
        bucket: &MemoryBucket,
        key: &str,
        content: &[u8],
    ) -> Result<u64, StorageError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets.get_mut(&bucket.name).ok_or_else(|| {
            StorageError::OperationFailed(format!("Bucket {} no longer exists", bucket.name))
        })?;

        objects.insert(key.to_string(), content.to_vec());
        Ok(content.len() as u64)
    }

    async fn remove(&self, bucket: &MemoryBucket, key: &str) -> Result<bool, StorageError> {
        Ok(self
            .buckets
            .write()
            .await
            .get_mut(&bucket.name)
            .and_then(|objects| objects.remove(key))
            .is_some())
    }

    async fn presign(
        &self,
        bucket: &MemoryBucket,
        key: &str,
        expiration: Duration,
    ) -> Result<SignedUrl, StorageError> {
        let url = object_url(&Url::parse(MEMORY_ENDPOINT)?, &bucket.name, key)?;
        let request = PresignRequest::new(Method::Get, url)
            .with_region(&self.region)
            .with_expires(expiration.as_secs())
            .with_time(self.clock.now_utc());

        Ok(self.signer.authorize(&request)?.url.into())
    }
}
