use async_trait::async_trait;
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{ObjectBackend, SignedUrl, StorageError};

/// A [MeasuredBackend] acts as a proxy over an [ObjectBackend]
/// implementation that counts the calls made to it. Clones share counters.
#[derive(Clone)]
pub struct MeasuredBackend<Backend>
where
    Backend: ObjectBackend,
{
    lookups: Arc<AtomicUsize>,
    uploads: Arc<AtomicUsize>,
    removals: Arc<AtomicUsize>,
    mints: Arc<AtomicUsize>,
    backend: Backend,
}

impl<Backend> MeasuredBackend<Backend>
where
    Backend: ObjectBackend,
{
    /// Wrap the provided [ObjectBackend] so that calls to it may be measured.
    pub fn new(backend: Backend) -> Self {
        Self {
            lookups: Arc::new(AtomicUsize::default()),
            uploads: Arc::new(AtomicUsize::default()),
            removals: Arc::new(AtomicUsize::default()),
            mints: Arc::new(AtomicUsize::default()),
            backend,
        }
    }

    /// The wrapped backend
    pub fn inner(&self) -> &Backend {
        &self.backend
    }

    /// The aggregate number of container lookups
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// The aggregate number of uploads
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::Relaxed)
    }

    /// The aggregate number of removals
    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::Relaxed)
    }

    /// The aggregate number of URLs minted
    pub fn mints(&self) -> usize {
        self.mints.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<Backend> ObjectBackend for MeasuredBackend<Backend>
where
    Backend: ObjectBackend,
{
    type Bucket = Backend::Bucket;

    async fn bucket(&self, name: &str) -> Result<Option<Self::Bucket>, StorageError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.backend.bucket(name).await
    }

    async fn upload(
        &self,
        bucket: &Self::Bucket,
        key: &str,
        content: &[u8],
    ) -> Result<u64, StorageError> {
        self.uploads.fetch_add(1, Ordering::Relaxed);
        self.backend.upload(bucket, key, content).await
    }

    async fn remove(&self, bucket: &Self::Bucket, key: &str) -> Result<bool, StorageError> {
        self.removals.fetch_add(1, Ordering::Relaxed);
        self.backend.remove(bucket, key).await
    }

    async fn presign(
        &self,
        bucket: &Self::Bucket,
        key: &str,
        expiration: Duration,
    ) -> Result<SignedUrl, StorageError> {
        self.mints.fetch_add(1, Ordering::Relaxed);
        self.backend.presign(bucket, key, expiration).await
    }
}
