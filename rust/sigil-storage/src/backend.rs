//! Object storage services that [SignedUrlStore](crate::SignedUrlStore)
//! delegates to.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::{SignedUrl, StorageError};

mod s3;
pub use s3::*;

mod memory;
pub use memory::*;

mod measured;
pub use measured::*;

/// An S3-style object store: named containers holding keyed blobs, with the
/// ability to presign GET URLs.
///
/// "Not found" is a value, not an error: [bucket](ObjectBackend::bucket)
/// answers `None` and [remove](ObjectBackend::remove) answers `false`. Every
/// other failure is returned as a [StorageError].
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Handle to a container known to exist
    type Bucket: Send + Sync;

    /// Resolve the container called `name`, or `None` if it does not exist
    async fn bucket(&self, name: &str) -> Result<Option<Self::Bucket>, StorageError>;

    /// Write `content` under `key`, replacing any existing object. Returns the
    /// number of bytes written.
    async fn upload(
        &self,
        bucket: &Self::Bucket,
        key: &str,
        content: &[u8],
    ) -> Result<u64, StorageError>;

    /// Remove the object under `key`. Returns `false` if there was none.
    async fn remove(&self, bucket: &Self::Bucket, key: &str) -> Result<bool, StorageError>;

    /// Mint a GET URL for `key` that stays valid for `expiration`. The object
    /// need not exist.
    async fn presign(
        &self,
        bucket: &Self::Bucket,
        key: &str,
        expiration: Duration,
    ) -> Result<SignedUrl, StorageError>;
}

/// Path-style address of `key` in `bucket` under `endpoint`:
/// `{endpoint}/{bucket}/{key}`, with each `/`-separated segment of the key
/// percent-encoded on its own.
pub(crate) fn object_url(endpoint: &Url, bucket: &str, key: &str) -> Result<Url, StorageError> {
    let mut url = bucket_url(endpoint, bucket)?;
    url.path_segments_mut()
        .map_err(|_| StorageError::Configuration(format!("{endpoint} cannot be a base URL")))?
        .extend(key.split('/'));
    Ok(url)
}

/// Path-style address of `bucket` under `endpoint`
pub(crate) fn bucket_url(endpoint: &Url, bucket: &str) -> Result<Url, StorageError> {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| StorageError::Configuration(format!("{endpoint} cannot be a base URL")))?
        .pop_if_empty()
        .push(bucket);
    Ok(url)
}
