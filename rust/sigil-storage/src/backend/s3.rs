//! S3-compatible backend for AWS S3, Cloudflare R2, MinIO and friends.
//!
//! Buckets are addressed path-style: `{endpoint}/{bucket}/{key}`. Every
//! request the backend makes is itself presigned with the configured
//! [Signer], so one set of credentials covers both the requests sent here and
//! the URLs handed out to clients.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use sigil_common::{Clock, SystemClock};
use sigil_presign::{Method, PresignRequest, Signer};
use tracing::debug;
use url::Url;

use super::{bucket_url, object_url};
use crate::{ObjectBackend, SignedUrl, StorageError, StoreConfig};

/// Validity of the presigned requests the backend sends on its own behalf
const REQUEST_EXPIRES: u64 = 15 * 60;

/// Header carrying the SHA-256 of an upload for integrity checking
const CHECKSUM_HEADER: &str = "x-amz-checksum-sha256";

/// Handle to a bucket that answered a HEAD request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Bucket {
    name: String,
}

impl S3Bucket {
    /// The bucket name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// [ObjectBackend] speaking the S3 REST API over HTTP.
#[derive(Clone)]
pub struct S3Backend {
    endpoint: Url,
    region: String,
    signer: Signer,
    clock: Arc<dyn Clock>,
    client: reqwest::Client,
}

impl S3Backend {
    /// Connect to the service at `endpoint`, signing for `region` with `signer`
    pub fn open(
        endpoint: &str,
        region: impl Into<String>,
        signer: Signer,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            region: region.into(),
            signer,
            clock: Arc::new(SystemClock),
            client: reqwest::Client::new(),
        })
    }

    /// Connect using the endpoint, region and signing settings of `config`
    pub fn from_config(config: &StoreConfig) -> Result<Self, StorageError> {
        Self::open(&config.endpoint, config.region.clone(), config.signer()?)
    }

    /// Read the signing time from `clock` instead of the system clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The service endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self, method: Method, url: Url, expires: u64) -> PresignRequest {
        PresignRequest::new(method, url)
            .with_region(&self.region)
            .with_expires(expires)
            .with_time(self.clock.now_utc())
    }

    async fn perform(
        &self,
        request: PresignRequest,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response, StorageError> {
        let authorized = self.signer.authorize(&request)?;

        let mut builder = match request.method {
            Method::Get => self.client.get(authorized.url),
            Method::Put => self.client.put(authorized.url),
            Method::Head => self.client.head(authorized.url),
            Method::Delete => self.client.delete(authorized.url),
        };

        for (name, value) in authorized.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = body {
            builder = builder.body(body);
        }

        Ok(builder.send().await?)
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    type Bucket = S3Bucket;

    async fn bucket(&self, name: &str) -> Result<Option<S3Bucket>, StorageError> {
        let url = bucket_url(&self.endpoint, name)?;
        let response = self
            .perform(self.request(Method::Head, url, REQUEST_EXPIRES), None)
            .await?;
        let status = response.status();

        if status.is_success() {
            Ok(Some(S3Bucket {
                name: name.to_string(),
            }))
        } else if status == reqwest::StatusCode::NOT_FOUND
            || status == reqwest::StatusCode::FORBIDDEN
        {
            // S3 answers 403 for buckets owned by someone else
            debug!(bucket = name, %status, "bucket not available");
            Ok(None)
        } else {
            Err(StorageError::OperationFailed(format!(
                "Failed to look up bucket {name}: {status}"
            )))
        }
    }

    async fn upload(
        &self,
        bucket: &S3Bucket,
        key: &str,
        content: &[u8],
    ) -> Result<u64, StorageError> {
        let url = object_url(&self.endpoint, &bucket.name, key)?;
        let checksum = STANDARD.encode(Sha256::digest(content));
        let request = self
            .request(Method::Put, url, REQUEST_EXPIRES)
            .with_header(CHECKSUM_HEADER, checksum);

        let response = self.perform(request, Some(content.to_vec())).await?;

        if response.status().is_success() {
            Ok(content.len() as u64)
        } else {
            Err(StorageError::OperationFailed(format!(
                "Failed to upload {}/{key}: {}",
                bucket.name,
                response.status()
            )))
        }
    }

    async fn remove(&self, bucket: &S3Bucket, key: &str) -> Result<bool, StorageError> {
        let url = object_url(&self.endpoint, &bucket.name, key)?;

        // DELETE succeeds whether or not the object existed, so ask first
        let head = self
            .perform(self.request(Method::Head, url.clone(), REQUEST_EXPIRES), None)
            .await?;
        if head.status() == reqwest::StatusCode::NOT_FOUND
            || head.status() == reqwest::StatusCode::FORBIDDEN
        {
            // Without s3:ListBucket, S3 answers 403 for missing keys
            debug!(bucket = %bucket.name, key, status = %head.status(), "object not available");
            return Ok(false);
        }
        if !head.status().is_success() {
            return Err(StorageError::OperationFailed(format!(
                "Failed to look up {}/{key}: {}",
                bucket.name,
                head.status()
            )));
        }

        let response = self
            .perform(self.request(Method::Delete, url, REQUEST_EXPIRES), None)
            .await?;

        if response.status().is_success() {
            Ok(true)
        } else {
            Err(StorageError::OperationFailed(format!(
                "Failed to delete {}/{key}: {}",
                bucket.name,
                response.status()
            )))
        }
    }

    async fn presign(
        &self,
        bucket: &S3Bucket,
        key: &str,
        expiration: Duration,
    ) -> Result<SignedUrl, StorageError> {
        let url = object_url(&self.endpoint, &bucket.name, key)?;
        let request = self.request(Method::Get, url, expiration.as_secs());

        Ok(self.signer.authorize(&request)?.url.into())
    }
}
