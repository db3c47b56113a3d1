//! In-memory S3-compatible server for exercising [S3Backend] over HTTP.
//!
//! Requests are authenticated with SigV4, so a request the backend signs
//! wrongly is rejected the same way a real service would reject it.
//!
//! [S3Backend]: sigil_storage::S3Backend

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use hyper::server::conn::http1;
use hyper_util::{rt::TokioIo, service::TowerToHyperService};
use s3s::dto::{
    DeleteObjectInput, DeleteObjectOutput, GetObjectInput, GetObjectOutput, HeadBucketInput,
    HeadBucketOutput, HeadObjectInput, HeadObjectOutput, PutObjectInput, PutObjectOutput,
    StreamingBlob,
};
use s3s::service::S3ServiceBuilder;
use s3s::{S3, S3Request, S3Response, S3Result, s3_error};
use tokio::{net::TcpListener, sync::RwLock};

/// Access key the server accepts
pub const ACCESS_KEY_ID: &str = "local-access-key";
/// Secret key the server accepts
pub const SECRET_ACCESS_KEY: &str = "local secret key";

/// How the server answers otherwise valid requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Behavior {
    /// Serve from the in-memory buckets
    #[default]
    Normal,
    /// Answer object HEAD requests with 403, as S3 does for callers
    /// lacking list permission
    DenyObjectHeads,
    /// Answer every request with 500
    InternalErrors,
}

/// Bucket name -> key -> content
#[derive(Clone, Default)]
struct InMemoryS3 {
    buckets: Arc<RwLock<HashMap<String, HashMap<String, Vec<u8>>>>>,
    behavior: Behavior,
}

impl InMemoryS3 {
    fn fail_if_broken(&self) -> S3Result<()> {
        match self.behavior {
            Behavior::InternalErrors => Err(s3_error!(InternalError)),
            _ => Ok(()),
        }
    }
}

/// A running server. Stops when dropped.
pub struct LocalS3 {
    /// The endpoint URL the server listens on
    pub endpoint: String,
    _shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl LocalS3 {
    /// Start a server holding empty `buckets`
    pub async fn start(buckets: &[&str]) -> anyhow::Result<Self> {
        Self::start_with(Behavior::Normal, buckets).await
    }

    /// Start a server holding empty `buckets` that answers with `behavior`
    pub async fn start_with(behavior: Behavior, buckets: &[&str]) -> anyhow::Result<Self> {
        let storage = InMemoryS3 {
            behavior,
            ..Default::default()
        };
        {
            let mut contents = storage.buckets.write().await;
            for bucket in buckets {
                contents.insert(bucket.to_string(), HashMap::new());
            }
        }

        let mut builder = S3ServiceBuilder::new(storage);
        builder.set_auth(s3s::auth::SimpleAuth::from_single(
            ACCESS_KEY_ID,
            SECRET_ACCESS_KEY,
        ));
        let service = builder.build();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = format!("http://{}", listener.local_addr()?);

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        if let Ok((stream, _)) = result {
                            let hyper_service = TowerToHyperService::new(service.clone());
                            tokio::spawn(async move {
                                let _ = http1::Builder::new()
                                    .serve_connection(TokioIo::new(stream), hyper_service)
                                    .await;
                            });
                        }
                    }
                }
            }
        });

        Ok(LocalS3 {
            endpoint,
            _shutdown_tx: shutdown_tx,
        })
    }
}

#[async_trait]
impl S3 for InMemoryS3 {
    async fn head_bucket(
        &self,
        req: S3Request<HeadBucketInput>,
    ) -> S3Result<S3Response<HeadBucketOutput>> {
        self.fail_if_broken()?;

        let buckets = self.buckets.read().await;
        if buckets.contains_key(&req.input.bucket) {
            Ok(S3Response::new(HeadBucketOutput::default()))
        } else {
            Err(s3_error!(NoSuchBucket))
        }
    }

    async fn head_object(
        &self,
        req: S3Request<HeadObjectInput>,
    ) -> S3Result<S3Response<HeadObjectOutput>> {
        self.fail_if_broken()?;
        if self.behavior == Behavior::DenyObjectHeads {
            return Err(s3_error!(AccessDenied));
        }

        let buckets = self.buckets.read().await;
        let bucket = buckets
            .get(&req.input.bucket)
            .ok_or_else(|| s3_error!(NoSuchBucket))?;
        let data = bucket
            .get(&req.input.key)
            .ok_or_else(|| s3_error!(NoSuchKey))?;

        Ok(S3Response::new(HeadObjectOutput {
            content_length: Some(data.len() as i64),
            ..Default::default()
        }))
    }

    async fn get_object(
        &self,
        req: S3Request<GetObjectInput>,
    ) -> S3Result<S3Response<GetObjectOutput>> {
        self.fail_if_broken()?;

        let buckets = self.buckets.read().await;
        let bucket = buckets
            .get(&req.input.bucket)
            .ok_or_else(|| s3_error!(NoSuchBucket))?;
        let data = bucket
            .get(&req.input.key)
            .ok_or_else(|| s3_error!(NoSuchKey))?;

        let body = s3s::Body::from(Bytes::from(data.clone()));
        Ok(S3Response::new(GetObjectOutput {
            body: Some(StreamingBlob::from(body)),
            content_length: Some(data.len() as i64),
            ..Default::default()
        }))
    }

    async fn put_object(
        &self,
        req: S3Request<PutObjectInput>,
    ) -> S3Result<S3Response<PutObjectOutput>> {
        self.fail_if_broken()?;

        let PutObjectInput {
            bucket, key, body, ..
        } = req.input;

        let mut data = Vec::new();
        if let Some(mut body) = body {
            use futures_util::StreamExt;
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|_| s3_error!(InternalError))?;
                data.extend_from_slice(&chunk);
            }
        }

        let mut buckets = self.buckets.write().await;
        buckets
            .get_mut(&bucket)
            .ok_or_else(|| s3_error!(NoSuchBucket))?
            .insert(key, data);

        Ok(S3Response::new(PutObjectOutput::default()))
    }

    async fn delete_object(
        &self,
        req: S3Request<DeleteObjectInput>,
    ) -> S3Result<S3Response<DeleteObjectOutput>> {
        self.fail_if_broken()?;

        let mut buckets = self.buckets.write().await;
        if let Some(bucket) = buckets.get_mut(&req.input.bucket) {
            bucket.remove(&req.input.key);
        }

        Ok(S3Response::new(DeleteObjectOutput::default()))
    }
}
