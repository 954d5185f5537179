//! Resume downloads from S3.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::retry::{with_retry, RetryPolicy};

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Invalid resume URL '{0}'")]
    InvalidUrl(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Request rejected by the blob store: {0}")]
    Rejected(String),

    #[error("Transient blob store error: {0}")]
    Transient(String),

    #[error("Blob download timed out after {0:?}")]
    Timeout(Duration),
}

impl BlobError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, BlobError::Transient(_) | BlobError::Timeout(_))
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, BlobError>;
}

/// Bucket and key of a virtual-hosted-style S3 URL
/// (`https://<bucket>.s3.<region>.amazonaws.com/<key>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

impl S3Location {
    pub fn parse(url: &str) -> Result<Self, BlobError> {
        let invalid = || BlobError::InvalidUrl(url.to_string());

        let rest = url
            .split_once("://")
            .map(|(_, rest)| rest)
            .ok_or_else(invalid)?;
        let rest = rest.split(&['?', '#'][..]).next().unwrap_or(rest);
        let (host, path) = rest.split_once('/').ok_or_else(invalid)?;

        let bucket = host.split('.').next().unwrap_or_default();
        let key = path.trim_start_matches('/');
        if bucket.is_empty() || key.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            retry: RetryPolicy::default(),
        }
    }

    async fn fetch_once(&self, location: &S3Location) -> Result<Bytes, BlobError> {
        let download = async {
            let output = self
                .client
                .get_object()
                .bucket(&location.bucket)
                .key(&location.key)
                .send()
                .await
                .map_err(|e| classify_sdk_error(location, e))?;

            let data = output
                .body
                .collect()
                .await
                .map_err(|e| BlobError::Transient(format!("body read failed: {e}")))?;
            Ok::<_, BlobError>(data.into_bytes())
        };

        tokio::time::timeout(self.timeout, download)
            .await
            .map_err(|_| BlobError::Timeout(self.timeout))?
    }
}

fn classify_sdk_error<R>(location: &S3Location, err: SdkError<GetObjectError, R>) -> BlobError
where
    R: std::fmt::Debug,
{
    let object = format!("s3://{}/{}", location.bucket, location.key);
    match &err {
        SdkError::ServiceError(service) => {
            let inner = service.err();
            if inner.is_no_such_key() {
                return BlobError::NotFound(object);
            }
            match inner.code() {
                Some("NoSuchBucket") | Some("AccessDenied") => BlobError::NotFound(object),
                Some("SlowDown") | Some("InternalError") | Some("ServiceUnavailable") => {
                    BlobError::Transient(format!("{object}: {err:?}"))
                }
                _ => BlobError::Rejected(format!("{object}: {err:?}")),
            }
        }
        _ => BlobError::Transient(format!("{object}: {err:?}")),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn fetch(&self, url: &str) -> Result<Bytes, BlobError> {
        let location = S3Location::parse(url)?;
        let bytes = with_retry(&self.retry, "S3 download", BlobError::is_retryable, || {
            self.fetch_once(&location)
        })
        .await?;
        debug!(
            bucket = %location.bucket,
            key = %location.key,
            bytes = bytes.len(),
            "Downloaded resume"
        );
        Ok(bytes)
    }
}
