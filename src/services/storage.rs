//! The `Storage` capability: what every backend offers to callers.
//!
//! Callers hold an `Arc<dyn Storage>` and never learn which backend sits behind
//! it. Private objects have no permanent URL; they are reached through
//! [`Storage::temporary_url`], whose signing is delegated to an injected
//! [`SignedUrlBuilder`] so that no backend depends on an HTTP framework.

use crate::models::{InvalidKey, ObjectKey, Visibility};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::{io, path::Path, time::Duration};
use thiserror::Error;

/// Byte stream flowing into `put` and out of `get`.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object key: {0}")]
    InvalidKey(#[from] InvalidKey),
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error("failed to write object: {0}")]
    Write(#[source] io::Error),
    #[error("failed to read object: {0}")]
    Read(#[source] io::Error),
    #[error("object `{key}` is {visibility}; operation does not apply")]
    NotApplicable { key: String, visibility: Visibility },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("signed url builder failed: {0}")]
    Signer(#[from] SignerError),
    #[error("storage backend `{0}` is not supported")]
    Unsupported(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a [`SignedUrlBuilder`].
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("ttl is too large to express as an expiry time")]
    TtlOutOfRange,
    #[error("{0}")]
    Failed(String),
}

/// Produces time-limited URLs for private objects.
///
/// Implemented by whoever serves the files over HTTP: it picks the endpoint,
/// computes the expiry and signs the request URI. The storage backend only
/// hands over where the object lives.
pub trait SignedUrlBuilder: Send + Sync {
    fn build(
        &self,
        absolute_path: &Path,
        key: &ObjectKey,
        ttl: Duration,
    ) -> Result<String, SignerError>;
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Stream `data` into the object at `key` under the root for `visibility`,
    /// replacing any previous content (and any copy under another visibility).
    async fn put(
        &self,
        key: &ObjectKey,
        data: ByteStream,
        visibility: Visibility,
    ) -> StorageResult<()>;

    /// Open the object for reading.
    async fn get(&self, key: &ObjectKey) -> StorageResult<ByteStream>;

    async fn delete(&self, key: &ObjectKey) -> StorageResult<()>;

    /// Which visibility root currently holds the object.
    async fn visibility(&self, key: &ObjectKey) -> StorageResult<Visibility>;

    /// Move the object to another visibility root.
    async fn set_visibility(
        &self,
        key: &ObjectKey,
        visibility: Visibility,
    ) -> StorageResult<()>;

    /// Permanent URL of a public object.
    async fn url(&self, key: &ObjectKey) -> StorageResult<String>;

    /// Expiring URL of a private object. `ttl` must be non-zero.
    async fn temporary_url(&self, key: &ObjectKey, ttl: Duration) -> StorageResult<String>;
}
