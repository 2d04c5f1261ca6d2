//! The object store collaborator.
//!
//! The dispatcher only ever talks to `dyn ObjectStore`. Implementations must
//! be safe to share across concurrent requests; the dispatcher does no
//! locking of its own.

pub mod memory;

use std::fmt;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use mocks3_model::ListQuery;
use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

use crate::error::StoreError;

/// A streaming reader over (part of) an object body.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Bucket as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// Object metadata, everything but the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Object key.
    pub key: String,
    /// Body size in bytes.
    pub size: u64,
    /// `Content-Type` supplied at upload time.
    pub content_type: String,
    /// Quoted MD5 of the body.
    pub etag: String,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
}

/// An object returned by [`ObjectStore::get_object`].
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Object metadata.
    pub meta: ObjectMeta,
    /// Handle to the body.
    pub content: ObjectContent,
}

/// One page of a bucket listing.
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    /// Matching objects, in key order.
    pub objects: Vec<ObjectMeta>,
    /// Prefixes rolled up by the delimiter, in key order.
    pub common_prefixes: Vec<String>,
    /// Whether more entries follow this page.
    pub is_truncated: bool,
    /// Marker to pass for the next page when truncated.
    pub next_marker: Option<String>,
}

pub(crate) enum StoredData {
    InMemory(Bytes),
    /// The file is removed when the [`TempPath`] drops.
    OnDisk { path: TempPath, size: u64 },
}

impl fmt::Debug for StoredData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory(data) => f
                .debug_struct("InMemory")
                .field("size", &data.len())
                .finish(),
            Self::OnDisk { path, size } => f
                .debug_struct("OnDisk")
                .field("path", &path.display())
                .field("size", size)
                .finish(),
        }
    }
}

/// Shared, immutable handle to an object body.
///
/// Cloning is cheap. A handle keeps the body alive even if the object is
/// overwritten or deleted while a response is still streaming it.
#[derive(Debug, Clone)]
pub struct ObjectContent(Arc<StoredData>);

impl ObjectContent {
    pub(crate) fn new(data: StoredData) -> Self {
        Self(Arc::new(data))
    }

    /// Body size in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        match self.0.as_ref() {
            StoredData::InMemory(data) => data.len() as u64,
            StoredData::OnDisk { size, .. } => *size,
        }
    }

    /// Whether the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the body lives on disk rather than in memory.
    #[must_use]
    pub fn is_on_disk(&self) -> bool {
        matches!(self.0.as_ref(), StoredData::OnDisk { .. })
    }

    /// Open a reader over `len` bytes starting at `offset`.
    ///
    /// The window is clipped to the body, so asking past the end yields a
    /// short (possibly empty) reader. Spilled bodies are read from disk on
    /// demand; nothing beyond the reader's internal buffer is held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if a spilled body cannot be opened.
    pub async fn reader(&self, offset: u64, len: u64) -> Result<ObjectReader, StoreError> {
        let total = self.len();
        let start = offset.min(total);
        let len = len.min(total - start);
        let end = start + len;

        match self.0.as_ref() {
            StoredData::InMemory(data) => {
                // Both bounds are within `data.len()`, which is a usize.
                let start = usize::try_from(start).unwrap_or(data.len());
                let end = usize::try_from(end).unwrap_or(data.len());
                Ok(Box::pin(Cursor::new(data.slice(start..end))))
            }
            StoredData::OnDisk { path, .. } => {
                let mut file = tokio::fs::File::open(&**path).await.map_err(|e| {
                    StoreError::Internal(anyhow::anyhow!(
                        "failed to open spilled body {}: {e}",
                        path.display()
                    ))
                })?;
                file.seek(std::io::SeekFrom::Start(start))
                    .await
                    .map_err(|e| {
                        StoreError::Internal(anyhow::anyhow!(
                            "failed to seek spilled body {}: {e}",
                            path.display()
                        ))
                    })?;
                Ok(Box::pin(file.take(len)))
            }
        }
    }

    /// Read the whole body into memory.
    #[cfg(test)]
    pub(crate) async fn read_all(&self) -> Result<Bytes, StoreError> {
        if let StoredData::InMemory(data) = self.0.as_ref() {
            return Ok(data.clone());
        }
        let mut reader = self.reader(0, self.len()).await?;
        let mut buf = Vec::with_capacity(usize::try_from(self.len()).unwrap_or_default());
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|e| StoreError::Internal(anyhow::anyhow!("failed to read body: {e}")))?;
        Ok(Bytes::from(buf))
    }
}

/// Bucket and object operations the dispatcher relies on.
#[async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Every bucket, sorted by name.
    async fn list_buckets(&self) -> Vec<BucketInfo>;

    /// Look up one bucket.
    async fn get_bucket(&self, name: &str) -> Option<BucketInfo>;

    /// Create a bucket. Creating an existing bucket is a no-op that returns
    /// the existing one.
    async fn create_bucket(&self, name: &str) -> BucketInfo;

    /// One page of a bucket listing.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoSuchBucket`] if the bucket does not exist.
    async fn query_bucket(&self, bucket: &str, query: &ListQuery)
    -> Result<ListResult, StoreError>;

    /// Look up an object. A missing bucket is reported the same way as a
    /// missing key.
    async fn get_object(&self, bucket: &str, key: &str) -> Option<StoredObject>;

    /// Store `body` under `bucket/key`, replacing any previous object.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoSuchBucket`] if the bucket does not exist, or
    /// [`StoreError::Internal`] if a large body cannot be spilled to disk.
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<ObjectMeta, StoreError>;

    /// Copy an object, body and content type, to a new location.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoSuchKey`] if the source is missing,
    /// [`StoreError::NoSuchBucket`] if the destination bucket is missing.
    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<ObjectMeta, StoreError>;

    /// Remove an object. Returns whether it existed.
    async fn delete_object(&self, bucket: &str, key: &str) -> bool;

    /// Remove a bucket and everything in it. Returns whether it existed.
    async fn delete_bucket(&self, name: &str) -> bool;
}
