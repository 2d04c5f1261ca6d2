//! In-memory [`ObjectStore`] with disk spillover for large bodies.
//!
//! Buckets live in a [`DashMap`]; each bucket keeps its objects in a
//! [`BTreeMap`] behind a [`RwLock`] so listings come out in key order.
//! Bodies above [`InMemoryObjectStore::max_memory_size`] are written to
//! temp files under the data directory and removed when the last handle to
//! them drops.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mocks3_model::ListQuery;
use parking_lot::RwLock;
use tracing::{debug, info, trace};

use super::{
    BucketInfo, ListResult, ObjectContent, ObjectMeta, ObjectStore, StoredData, StoredObject,
};
use crate::checksums;
use crate::config::MockS3Config;
use crate::error::StoreError;

/// Default maximum body size (512 KiB) kept in memory.
const DEFAULT_MAX_MEMORY_SIZE: usize = 524_288;

#[derive(Debug)]
struct BucketEntry {
    creation_date: DateTime<Utc>,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl BucketEntry {
    fn new() -> Self {
        Self {
            creation_date: Utc::now(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }
}

/// Thread-safe in-memory object store.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use mocks3_core::{InMemoryObjectStore, ObjectStore};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryObjectStore::default();
/// store.create_bucket("photos").await;
/// let meta = store
///     .store_object("photos", "cat.jpg", "image/jpeg", Bytes::from("meow"))
///     .await
///     .unwrap();
/// assert_eq!(meta.size, 4);
/// assert!(store.get_object("photos", "cat.jpg").await.is_some());
/// # });
/// ```
pub struct InMemoryObjectStore {
    buckets: DashMap<String, BucketEntry>,
    max_memory_size: usize,
    data_dir: PathBuf,
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("bucket_count", &self.buckets.len())
            .field("max_memory_size", &self.max_memory_size)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MEMORY_SIZE, std::env::temp_dir())
    }
}

impl InMemoryObjectStore {
    /// Create an empty store. Bodies larger than `max_memory_size` bytes are
    /// spilled to temp files in `data_dir`.
    #[must_use]
    pub fn new(max_memory_size: usize, data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        debug!(max_memory_size, data_dir = %data_dir.display(), "creating InMemoryObjectStore");
        Self {
            buckets: DashMap::new(),
            max_memory_size,
            data_dir,
        }
    }

    /// Create a store from the service configuration.
    #[must_use]
    pub fn from_config(config: &MockS3Config) -> Self {
        Self::new(config.max_memory_object_size, &config.data_dir)
    }

    /// The spill threshold in bytes.
    #[must_use]
    pub fn max_memory_size(&self) -> usize {
        self.max_memory_size
    }

    async fn store_data(&self, data: Bytes) -> Result<StoredData, StoreError> {
        if data.len() > self.max_memory_size {
            self.spill_to_disk(&data).await
        } else {
            Ok(StoredData::InMemory(data))
        }
    }

    async fn spill_to_disk(&self, data: &[u8]) -> Result<StoredData, StoreError> {
        let size = data.len() as u64;
        let path = tempfile::Builder::new()
            .prefix("mocks3-")
            .tempfile_in(&self.data_dir)
            .map_err(|e| {
                StoreError::Internal(anyhow::anyhow!(
                    "failed to create temp file in {}: {e}",
                    self.data_dir.display()
                ))
            })?
            .into_temp_path();

        tokio::fs::write(&path, data).await.map_err(|e| {
            StoreError::Internal(anyhow::anyhow!(
                "failed to write temp file {}: {e}",
                path.display()
            ))
        })?;

        trace!(path = %path.display(), size, "spilled body to disk");
        Ok(StoredData::OnDisk { path, size })
    }

    /// Insert `object` into `bucket`, failing if the bucket has gone away.
    fn insert(&self, bucket: &str, object: StoredObject) -> Result<ObjectMeta, StoreError> {
        let entry = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::no_such_bucket(bucket))?;
        let meta = object.meta.clone();
        entry.objects.write().insert(meta.key.clone(), object);
        Ok(meta)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn list_buckets(&self) -> Vec<BucketInfo> {
        let mut buckets: Vec<BucketInfo> = self
            .buckets
            .iter()
            .map(|e| BucketInfo {
                name: e.key().clone(),
                creation_date: e.value().creation_date,
            })
            .collect();
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        buckets
    }

    async fn get_bucket(&self, name: &str) -> Option<BucketInfo> {
        self.buckets.get(name).map(|e| BucketInfo {
            name: name.to_owned(),
            creation_date: e.creation_date,
        })
    }

    async fn create_bucket(&self, name: &str) -> BucketInfo {
        let entry = self.buckets.entry(name.to_owned()).or_insert_with(|| {
            info!(bucket = %name, "bucket created");
            BucketEntry::new()
        });
        BucketInfo {
            name: name.to_owned(),
            creation_date: entry.creation_date,
        }
    }

    async fn query_bucket(
        &self,
        bucket: &str,
        query: &ListQuery,
    ) -> Result<ListResult, StoreError> {
        let entry = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::no_such_bucket(bucket))?;
        let objects = entry.objects.read();
        Ok(list_from_btree(&objects, query))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let entry = self.buckets.get(bucket)?;
        entry.objects.read().get(key).cloned()
    }

    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<ObjectMeta, StoreError> {
        if !self.buckets.contains_key(bucket) {
            return Err(StoreError::no_such_bucket(bucket));
        }

        let meta = ObjectMeta {
            key: key.to_owned(),
            size: body.len() as u64,
            content_type: content_type.to_owned(),
            etag: checksums::compute_etag(&body),
            last_modified: Utc::now(),
        };
        let content = ObjectContent::new(self.store_data(body).await?);

        trace!(
            bucket,
            key,
            size = meta.size,
            on_disk = content.is_on_disk(),
            "stored object"
        );
        self.insert(bucket, StoredObject { meta, content })
    }

    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<ObjectMeta, StoreError> {
        let source = self
            .get_object(src_bucket, src_key)
            .await
            .ok_or_else(|| StoreError::no_such_key(src_bucket, src_key))?;

        debug!(
            src_bucket,
            src_key,
            dst_bucket,
            dst_key,
            size = source.meta.size,
            "copying object"
        );

        // Bodies are immutable, so the copy shares the source's content.
        let object = StoredObject {
            meta: ObjectMeta {
                key: dst_key.to_owned(),
                last_modified: Utc::now(),
                ..source.meta
            },
            content: source.content,
        };
        self.insert(dst_bucket, object)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> bool {
        let Some(entry) = self.buckets.get(bucket) else {
            return false;
        };
        let removed = entry.objects.write().remove(key).is_some();
        if removed {
            trace!(bucket, key, "deleted object");
        }
        removed
    }

    async fn delete_bucket(&self, name: &str) -> bool {
        match self.buckets.remove(name) {
            Some((_, entry)) => {
                info!(bucket = %name, objects = entry.objects.read().len(), "bucket deleted");
                true
            }
            None => false,
        }
    }
}

/// Apply marker, prefix, delimiter and max-keys to one bucket's objects.
///
/// Rolled-up common prefixes count towards `max_keys` alongside objects.
/// When the page is truncated, `next_marker` is the last key or prefix
/// returned.
fn list_from_btree(objects: &BTreeMap<String, StoredObject>, query: &ListQuery) -> ListResult {
    let prefix = query.prefix.as_deref().unwrap_or_default();
    let delimiter = query.delimiter.as_deref().unwrap_or_default();
    let marker = query.marker.as_deref().filter(|m| !m.is_empty());
    let max_keys = query.effective_max_keys();

    let lower = marker.map_or(Bound::Unbounded, Bound::Excluded);
    let mut result = ListResult::default();
    let mut count = 0usize;
    let mut last_returned: Option<String> = None;

    for (key, object) in objects.range::<str, _>((lower, Bound::Unbounded)) {
        if !key.starts_with(prefix) {
            continue;
        }

        let common_prefix = if delimiter.is_empty() {
            None
        } else {
            key[prefix.len()..]
                .find(delimiter)
                .map(|pos| key[..prefix.len() + pos + delimiter.len()].to_owned())
        };

        if let Some(ref cp) = common_prefix {
            // Keys are sorted, so a repeated prefix is always the last one pushed.
            if result.common_prefixes.last() == Some(cp) {
                continue;
            }
            // The previous page already ended on this prefix.
            if marker.is_some_and(|m| m.starts_with(cp.as_str())) {
                continue;
            }
        }

        if count >= max_keys {
            result.is_truncated = true;
            break;
        }
        count += 1;

        match common_prefix {
            Some(cp) => {
                last_returned = Some(cp.clone());
                result.common_prefixes.push(cp);
            }
            None => {
                last_returned = Some(key.clone());
                result.objects.push(object.meta.clone());
            }
        }
    }

    if result.is_truncated {
        result.next_marker = last_returned;
    }
    result
}
