//! Plain data rendered by the XML serializer.

use chrono::{DateTime, Utc};

/// Owner reported in listings and ACL documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    /// Canonical user ID.
    pub id: String,
    /// Display name.
    pub display_name: String,
}

impl Default for Owner {
    fn default() -> Self {
        Self {
            id: "123".to_owned(),
            display_name: "MockS3".to_owned(),
        }
    }
}

/// One bucket in a `ListAllMyBucketsResult`.
#[derive(Debug, Clone)]
pub struct BucketSummary {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// One object in a `ListBucketResult`.
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    /// Object key.
    pub key: String,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Quoted MD5 ETag.
    pub etag: String,
    /// Size in bytes.
    pub size: u64,
}

/// Response data for `ListBuckets`.
#[derive(Debug, Clone, Default)]
pub struct ListBucketsOutput {
    /// Owner of every bucket.
    pub owner: Owner,
    /// Buckets sorted by name.
    pub buckets: Vec<BucketSummary>,
}

/// Response data for `ListObjects`.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsOutput {
    /// Bucket name.
    pub name: String,
    /// Prefix echoed from the request.
    pub prefix: Option<String>,
    /// Marker echoed from the request.
    pub marker: Option<String>,
    /// Effective page size.
    pub max_keys: usize,
    /// Delimiter echoed from the request.
    pub delimiter: Option<String>,
    /// Whether more keys remain after this page.
    pub is_truncated: bool,
    /// Marker for the next page, when truncated.
    pub next_marker: Option<String>,
    /// Objects on this page.
    pub contents: Vec<ObjectSummary>,
    /// Rolled-up prefixes when a delimiter is used.
    pub common_prefixes: Vec<String>,
    /// Owner reported on every entry.
    pub owner: Owner,
}

/// The static ACL document returned for every `GetAcl`.
#[derive(Debug, Clone, Default)]
pub struct AccessControlPolicyOutput {
    /// Owner, who is also the single `FULL_CONTROL` grantee.
    pub owner: Owner,
}

/// Response data for `Copy`.
#[derive(Debug, Clone)]
pub struct CopyObjectOutput {
    /// ETag of the new object.
    pub etag: String,
    /// Modification time of the new object.
    pub last_modified: DateTime<Utc>,
}
