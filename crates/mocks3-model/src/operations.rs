//! The operations a normalized request can resolve to.

/// Every storage operation the dispatcher knows how to execute.
///
/// Requests that fit none of these are reported as unhandled by the router
/// rather than being given a catch-all variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3Operation {
    /// List every bucket in the store.
    ListBuckets,
    /// List the objects of one bucket, with marker/prefix/delimiter paging.
    ListObjects,
    /// Return the static ACL document for a bucket or object.
    GetAcl,
    /// Fetch an object body (optionally a byte range).
    Get,
    /// Fetch object headers only.
    Head,
    /// Upload an object body.
    Store,
    /// Server-side copy driven by the `x-amz-copy-source` header.
    Copy,
    /// Accept an ACL document without enforcing it.
    SetAcl,
    /// Create a bucket (idempotent).
    CreateBucket,
    /// Delete a single object.
    DeleteObject,
    /// Delete a bucket.
    DeleteBucket,
}

impl S3Operation {
    /// All operations, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::ListBuckets,
        Self::ListObjects,
        Self::GetAcl,
        Self::Get,
        Self::Head,
        Self::Store,
        Self::Copy,
        Self::SetAcl,
        Self::CreateBucket,
        Self::DeleteObject,
        Self::DeleteBucket,
    ];

    /// Returns the operation name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListBuckets => "ListBuckets",
            Self::ListObjects => "ListObjects",
            Self::GetAcl => "GetAcl",
            Self::Get => "Get",
            Self::Head => "Head",
            Self::Store => "Store",
            Self::Copy => "Copy",
            Self::SetAcl => "SetAcl",
            Self::CreateBucket => "CreateBucket",
            Self::DeleteObject => "DeleteObject",
            Self::DeleteBucket => "DeleteBucket",
        }
    }

    /// Whether the operation addresses a single object rather than a bucket
    /// or the whole service.
    #[must_use]
    pub fn is_object_level(&self) -> bool {
        matches!(
            self,
            Self::Get | Self::Head | Self::Store | Self::Copy | Self::DeleteObject
        )
    }
}

impl std::fmt::Display for S3Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
