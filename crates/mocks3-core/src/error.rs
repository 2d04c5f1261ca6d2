//! Object store errors.

use mocks3_model::S3Error;

/// Errors returned by an [`ObjectStore`](crate::store::ObjectStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The bucket does not exist.
    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket {
        /// The bucket name that was not found.
        bucket: String,
    },

    /// The key does not exist in its bucket.
    #[error("The specified key does not exist: {bucket}/{key}")]
    NoSuchKey {
        /// The bucket that was searched.
        bucket: String,
        /// The key that was not found.
        key: String,
    },

    /// Anything else, typically disk I/O on spilled bodies.
    #[error("internal store error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    /// Shorthand for [`StoreError::NoSuchBucket`].
    #[must_use]
    pub fn no_such_bucket(bucket: &str) -> Self {
        Self::NoSuchBucket {
            bucket: bucket.to_owned(),
        }
    }

    /// Shorthand for [`StoreError::NoSuchKey`].
    #[must_use]
    pub fn no_such_key(bucket: &str, key: &str) -> Self {
        Self::NoSuchKey {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        }
    }
}

impl From<StoreError> for S3Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NoSuchBucket { bucket } => Self::no_such_bucket(bucket),
            StoreError::NoSuchKey { key, .. } => Self::no_such_key(key),
            StoreError::Internal(e) => Self::internal_error(format!("{e:#}")),
        }
    }
}
