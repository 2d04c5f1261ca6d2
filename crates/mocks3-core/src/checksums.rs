//! Content hashing for ETags.

use md5::Digest;

/// Hex-encoded MD5 digest of `data`.
///
/// ```
/// use mocks3_core::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(md5::Md5::digest(data))
}

/// MD5 digest wrapped in double quotes, the form S3 uses for `ETag`.
///
/// ```
/// use mocks3_core::checksums::compute_etag;
///
/// assert_eq!(compute_etag(b""), "\"d41d8cd98f00b204e9800998ecf8427e\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", compute_md5(data))
}
