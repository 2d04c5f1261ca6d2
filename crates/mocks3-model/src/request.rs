//! The normalized request handed from the router to the dispatcher.
//!
//! An [`S3Request`] is built once per HTTP call and never mutated afterwards.
//! It borrows the raw request parts from the transport, so it cannot outlive
//! the call that produced it.

use std::fmt;

use crate::operations::S3Operation;

/// Default page size for bucket listings when `max-keys` is absent or invalid.
pub const DEFAULT_MAX_KEYS: usize = 1000;

/// How the bucket name was carried by the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// Bucket is the first path segment: `/bucket/key`.
    PathStyle,
    /// Bucket is the leftmost label of the Host header: `bucket.host/key`.
    VirtualHostStyle,
}

impl AddressingMode {
    /// Returns a short name for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PathStyle => "path",
            Self::VirtualHostStyle => "virtual-host",
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of a server-side copy, parsed from `x-amz-copy-source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySource {
    /// Source bucket name.
    pub bucket: String,
    /// Source object key. May be empty when the header names only a bucket.
    pub key: String,
}

/// Pagination parameters for a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Only keys strictly after this one are returned.
    pub marker: Option<String>,
    /// Only keys starting with this prefix are returned.
    pub prefix: Option<String>,
    /// Page size; `None` means [`DEFAULT_MAX_KEYS`].
    pub max_keys: Option<usize>,
    /// Keys containing the delimiter after the prefix roll up into common prefixes.
    pub delimiter: Option<String>,
}

impl ListQuery {
    /// Build a listing query from raw query-string pairs.
    ///
    /// `max-keys` values that do not parse as a non-negative integer are
    /// dropped, falling back to the default page size.
    #[must_use]
    pub fn from_params(params: &[(String, String)]) -> Self {
        let value = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };
        Self {
            marker: value("marker"),
            prefix: value("prefix"),
            max_keys: value("max-keys").and_then(|v| v.trim().parse().ok()),
            delimiter: value("delimiter"),
        }
    }

    /// The effective page size.
    #[must_use]
    pub fn effective_max_keys(&self) -> usize {
        self.max_keys.unwrap_or(DEFAULT_MAX_KEYS)
    }
}

/// A normalized storage request.
///
/// Invariants established by the router:
/// - `bucket` is `Some` for everything but [`S3Operation::ListBuckets`]
///   (a copy-source override at the service root is the one exception and is
///   rejected by the dispatcher).
/// - `key` is `Some` only for object-level operations and object ACLs.
/// - `source` is `Some` exactly when `operation` is [`S3Operation::Copy`].
#[derive(Debug, Clone)]
pub struct S3Request<'a> {
    /// The classified operation. Computed once, never re-derived.
    pub operation: S3Operation,
    /// The original HTTP method.
    pub method: http::Method,
    /// Addressing convention resolved from the Host header.
    pub addressing: AddressingMode,
    /// Target bucket.
    pub bucket: Option<String>,
    /// Target object key.
    pub key: Option<String>,
    /// Copy source, for [`S3Operation::Copy`].
    pub source: Option<CopySource>,
    /// Decoded query-string pairs, in request order.
    pub query: Vec<(String, String)>,
    /// The raw request head, owned by the transport.
    pub raw: &'a http::request::Parts,
}

impl S3Request<'_> {
    /// The first value of query parameter `name`.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// A request header as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.raw.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Listing parameters taken from the query string.
    #[must_use]
    pub fn list_query(&self) -> ListQuery {
        ListQuery::from_params(&self.query)
    }

    /// Whether this is a HEAD request; HEAD responses never carry a body.
    #[must_use]
    pub fn is_head(&self) -> bool {
        self.method == http::Method::HEAD
    }

    /// `bucket/key` (or just `bucket`) for error resources and logs.
    #[must_use]
    pub fn resource(&self) -> String {
        match (&self.bucket, &self.key) {
            (Some(b), Some(k)) => format!("/{b}/{k}"),
            (Some(b), None) => format!("/{b}"),
            _ => "/".to_owned(),
        }
    }
}
