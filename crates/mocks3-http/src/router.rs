//! Request normalization: addressing resolution and operation classification.
//!
//! The [`S3Router`] turns raw request parts into an [`S3Request`] by looking at:
//!
//! - The `Host` header, to decide between path-style and virtual-host-style
//!   addressing. Hosts in the root set (the configured hostname, `localhost`,
//!   `s3.amazonaws.com`, `s3.localhost`) are path-style; any other host
//!   carries the bucket as its leftmost label.
//! - The HTTP method and how many path segments remain once the bucket is
//!   known. A virtual host with an empty path lists buckets on GET and
//!   rejects DELETE, like `/` under path-style addressing; PUT creates the
//!   host's bucket.
//! - The `acl` query marker, which selects the ACL stubs.
//! - The `x-amz-copy-source` header, which turns any PUT into a copy.
//!
//! Requests that fit none of the rules come back as `Ok(None)` so the caller
//! can hand them to a fallback.

use http::Method;
use http::request::Parts;
use mocks3_model::{AddressingMode, CopySource, S3Error, S3ErrorCode, S3Operation, S3Request};
use percent_encoding::percent_decode_str;
use tracing::debug;

/// Header naming the source of a server-side copy.
pub const COPY_SOURCE_HEADER: &str = "x-amz-copy-source";

/// Hostnames that always mean path-style addressing, besides the configured one.
const BUILTIN_ROOT_HOSTS: [&str; 3] = ["localhost", "s3.amazonaws.com", "s3.localhost"];

/// Request normalizer.
///
/// Built once from configuration and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct S3Router {
    root_hostnames: Vec<String>,
}

impl S3Router {
    /// Create a router whose root-hostname set is `hostname` plus the
    /// built-in S3 hostnames.
    #[must_use]
    pub fn new(hostname: &str) -> Self {
        let mut root_hostnames = vec![hostname.trim().to_ascii_lowercase()];
        for host in BUILTIN_ROOT_HOSTS {
            if !root_hostnames.iter().any(|h| h == host) {
                root_hostnames.push(host.to_owned());
            }
        }
        Self { root_hostnames }
    }

    /// The hostnames that select path-style addressing.
    #[must_use]
    pub fn root_hostnames(&self) -> &[String] {
        &self.root_hostnames
    }

    /// Whether `host` (lower-cased, without port) is a root hostname.
    #[must_use]
    pub fn is_root_host(&self, host: &str) -> bool {
        self.root_hostnames.iter().any(|h| h == host)
    }

    /// Addressing style a request resolves to, from its host alone.
    #[must_use]
    pub fn addressing(&self, parts: &Parts) -> AddressingMode {
        if self.host_bucket(parts).is_some() {
            AddressingMode::VirtualHostStyle
        } else {
            AddressingMode::PathStyle
        }
    }

    /// Bucket named by a non-root host, if any.
    fn host_bucket(&self, parts: &Parts) -> Option<String> {
        request_host(parts)
            .filter(|host| !self.is_root_host(host))
            .and_then(|host| bucket_from_host(&host))
    }

    /// Normalize a request.
    ///
    /// Returns `Ok(None)` when the request is not one this service handles
    /// (POST, OPTIONS, a PUT with no bucket to act on, ...).
    ///
    /// # Errors
    ///
    /// - `MethodNotAllowed` for `DELETE /`, whatever the addressing style.
    /// - `InvalidRequest` for a malformed `x-amz-copy-source` header.
    pub fn normalize<'a>(&self, parts: &'a Parts) -> Result<Option<S3Request<'a>>, S3Error> {
        let method = &parts.method;
        let path = parts.uri.path();
        let query = parse_query_params(parts.uri.query().unwrap_or_default());

        let (addressing, bucket, key) = match self.host_bucket(parts) {
            Some(bucket) => (
                AddressingMode::VirtualHostStyle,
                Some(bucket),
                parse_key(path),
            ),
            None => {
                let (bucket, key) = parse_path(path);
                (AddressingMode::PathStyle, bucket, key)
            }
        };

        let has_bucket = bucket.is_some();
        let has_key = key.is_some();
        let has_acl = query.iter().any(|(k, _)| k == "acl");
        // An empty virtual-host path addresses the service for reads and
        // deletes; only PUT takes the bucket from the host there.
        let has_path_bucket = has_bucket && (addressing == AddressingMode::PathStyle || has_key);

        let mut operation = match *method {
            Method::GET | Method::HEAD => {
                Some(classify_read(method, has_path_bucket, has_key, has_acl))
            }
            Method::PUT => classify_put(has_bucket, has_key, has_acl),
            Method::DELETE => Some(classify_delete(has_path_bucket, has_key)?),
            _ => None,
        };

        let mut source = None;
        if *method == Method::PUT {
            if let Some(value) = parts.headers.get(COPY_SOURCE_HEADER) {
                let raw = value.to_str().map_err(|_| {
                    S3Error::invalid_request("x-amz-copy-source is not valid UTF-8")
                })?;
                source = Some(parse_copy_source(raw)?);
                operation = Some(S3Operation::Copy);
            }
        }

        let Some(operation) = operation else {
            debug!(%method, path, %addressing, "request not handled by router");
            return Ok(None);
        };

        debug!(
            %method,
            %addressing,
            %operation,
            bucket = ?bucket,
            key = ?key,
            source = ?source,
            "normalized request"
        );

        Ok(Some(S3Request {
            operation,
            method: method.clone(),
            addressing,
            bucket,
            key,
            source,
            query,
            raw: parts,
        }))
    }
}

/// GET and HEAD share one classification; HEAD on an object becomes `Head`.
fn classify_read(method: &Method, has_bucket: bool, has_key: bool, has_acl: bool) -> S3Operation {
    match (has_bucket, has_key) {
        (false, _) => S3Operation::ListBuckets,
        (true, false) => S3Operation::ListObjects,
        (true, true) if has_acl => S3Operation::GetAcl,
        (true, true) if *method == Method::HEAD => S3Operation::Head,
        (true, true) => S3Operation::Get,
    }
}

fn classify_put(has_bucket: bool, has_key: bool, has_acl: bool) -> Option<S3Operation> {
    match (has_bucket, has_key) {
        (false, _) => None,
        (true, false) => Some(S3Operation::CreateBucket),
        (true, true) if has_acl => Some(S3Operation::SetAcl),
        (true, true) => Some(S3Operation::Store),
    }
}

fn classify_delete(has_bucket: bool, has_key: bool) -> Result<S3Operation, S3Error> {
    match (has_bucket, has_key) {
        (false, _) => Err(S3Error::with_message(
            S3ErrorCode::MethodNotAllowed,
            "Only GET is allowed at the service level",
        )
        .with_resource("/")),
        (true, false) => Ok(S3Operation::DeleteBucket),
        (true, true) => Ok(S3Operation::DeleteObject),
    }
}

/// The request host: `Host` header first, then the URI authority.
/// Lower-cased, port and trailing dot removed.
fn request_host(parts: &Parts) -> Option<String> {
    let raw = parts
        .headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.host())?;
    let host = strip_port(raw.trim()).trim_end_matches('.');
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// Strip a `:port` suffix, leaving bracketed IPv6 literals intact.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Leftmost dot-separated label of a virtual host.
fn bucket_from_host(host: &str) -> Option<String> {
    host.split('.')
        .next()
        .filter(|label| !label.is_empty())
        .map(str::to_owned)
}

/// Parse a path-style URI path into an optional bucket and optional key.
///
/// `/{bucket}` or `/{bucket}/{key...}`. The key keeps any trailing slash.
fn parse_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (None, None);
    }

    match trimmed.split_once('/') {
        Some((bucket, key_raw)) => {
            let key = (!key_raw.is_empty()).then(|| decode_uri_component(key_raw));
            (Some(decode_uri_component(bucket)), key)
        }
        None => (Some(decode_uri_component(trimmed)), None),
    }
}

/// The object key of a virtual-host-style path: everything after the leading `/`.
fn parse_key(path: &str) -> Option<String> {
    let raw = path.strip_prefix('/').unwrap_or(path);
    (!raw.is_empty()).then(|| decode_uri_component(raw))
}

/// Parse `x-amz-copy-source`: `[/]bucket/key...[?versionId=...]`.
fn parse_copy_source(raw: &str) -> Result<CopySource, S3Error> {
    let without_version = raw.split_once('?').map_or(raw, |(path, _)| path);
    let decoded = decode_uri_component(without_version.trim());
    let trimmed = decoded.strip_prefix('/').unwrap_or(&decoded);
    let (bucket, key) = trimmed.split_once('/').unwrap_or((trimmed, ""));

    if bucket.is_empty() {
        return Err(S3Error::invalid_request(
            "Copy Source must mention the source bucket and key: sourcebucket/sourcekey",
        )
        .with_resource(raw));
    }

    Ok(CopySource {
        bucket: bucket.to_owned(),
        key: key.to_owned(),
    })
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string into decoded key-value pairs, in order.
fn parse_query_params(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode_uri_component(k), decode_uri_component(v)),
            None => (decode_uri_component(pair), String::new()),
        })
        .collect()
}
