//! Operation dispatch.
//!
//! [`dispatch`] maps a normalized request onto the object store and builds
//! the HTTP response. All state lives in the [`DispatchContext`], which holds
//! only shared read-only references and is built fresh for every request.
//!
//! | Method | Operation | Store call | Status |
//! |--------|-----------|------------|--------|
//! | GET/HEAD | ListBuckets | `list_buckets` | 200 |
//! | GET/HEAD | ListObjects | `query_bucket` | 200, 404 |
//! | GET/HEAD | GetAcl | - | 200 |
//! | GET | Get | `get_object` | 200, 206, 404, 416 |
//! | HEAD | Head | `get_object` | 200, 206, 404, 416 |
//! | PUT | Store | `store_object` | 200 |
//! | PUT | Copy | `copy_object` | 200, 400, 404 |
//! | PUT | SetAcl | - | 200 |
//! | PUT | CreateBucket | `create_bucket` | 200 |
//! | DELETE | DeleteObject | `delete_object` | 204 |
//! | DELETE | DeleteBucket | `delete_bucket` | 204 |

use std::sync::LazyLock;

use bytes::Bytes;
use http::header::{
    ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED, LOCATION,
    RANGE,
};
use http::{Method, StatusCode};
use mocks3_core::{MockS3Config, ObjectMeta, ObjectStore};
use mocks3_model::output::{
    AccessControlPolicyOutput, BucketSummary, CopyObjectOutput, ListBucketsOutput,
    ListObjectsOutput, ObjectSummary, Owner,
};
use mocks3_model::{S3Error, S3Operation, S3Request};
use regex::Regex;
use tracing::{debug, warn};

use crate::body::S3ResponseBody;
use crate::response::{
    IntoS3Response, PUT_CONTENT_TYPE, build_response, empty_response, http_date,
    set_optional_header,
};

/// Content type recorded for uploads that do not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

static RANGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bytes=(\d*)-(\d*)").expect("range pattern is valid"));

/// Dispatcher behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Create the destination bucket on Store/Copy when it is missing.
    /// When off, writing into a missing bucket is a 404 `NoSuchBucket`.
    pub auto_create_buckets: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            auto_create_buckets: true,
        }
    }
}

impl From<&MockS3Config> for DispatchConfig {
    fn from(config: &MockS3Config) -> Self {
        Self {
            auto_create_buckets: config.auto_create_buckets,
        }
    }
}

/// Per-request view of the shared service state.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    /// The object store.
    pub store: &'a dyn ObjectStore,
    /// Dispatcher configuration.
    pub config: &'a DispatchConfig,
}

/// Execute one normalized request.
///
/// HEAD responses are always returned without a body.
///
/// # Errors
///
/// Returns an `S3Error` for missing buckets, unsatisfiable ranges, copy
/// failures and store I/O failures. Callers render it with
/// [`error_to_response`](crate::response::error_to_response).
pub async fn dispatch(
    ctx: &DispatchContext<'_>,
    req: &S3Request<'_>,
    body: Bytes,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    debug!(
        method = %req.method,
        operation = %req.operation,
        resource = %req.resource(),
        body_len = body.len(),
        "dispatching"
    );

    let response = match (&req.method, req.operation) {
        (&Method::GET | &Method::HEAD, S3Operation::ListBuckets) => handle_list_buckets(ctx).await,
        (&Method::GET | &Method::HEAD, S3Operation::ListObjects) => {
            handle_list_objects(ctx, req).await
        }
        (&Method::GET | &Method::HEAD, S3Operation::GetAcl) => handle_get_acl(),
        (&Method::GET, S3Operation::Get) | (&Method::HEAD, S3Operation::Head) => {
            handle_get_object(ctx, req).await
        }
        (&Method::PUT, S3Operation::Store) => handle_store(ctx, req, body).await,
        (&Method::PUT, S3Operation::Copy) => handle_copy(ctx, req).await,
        (&Method::PUT, S3Operation::SetAcl) => handle_set_acl(req),
        (&Method::PUT, S3Operation::CreateBucket) => handle_create_bucket(ctx, req).await,
        (&Method::DELETE, S3Operation::DeleteObject) => handle_delete_object(ctx, req).await,
        (&Method::DELETE, S3Operation::DeleteBucket) => handle_delete_bucket(ctx, req).await,
        (method, operation) => {
            warn!(%method, %operation, "no handler for method and operation");
            Err(S3Error::method_not_allowed(method.as_str()))
        }
    }?;

    if req.is_head() {
        let (parts, _) = response.into_parts();
        return Ok(http::Response::from_parts(parts, S3ResponseBody::empty()));
    }
    Ok(response)
}

// ---------------------------------------------------------------------------
// Service and bucket operations
// ---------------------------------------------------------------------------

async fn handle_list_buckets(
    ctx: &DispatchContext<'_>,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let buckets = ctx
        .store
        .list_buckets()
        .await
        .into_iter()
        .map(|b| BucketSummary {
            name: b.name,
            creation_date: b.creation_date,
        })
        .collect();

    ListBucketsOutput {
        owner: Owner::default(),
        buckets,
    }
    .into_s3_response()
}

async fn handle_list_objects(
    ctx: &DispatchContext<'_>,
    req: &S3Request<'_>,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = target_bucket(req)?;
    let query = req.list_query();
    let result = ctx.store.query_bucket(bucket, &query).await?;

    debug!(
        bucket,
        objects = result.objects.len(),
        common_prefixes = result.common_prefixes.len(),
        truncated = result.is_truncated,
        "listed bucket"
    );

    ListObjectsOutput {
        name: bucket.to_owned(),
        max_keys: query.effective_max_keys(),
        prefix: query.prefix,
        marker: query.marker,
        delimiter: query.delimiter,
        is_truncated: result.is_truncated,
        next_marker: result.next_marker,
        contents: result.objects.into_iter().map(object_summary).collect(),
        common_prefixes: result.common_prefixes,
        owner: Owner::default(),
    }
    .into_s3_response()
}

async fn handle_create_bucket(
    ctx: &DispatchContext<'_>,
    req: &S3Request<'_>,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = target_bucket(req)?;
    let info = ctx.store.create_bucket(bucket).await;
    debug!(bucket = %info.name, "bucket ready");

    let location = format!("/{bucket}");
    let builder = set_optional_header(
        put_acknowledgement_builder(None),
        LOCATION.as_str(),
        Some(location.as_str()),
    );
    build_response(builder, S3ResponseBody::empty())
}

async fn handle_delete_bucket(
    ctx: &DispatchContext<'_>,
    req: &S3Request<'_>,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = target_bucket(req)?;
    let existed = ctx.store.delete_bucket(bucket).await;
    debug!(bucket, existed, "deleted bucket");
    empty_response(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// ACL stubs
// ---------------------------------------------------------------------------

fn handle_get_acl() -> Result<http::Response<S3ResponseBody>, S3Error> {
    AccessControlPolicyOutput::default().into_s3_response()
}

fn handle_set_acl(req: &S3Request<'_>) -> Result<http::Response<S3ResponseBody>, S3Error> {
    debug!(resource = %req.resource(), "ignoring ACL update");
    put_acknowledgement(None)
}

// ---------------------------------------------------------------------------
// Object operations
// ---------------------------------------------------------------------------

async fn handle_get_object(
    ctx: &DispatchContext<'_>,
    req: &S3Request<'_>,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let (bucket, key) = target_object(req)?;
    let Some(object) = ctx.store.get_object(bucket, key).await else {
        debug!(bucket, key, "object not found");
        return empty_response(StatusCode::NOT_FOUND);
    };

    let total = object.content.len();
    let range = match req.header(RANGE) {
        Some(header) => resolve_range(header, total)?,
        None => None,
    };

    let builder = set_optional_header(
        http::Response::builder(),
        CONTENT_TYPE.as_str(),
        Some(object.meta.content_type.as_str()),
    );
    let mut builder = builder
        .header(ETAG, object.meta.etag.as_str())
        .header(ACCEPT_RANGES, "bytes")
        .header(LAST_MODIFIED, http_date(&object.meta.last_modified));

    let (offset, len) = match range {
        Some(range) => {
            builder = builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(CONTENT_RANGE, range.content_range(total));
            (range.start, range.len())
        }
        None => {
            builder = builder.status(StatusCode::OK);
            (0, total)
        }
    };
    let builder = builder.header(CONTENT_LENGTH, len);

    if req.is_head() {
        return build_response(builder, S3ResponseBody::empty());
    }

    let reader = object.content.reader(offset, len).await?;
    debug!(
        bucket,
        key,
        offset,
        len,
        on_disk = object.content.is_on_disk(),
        "streaming object"
    );
    build_response(builder, S3ResponseBody::streaming(reader, len))
}

async fn handle_store(
    ctx: &DispatchContext<'_>,
    req: &S3Request<'_>,
    body: Bytes,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let (bucket, key) = target_object(req)?;
    ensure_bucket(ctx, bucket).await?;

    let content_type = req
        .header(CONTENT_TYPE)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);
    let meta = ctx
        .store
        .store_object(bucket, key, content_type, body)
        .await?;

    debug!(bucket, key, size = meta.size, etag = %meta.etag, "stored object");
    put_acknowledgement(Some(&meta.etag))
}

async fn handle_copy(
    ctx: &DispatchContext<'_>,
    req: &S3Request<'_>,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let (Some(bucket), Some(key)) = (req.bucket.as_deref(), req.key.as_deref()) else {
        return Err(
            S3Error::invalid_request("A copy needs a destination bucket and key")
                .with_resource(req.resource()),
        );
    };
    let Some(source) = req.source.as_ref() else {
        return Err(S3Error::invalid_request("Missing x-amz-copy-source"));
    };

    if ctx.store.get_object(&source.bucket, &source.key).await.is_none() {
        return Err(S3Error::no_such_key(format!(
            "/{}/{}",
            source.bucket, source.key
        )));
    }
    ensure_bucket(ctx, bucket).await?;

    let meta = ctx
        .store
        .copy_object(&source.bucket, &source.key, bucket, key)
        .await?;

    debug!(
        src_bucket = %source.bucket,
        src_key = %source.key,
        bucket,
        key,
        "copied object"
    );

    let mut response = CopyObjectOutput {
        etag: meta.etag.clone(),
        last_modified: meta.last_modified,
    }
    .into_s3_response()?;
    if let Ok(etag) = http::HeaderValue::from_str(&meta.etag) {
        response.headers_mut().insert(ETAG, etag);
    }
    Ok(response)
}

async fn handle_delete_object(
    ctx: &DispatchContext<'_>,
    req: &S3Request<'_>,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let (bucket, key) = target_object(req)?;
    let existed = ctx.store.delete_object(bucket, key).await;
    debug!(bucket, key, existed, "deleted object");
    empty_response(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn target_bucket<'r>(req: &'r S3Request<'_>) -> Result<&'r str, S3Error> {
    req.bucket
        .as_deref()
        .ok_or_else(|| S3Error::invalid_request("No bucket in request").with_resource("/"))
}

fn target_object<'r>(req: &'r S3Request<'_>) -> Result<(&'r str, &'r str), S3Error> {
    let bucket = target_bucket(req)?;
    let key = req.key.as_deref().ok_or_else(|| {
        S3Error::invalid_request("No object key in request").with_resource(req.resource())
    })?;
    Ok((bucket, key))
}

/// Make sure `bucket` exists before a write, creating it if allowed.
async fn ensure_bucket(ctx: &DispatchContext<'_>, bucket: &str) -> Result<(), S3Error> {
    if ctx.store.get_bucket(bucket).await.is_some() {
        return Ok(());
    }
    if !ctx.config.auto_create_buckets {
        return Err(S3Error::no_such_bucket(bucket));
    }
    ctx.store.create_bucket(bucket).await;
    debug!(bucket, "implicitly created bucket");
    Ok(())
}

/// 200, `text/xml`, no body; the shape of every PUT response but Copy.
fn put_acknowledgement(etag: Option<&str>) -> Result<http::Response<S3ResponseBody>, S3Error> {
    build_response(put_acknowledgement_builder(etag), S3ResponseBody::empty())
}

/// 200 with `Content-Type: text/xml`, shared by every PUT response.
fn put_acknowledgement_builder(etag: Option<&str>) -> http::response::Builder {
    let builder = http::Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, PUT_CONTENT_TYPE);
    set_optional_header(builder, ETAG.as_str(), etag)
}

fn object_summary(meta: ObjectMeta) -> ObjectSummary {
    ObjectSummary {
        key: meta.key,
        last_modified: meta.last_modified,
        etag: meta.etag,
        size: meta.size,
    }
}

/// An inclusive byte window inside an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    fn len(self) -> u64 {
        self.end - self.start + 1
    }

    fn content_range(self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Resolve a `Range` header against an object of `total` bytes.
///
/// A header that does not look like `bytes=<start>-<finish>` is ignored. An
/// empty start means 0; an empty or zero finish means the last byte; a
/// finish past the end is clamped.
fn resolve_range(header: &str, total: u64) -> Result<Option<ByteRange>, S3Error> {
    let Some(caps) = RANGE_PATTERN.captures(header) else {
        debug!(header, "ignoring unrecognized Range header");
        return Ok(None);
    };

    let bound = |idx: usize| {
        let digits = caps.get(idx).map_or("", |m| m.as_str());
        if digits.is_empty() {
            0
        } else {
            digits.parse::<u64>().unwrap_or(u64::MAX)
        }
    };
    let start = bound(1);
    let finish = bound(2);

    if total == 0 {
        return Err(S3Error::invalid_range(header));
    }
    let last = total - 1;
    let end = if finish == 0 { last } else { finish.min(last) };
    if start > end {
        return Err(S3Error::invalid_range(header));
    }

    Ok(Some(ByteRange { start, end }))
}
