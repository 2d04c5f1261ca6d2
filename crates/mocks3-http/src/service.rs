//! The MockS3 HTTP service implementing hyper's `Service` trait.
//!
//! [`MockS3Service`] runs every request through the same pipeline:
//!
//! 1. Health check interception (path-style `GET /_health`)
//! 2. Normalization via [`S3Router`]
//! 3. Unhandled requests go to the [`FallbackHandler`], or get a bare 404
//! 4. Request body collection
//! 5. Dispatch against the object store
//! 6. Common response headers (`x-amz-request-id`, `x-amz-id-2`, `Server`)

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::service::Service;
use mocks3_core::{MockS3Config, ObjectStore};
use mocks3_model::{AddressingMode, S3Error, S3ErrorCode};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::body::S3ResponseBody;
use crate::dispatch::{DispatchConfig, DispatchContext, dispatch};
use crate::response::error_to_response;
use crate::router::S3Router;

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "MockS3";

/// Receives requests the router does not recognize (POST, OPTIONS, ...).
#[async_trait]
pub trait FallbackHandler: Send + Sync + fmt::Debug {
    /// Produce a response for an unhandled request.
    async fn handle(&self, parts: &http::request::Parts, body: Bytes)
    -> http::Response<S3ResponseBody>;
}

/// The MockS3 HTTP service.
///
/// Cloning is cheap: the store, router, configuration and fallback are all
/// shared behind `Arc`s. Nothing mutable is shared between requests.
#[derive(Debug, Clone)]
pub struct MockS3Service {
    store: Arc<dyn ObjectStore>,
    router: Arc<S3Router>,
    config: Arc<DispatchConfig>,
    fallback: Option<Arc<dyn FallbackHandler>>,
}

impl MockS3Service {
    /// Create a service over `store`, configured from `config`.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, config: &MockS3Config) -> Self {
        Self {
            store,
            router: Arc::new(S3Router::new(&config.hostname)),
            config: Arc::new(DispatchConfig::from(config)),
            fallback: None,
        }
    }

    /// Create a service from an explicit router and dispatcher configuration.
    #[must_use]
    pub fn from_parts(
        store: Arc<dyn ObjectStore>,
        router: S3Router,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            router: Arc::new(router),
            config: Arc::new(config),
            fallback: None,
        }
    }

    /// Route unhandled requests to `fallback` instead of answering 404.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackHandler>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Run one request through the pipeline. Never fails; errors become
    /// S3 error responses.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<S3ResponseBody>
    where
        B: http_body::Body<Data = Bytes> + Send,
        B::Error: fmt::Display,
    {
        let request_id = Uuid::new_v4().to_string();
        let response = self.process_request(req, &request_id).await;
        add_common_headers(response, &request_id)
    }

    async fn process_request<B>(
        &self,
        req: http::Request<B>,
        request_id: &str,
    ) -> http::Response<S3ResponseBody>
    where
        B: http_body::Body<Data = Bytes> + Send,
        B::Error: fmt::Display,
    {
        let (parts, incoming) = req.into_parts();
        let method = parts.method.clone();
        debug!(%method, uri = %parts.uri, request_id, "processing request");

        // 1. Health check interception.
        if is_health_check(&method, parts.uri.path())
            && self.router.addressing(&parts) == AddressingMode::PathStyle
        {
            return health_check_response();
        }

        // 2. Normalize.
        let s3_req = match self.router.normalize(&parts) {
            Ok(Some(s3_req)) => s3_req,
            Ok(None) => {
                // 3. Unhandled.
                let Some(fallback) = self.fallback.as_ref() else {
                    debug!(%method, uri = %parts.uri, request_id, "unhandled, no fallback");
                    return not_found_response();
                };
                let body = match collect_body(incoming).await {
                    Ok(body) => body,
                    Err(err) => return body_error_response(&err, request_id),
                };
                debug!(%method, uri = %parts.uri, request_id, "passing request to fallback");
                return fallback.handle(&parts, body).await;
            }
            Err(err) => {
                warn!(%method, uri = %parts.uri, error = %err, request_id, "rejected request");
                return render_error(&err, request_id, &method);
            }
        };

        info!(
            %method,
            operation = %s3_req.operation,
            addressing = %s3_req.addressing,
            bucket = ?s3_req.bucket,
            key = ?s3_req.key,
            request_id,
            "routed request"
        );

        // 4. Collect body.
        let body = match collect_body(incoming).await {
            Ok(body) => body,
            Err(err) => return body_error_response(&err, request_id),
        };

        // 5. Dispatch.
        let ctx = DispatchContext {
            store: self.store.as_ref(),
            config: &self.config,
        };
        match dispatch(&ctx, &s3_req, body).await {
            Ok(response) => response,
            Err(err) => {
                if err.code == S3ErrorCode::InternalError {
                    error!(error = %err, request_id, "operation failed");
                } else {
                    debug!(error = %err, request_id, "operation returned error");
                }
                render_error(&err, request_id, &method)
            }
        }
    }
}

impl<B> Service<http::Request<B>> for MockS3Service
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: fmt::Display,
{
    type Response = http::Response<S3ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

/// Collect the full request body into `Bytes`.
async fn collect_body<B>(incoming: B) -> Result<Bytes, String>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: fmt::Display,
{
    incoming
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| e.to_string())
}

fn body_error_response(err: &str, request_id: &str) -> http::Response<S3ResponseBody> {
    error!(error = %err, request_id, "failed to collect request body");
    error_to_response(
        &S3Error::internal_error("Failed to read request body"),
        request_id,
    )
}

/// Error response; HEAD gets the status and headers only.
fn render_error(
    err: &S3Error,
    request_id: &str,
    method: &http::Method,
) -> http::Response<S3ResponseBody> {
    let response = error_to_response(err, request_id);
    if *method == http::Method::HEAD {
        let (parts, _) = response.into_parts();
        return http::Response::from_parts(parts, S3ResponseBody::empty());
    }
    response
}

/// Check if the request is a health check probe.
///
/// `_` cannot appear in a bucket name, so `/_health` never shadows a
/// path-style bucket.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && path == "/_health"
}

/// Produce a health check response.
fn health_check_response() -> http::Response<S3ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(S3ResponseBody::from_string(
            r#"{"status":"running","service":"s3"}"#,
        ))
        .expect("static health response should be valid")
}

fn not_found_response() -> http::Response<S3ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::NOT_FOUND)
        .body(S3ResponseBody::empty())
        .expect("static not-found response should be valid")
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<S3ResponseBody>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let headers = response.headers_mut();
    if let Ok(hv) = http::header::HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv.clone());
        headers.insert("x-amz-id-2", hv);
    }
    headers.insert(
        http::header::SERVER,
        http::header::HeaderValue::from_static(SERVER_NAME),
    );
    response
}
