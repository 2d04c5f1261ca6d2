//! Output types to HTTP responses.
//!
//! [`IntoS3Response`] turns the typed outputs from `mocks3-model` into
//! responses with an XML body rendered by `mocks3-xml`. Header-only
//! responses (object reads, PUT acknowledgements, 204s) are assembled in the
//! dispatcher with the helpers below.

use chrono::{DateTime, Utc};
use http::header::{CONTENT_TYPE, HeaderValue};
use mocks3_model::S3Error;
use mocks3_model::output::{
    AccessControlPolicyOutput, CopyObjectOutput, ListBucketsOutput, ListObjectsOutput,
};
use mocks3_xml::{S3Serialize, error_to_xml, to_xml};

use crate::body::S3ResponseBody;

/// Content type for listing and ACL documents.
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Content type for PUT acknowledgements, including the copy result.
pub const PUT_CONTENT_TYPE: &str = "text/xml";

/// Trait for converting an output struct into an HTTP response.
pub trait IntoS3Response {
    /// Convert this output into an HTTP response.
    ///
    /// # Errors
    ///
    /// Returns an `S3Error` if the body cannot be rendered or the response
    /// cannot be constructed.
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error>;
}

impl IntoS3Response for ListBucketsOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("ListAllMyBucketsResult", &self, XML_CONTENT_TYPE)
    }
}

impl IntoS3Response for ListObjectsOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("ListBucketResult", &self, XML_CONTENT_TYPE)
    }
}

impl IntoS3Response for AccessControlPolicyOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("AccessControlPolicy", &self, XML_CONTENT_TYPE)
    }
}

impl IntoS3Response for CopyObjectOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("CopyObjectResult", &self, PUT_CONTENT_TYPE)
    }
}

/// 200 with `root` rendered as the body.
fn xml_response<T: S3Serialize>(
    root: &str,
    value: &T,
    content_type: &'static str,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let xml = to_xml(root, value)
        .map_err(|e| S3Error::internal_error(format!("failed to render {root}: {e}")))?;
    let builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header(CONTENT_TYPE, content_type);
    build_response(builder, S3ResponseBody::from_xml(xml))
}

/// Set an optional header on a response builder if the value is `Some` and valid.
pub(crate) fn set_optional_header(
    builder: http::response::Builder,
    name: &str,
    value: Option<&str>,
) -> http::response::Builder {
    if let Some(v) = value {
        if let Ok(hv) = HeaderValue::from_str(v) {
            return builder.header(name, hv);
        }
    }
    builder
}

/// Render a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub(crate) fn http_date(value: &DateTime<Utc>) -> String {
    value.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build a response from a builder, converting build errors to `S3Error`.
pub(crate) fn build_response(
    builder: http::response::Builder,
    body: S3ResponseBody,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    builder
        .body(body)
        .map_err(|e| S3Error::internal_error(format!("failed to build HTTP response: {e}")))
}

/// A bodiless response with just a status.
pub(crate) fn empty_response(
    status: http::StatusCode,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    build_response(
        http::Response::builder().status(status),
        S3ResponseBody::empty(),
    )
}

/// Convert an [`S3Error`] into an XML error response.
#[must_use]
pub fn error_to_response(err: &S3Error, request_id: &str) -> http::Response<S3ResponseBody> {
    let xml_bytes = error_to_xml(err, request_id);

    http::Response::builder()
        .status(err.status_code)
        .header(CONTENT_TYPE, XML_CONTENT_TYPE)
        .body(S3ResponseBody::from_xml(xml_bytes))
        .unwrap_or_else(|_| {
            http::Response::builder()
                .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                .body(S3ResponseBody::empty())
                .expect("static response should be valid")
        })
}
