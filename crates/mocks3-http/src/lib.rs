//! HTTP layer for MockS3: request normalization, dispatch and the hyper service.
//!
//! - **Router** ([`router`]): resolves path-style vs virtual-host-style
//!   addressing and classifies each request into an
//!   [`S3Operation`](mocks3_model::S3Operation).
//! - **Dispatch** ([`dispatch`]): runs one classified request against an
//!   [`ObjectStore`](mocks3_core::ObjectStore) and builds the response.
//! - **Response** ([`response`]): output types and errors to HTTP responses.
//! - **Body** ([`body`]): buffered, streaming and empty response bodies.
//! - **Service** ([`service`]): [`MockS3Service`], the hyper `Service` that
//!   ties it all together.
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> MockS3Service (hyper Service)
//!     -> Health check interception
//!     -> S3Router::normalize (addressing + operation)
//!        -> unhandled: FallbackHandler or 404
//!     -> Body collection
//!     -> dispatch (explicit method x operation table)
//!     -> Common response headers (x-amz-request-id, x-amz-id-2, Server)
//!   <- HTTP Response
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mocks3_core::{InMemoryObjectStore, MockS3Config};
//! use mocks3_http::MockS3Service;
//!
//! let config = MockS3Config::default();
//! let store = Arc::new(InMemoryObjectStore::from_config(&config));
//! let service = MockS3Service::new(store, &config);
//! // Serve `service` with hyper.
//! ```

// S3Error is the wire error carried through every Result in this crate.
#![allow(clippy::result_large_err)]

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::S3ResponseBody;
pub use dispatch::{DispatchConfig, DispatchContext, dispatch};
pub use response::{IntoS3Response, error_to_response};
pub use router::S3Router;
pub use service::{FallbackHandler, MockS3Service};
