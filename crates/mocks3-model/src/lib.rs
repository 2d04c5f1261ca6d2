//! Request model, output types, and wire errors for MockS3.
//!
//! - [`operations`]: the closed set of [`S3Operation`]s the service understands.
//! - [`request`]: the normalized [`S3Request`] produced once per HTTP call.
//! - [`output`]: plain data handed to the XML serializer.
//! - [`error`]: [`S3Error`] and [`S3ErrorCode`], the error shape written to the wire.

pub mod error;
pub mod operations;
pub mod output;
pub mod request;

pub use error::{S3Error, S3ErrorCode};
pub use operations::S3Operation;
pub use request::{AddressingMode, CopySource, ListQuery, S3Request};
