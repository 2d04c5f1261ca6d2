//! XML response bodies for MockS3.
//!
//! S3 answers with RestXml documents. Every document carries the XML
//! declaration and, except for errors, the S3 namespace on its root element.
//!
//! - [`S3Serialize`] and [`to_xml`] render listing, ACL and copy results.
//! - [`error_to_xml`] renders the flat `<Error>` body.

pub mod error;
pub mod serialize;

pub use error::{XmlError, error_to_xml};
pub use serialize::{S3_NAMESPACE, S3Serialize, to_xml};
