//! Rendering model output types as S3 XML.
//!
//! Conventions follow the S3 RestXml protocol:
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Booleans: lowercase `true`/`false`
//! - Timestamps: ISO 8601 with milliseconds (`2006-02-03T16:45:09.000Z`)

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use mocks3_model::output::{
    AccessControlPolicyOutput, BucketSummary, CopyObjectOutput, ListBucketsOutput,
    ListObjectsOutput, ObjectSummary, Owner,
};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Types that can write themselves as child elements of an S3 document.
///
/// The root element and namespace are written by [`to_xml`].
pub trait S3Serialize {
    /// Write this value as XML child elements.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Render `value` as a complete document rooted at `root_element`.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: S3Serialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn write_optional_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_text_element(writer, tag, v)?;
    }
    Ok(())
}

fn write_bool<W: Write>(writer: &mut Writer<W>, tag: &str, value: bool) -> io::Result<()> {
    write_text_element(writer, tag, if value { "true" } else { "false" })
}

fn write_timestamp<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: &DateTime<Utc>,
) -> io::Result<()> {
    write_text_element(writer, tag, &format_timestamp(value))
}

/// ISO 8601 with milliseconds and a `Z` suffix.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

impl S3Serialize for Owner {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Owner").write_inner_content(|w| {
            write_text_element(w, "ID", &self.id)?;
            write_text_element(w, "DisplayName", &self.display_name)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for BucketSummary {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Bucket").write_inner_content(|w| {
            write_text_element(w, "Name", &self.name)?;
            write_timestamp(w, "CreationDate", &self.creation_date)?;
            Ok(())
        })?;
        Ok(())
    }
}

/// A listing entry. The owner is shared by the whole listing, so it is
/// passed alongside rather than stored per object.
struct ContentsEntry<'a> {
    object: &'a ObjectSummary,
    owner: &'a Owner,
}

impl S3Serialize for ContentsEntry<'_> {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Contents").write_inner_content(|w| {
            write_text_element(w, "Key", &self.object.key)?;
            write_timestamp(w, "LastModified", &self.object.last_modified)?;
            write_text_element(w, "ETag", &self.object.etag)?;
            write_text_element(w, "Size", &self.object.size.to_string())?;
            write_text_element(w, "StorageClass", "STANDARD")?;
            self.owner.serialize_xml(w)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ListBucketsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        self.owner.serialize_xml(writer)?;
        writer.create_element("Buckets").write_inner_content(|w| {
            for bucket in &self.buckets {
                bucket.serialize_xml(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ListObjectsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Name", &self.name)?;
        write_text_element(writer, "Prefix", self.prefix.as_deref().unwrap_or_default())?;
        write_text_element(writer, "Marker", self.marker.as_deref().unwrap_or_default())?;
        write_text_element(writer, "MaxKeys", &self.max_keys.to_string())?;
        write_optional_text(writer, "Delimiter", self.delimiter.as_deref())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        write_optional_text(writer, "NextMarker", self.next_marker.as_deref())?;
        for object in &self.contents {
            ContentsEntry {
                object,
                owner: &self.owner,
            }
            .serialize_xml(writer)?;
        }
        for prefix in &self.common_prefixes {
            writer
                .create_element("CommonPrefixes")
                .write_inner_content(|w| write_text_element(w, "Prefix", prefix))?;
        }
        Ok(())
    }
}

impl S3Serialize for AccessControlPolicyOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        self.owner.serialize_xml(writer)?;
        writer
            .create_element("AccessControlList")
            .write_inner_content(|w| {
                w.create_element("Grant").write_inner_content(|g| {
                    g.create_element("Grantee")
                        .with_attribute(("xmlns:xsi", XSI_NAMESPACE))
                        .with_attribute(("xsi:type", "CanonicalUser"))
                        .write_inner_content(|e| {
                            write_text_element(e, "ID", &self.owner.id)?;
                            write_text_element(e, "DisplayName", &self.owner.display_name)?;
                            Ok(())
                        })?;
                    write_text_element(g, "Permission", "FULL_CONTROL")?;
                    Ok(())
                })?;
                Ok(())
            })?;
        Ok(())
    }
}

impl S3Serialize for CopyObjectOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_timestamp(writer, "LastModified", &self.last_modified)?;
        write_text_element(writer, "ETag", &self.etag)?;
        Ok(())
    }
}
