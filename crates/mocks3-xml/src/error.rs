//! Error bodies and serializer failures.

use std::io;

use mocks3_model::S3Error;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

/// Errors that can occur while rendering an XML document.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// Writing to the output buffer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// quick-xml rejected the document.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),
}

/// Render an [`S3Error`] as a flat `<Error>` document.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <Error>
///   <Code>NoSuchBucket</Code>
///   <Message>The specified bucket does not exist</Message>
///   <Resource>/mybucket</Resource>
///   <RequestId>4442587FB7D0A2F9</RequestId>
/// </Error>
/// ```
///
/// Returns an empty buffer if the writer fails, which cannot happen for an
/// in-memory `Vec`.
#[must_use]
pub fn error_to_xml(err: &S3Error, request_id: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    if let Err(e) = write_error_xml(&mut buf, err, request_id) {
        tracing::error!(error = %e, code = %err.code, "failed to serialize error body");
        buf.clear();
    }
    buf
}

fn write_error_xml(buf: &mut Vec<u8>, err: &S3Error, request_id: &str) -> io::Result<()> {
    let mut writer = Writer::new(buf);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer.create_element("Error").write_inner_content(|w| {
        w.create_element("Code")
            .write_text_content(BytesText::new(err.code.as_str()))?;
        w.create_element("Message")
            .write_text_content(BytesText::new(&err.message))?;
        if let Some(ref resource) = err.resource {
            w.create_element("Resource")
                .write_text_content(BytesText::new(resource))?;
        }
        w.create_element("RequestId")
            .write_text_content(BytesText::new(request_id))?;
        Ok(())
    })?;
    Ok(())
}
