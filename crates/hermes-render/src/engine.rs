//! Per-format render engines.
//!
//! Every engine encodes the full body before touching the sink. An encoding
//! failure therefore leaves the sink uncommitted, and the caller is free to
//! send an error response instead.

use crate::error::RenderError;
use crate::template::Template;
use hermes_core::ResponseSink;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Content type for raw bytes.
pub const CONTENT_BINARY: &str = "application/octet-stream";
/// Content type for HTML.
pub const CONTENT_HTML: &str = "text/html";
/// Content type for JSON.
pub const CONTENT_JSON: &str = "application/json";
/// Content type for JSONP.
pub const CONTENT_JSONP: &str = "application/javascript";
/// Content type for plain text.
pub const CONTENT_TEXT: &str = "text/plain";
/// Content type for XML.
pub const CONTENT_XML: &str = "text/xml";

/// Encodes a payload of type `T` and writes it to a sink.
pub trait Engine<T: ?Sized> {
    /// Writes `data` to `sink`, headers first.
    fn render(&self, sink: &mut dyn ResponseSink, data: &T) -> Result<(), RenderError>;
}

/// Status and content type shared by all engines.
#[derive(Debug, Clone)]
pub struct Head {
    /// Status code to send.
    pub status: StatusCode,
    /// `Content-Type` header value.
    pub content_type: HeaderValue,
}

impl Head {
    /// Creates a head from a media type and an optional charset.
    pub fn new(status: StatusCode, media_type: &str, charset: Option<&str>) -> Result<Self, RenderError> {
        let value = match charset {
            Some(charset) if !charset.is_empty() => format!("{media_type}; charset={charset}"),
            _ => media_type.to_string(),
        };
        let content_type =
            HeaderValue::from_str(&value).map_err(|_| RenderError::ContentType(value.clone()))?;
        Ok(Self {
            status,
            content_type,
        })
    }

    /// Sets `Content-Type` and sends the status line.
    pub fn write(&self, sink: &mut dyn ResponseSink) {
        sink.headers_mut()
            .insert(CONTENT_TYPE, self.content_type.clone());
        sink.write_header(self.status);
    }
}

fn send(sink: &mut dyn ResponseSink, head: &Head, body: &[u8]) -> Result<(), RenderError> {
    head.write(sink);
    sink.write_all(body)?;
    Ok(())
}

/// Raw bytes. A `Content-Type` already present on the sink is kept.
#[derive(Debug, Clone)]
pub struct DataEngine {
    /// Status and fallback content type.
    pub head: Head,
}

impl Engine<[u8]> for DataEngine {
    fn render(&self, sink: &mut dyn ResponseSink, data: &[u8]) -> Result<(), RenderError> {
        if !sink.headers().contains_key(CONTENT_TYPE) {
            sink.headers_mut()
                .insert(CONTENT_TYPE, self.head.content_type.clone());
        }
        sink.write_header(self.head.status);
        sink.write_all(data)?;
        Ok(())
    }
}

/// Plain text.
#[derive(Debug, Clone)]
pub struct TextEngine {
    /// Status and content type.
    pub head: Head,
}

impl Engine<str> for TextEngine {
    fn render(&self, sink: &mut dyn ResponseSink, data: &str) -> Result<(), RenderError> {
        send(sink, &self.head, data.as_bytes())
    }
}

/// JSON through `serde_json`.
#[derive(Debug, Clone)]
pub struct JsonEngine {
    /// Status and content type.
    pub head: Head,
    /// Pretty-print with two-space indentation and a trailing newline.
    pub indent: bool,
    /// Bytes written before the document, e.g. `)]}',\n`.
    pub prefix: Vec<u8>,
}

impl JsonEngine {
    /// Encodes `data` without writing it.
    pub fn encode<T: Serialize + ?Sized>(&self, data: &T) -> Result<Vec<u8>, RenderError> {
        let mut body = self.prefix.clone();
        if self.indent {
            serde_json::to_writer_pretty(&mut body, data)?;
            body.push(b'\n');
        } else {
            serde_json::to_writer(&mut body, data)?;
        }
        Ok(body)
    }
}

impl<T: Serialize + ?Sized> Engine<T> for JsonEngine {
    fn render(&self, sink: &mut dyn ResponseSink, data: &T) -> Result<(), RenderError> {
        let body = self.encode(data)?;
        send(sink, &self.head, &body)
    }
}

/// JSON wrapped in a callback call: `callback(<json>);`.
#[derive(Debug, Clone)]
pub struct JsonpEngine {
    /// Status and content type.
    pub head: Head,
    /// Pretty-print the JSON argument.
    pub indent: bool,
    /// Name of the JavaScript function to call.
    pub callback: String,
}

impl<T: Serialize + ?Sized> Engine<T> for JsonpEngine {
    fn render(&self, sink: &mut dyn ResponseSink, data: &T) -> Result<(), RenderError> {
        let json = if self.indent {
            serde_json::to_vec_pretty(data)?
        } else {
            serde_json::to_vec(data)?
        };

        let mut body = Vec::with_capacity(self.callback.len() + json.len() + 3);
        body.extend_from_slice(self.callback.as_bytes());
        body.push(b'(');
        body.extend_from_slice(&json);
        body.extend_from_slice(b");");
        send(sink, &self.head, &body)
    }
}

/// XML through `quick-xml`'s serde support.
///
/// The root element is named after the serialized type, so `data` must be a
/// struct or an enum.
#[derive(Debug, Clone)]
pub struct XmlEngine {
    /// Status and content type.
    pub head: Head,
    /// Pretty-print with two-space indentation.
    pub indent: bool,
    /// Text written before the document, e.g. an XML declaration.
    pub prefix: String,
}

impl XmlEngine {
    /// Encodes `data` without writing it.
    pub fn encode<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, RenderError> {
        let mut body = self.prefix.clone();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        if self.indent {
            serializer.indent(' ', 2);
        }
        data.serialize(serializer)
            .map_err(|e| RenderError::Xml(e.to_string()))?;
        Ok(body)
    }
}

impl<T: Serialize + ?Sized> Engine<T> for XmlEngine {
    fn render(&self, sink: &mut dyn ResponseSink, data: &T) -> Result<(), RenderError> {
        let body = self.encode(data)?;
        send(sink, &self.head, body.as_bytes())
    }
}

/// A registered HTML template, optionally wrapped in a layout.
///
/// The layout is executed with `{"yield": <inner html>, "binding": <binding>}`.
#[derive(Clone)]
pub struct HtmlEngine {
    /// Status and content type.
    pub head: Head,
    /// Name of the page template, used in errors.
    pub name: String,
    /// Page template.
    pub template: Arc<dyn Template>,
    /// Layout name and template.
    pub layout: Option<(String, Arc<dyn Template>)>,
}

impl HtmlEngine {
    /// Executes the template and layout without writing.
    pub fn execute(&self, binding: &Value) -> Result<String, RenderError> {
        let inner = self
            .template
            .execute(binding)
            .map_err(|source| RenderError::Template {
                name: self.name.clone(),
                source,
            })?;

        match &self.layout {
            Some((name, layout)) => layout
                .execute(&json!({ "yield": inner, "binding": binding }))
                .map_err(|source| RenderError::Template {
                    name: name.clone(),
                    source,
                }),
            None => Ok(inner),
        }
    }
}

impl Engine<Value> for HtmlEngine {
    fn render(&self, sink: &mut dyn ResponseSink, data: &Value) -> Result<(), RenderError> {
        let body = self.execute(data)?;
        send(sink, &self.head, body.as_bytes())
    }
}

impl std::fmt::Debug for HtmlEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlEngine")
            .field("head", &self.head)
            .field("name", &self.name)
            .field("layout", &self.layout.as_ref().map(|(name, _)| name))
            .finish_non_exhaustive()
    }
}
