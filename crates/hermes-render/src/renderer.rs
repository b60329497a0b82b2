//! The shared renderer.
//!
//! A [`Renderer`] holds the render settings and the template registry. It is
//! built once at startup, shared behind an `Arc`, and never mutated
//! afterwards.

use crate::engine::{
    DataEngine, Engine, Head, HtmlEngine, JsonEngine, JsonpEngine, TextEngine, XmlEngine,
    CONTENT_BINARY, CONTENT_JSON, CONTENT_JSONP, CONTENT_TEXT, CONTENT_XML,
};
use crate::error::RenderError;
use crate::template::{Template, TemplateRegistry};
use hermes_core::ResponseSink;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Render settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Charset appended to text content types.
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Pretty-print JSON and JSONP.
    #[serde(default)]
    pub indent_json: bool,

    /// Text written before every JSON document.
    #[serde(default)]
    pub prefix_json: String,

    /// Pretty-print XML.
    #[serde(default)]
    pub indent_xml: bool,

    /// Text written before every XML document.
    #[serde(default)]
    pub prefix_xml: String,

    /// Media type for HTML responses.
    #[serde(default = "default_html_content_type")]
    pub html_content_type: String,

    /// Layout applied to HTML responses that do not pick one.
    #[serde(default)]
    pub layout: Option<String>,

    /// Development mode: pretty-prints JSON and XML regardless of the indent
    /// flags.
    #[serde(default)]
    pub development: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            charset: default_charset(),
            indent_json: false,
            prefix_json: String::new(),
            indent_xml: false,
            prefix_xml: String::new(),
            html_content_type: default_html_content_type(),
            layout: None,
            development: false,
        }
    }
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

fn default_html_content_type() -> String {
    crate::engine::CONTENT_HTML.to_string()
}

/// Per-call HTML options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Layout to wrap the page in. `None` uses the configured default; an
    /// empty string disables the layout for this call.
    pub layout: Option<String>,
}

impl HtmlOptions {
    /// Options selecting `layout`.
    #[must_use]
    pub fn layout(layout: impl Into<String>) -> Self {
        Self {
            layout: Some(layout.into()),
        }
    }

    /// Options that render the page without any layout.
    #[must_use]
    pub fn no_layout() -> Self {
        Self {
            layout: Some(String::new()),
        }
    }
}

/// Encodes payloads through the per-format engines.
///
/// # Example
///
/// ```rust
/// use hermes_core::BufferedSink;
/// use hermes_render::{RenderConfig, Renderer};
/// use http::StatusCode;
///
/// let renderer = Renderer::new(RenderConfig::default());
/// let mut sink = BufferedSink::new();
/// renderer
///     .json(&mut sink, StatusCode::OK, &serde_json::json!({"ok": true}))
///     .unwrap();
///
/// let response = sink.into_response();
/// assert_eq!(response.headers()["content-type"], "application/json; charset=UTF-8");
/// assert_eq!(response.body().as_ref(), br#"{"ok":true}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
    templates: TemplateRegistry,
}

impl Renderer {
    /// Creates a renderer with no templates.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            templates: TemplateRegistry::new(),
        }
    }

    /// Returns a renderer using `templates` for HTML responses.
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    /// Returns the render settings.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Returns the template registry.
    #[must_use]
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Returns the template registered under `name`.
    #[must_use]
    pub fn template_lookup(&self, name: &str) -> Option<Arc<dyn Template>> {
        self.templates.lookup(name)
    }

    /// Renders `data` with a caller-supplied engine.
    pub fn render<T, E>(
        &self,
        sink: &mut dyn ResponseSink,
        engine: &E,
        data: &T,
    ) -> Result<(), RenderError>
    where
        T: ?Sized,
        E: Engine<T> + ?Sized,
    {
        engine.render(sink, data)
    }

    /// Writes raw bytes as `application/octet-stream` unless a content type
    /// is already set.
    pub fn data(
        &self,
        sink: &mut dyn ResponseSink,
        status: StatusCode,
        v: &[u8],
    ) -> Result<(), RenderError> {
        let engine = DataEngine {
            head: Head::new(status, CONTENT_BINARY, None)?,
        };
        engine.render(sink, v)
    }

    /// Executes template `name` and writes it as HTML.
    pub fn html<B: Serialize + ?Sized>(
        &self,
        sink: &mut dyn ResponseSink,
        status: StatusCode,
        name: &str,
        binding: &B,
        opts: &HtmlOptions,
    ) -> Result<(), RenderError> {
        let engine = self.html_engine(status, name, opts)?;
        let binding = serde_json::to_value(binding)?;
        engine.render(sink, &binding)
    }

    /// Executes template `name` and returns the HTML without writing it.
    pub fn html_string<B: Serialize + ?Sized>(
        &self,
        name: &str,
        binding: &B,
        opts: &HtmlOptions,
    ) -> Result<String, RenderError> {
        let engine = self.html_engine(StatusCode::OK, name, opts)?;
        let binding = serde_json::to_value(binding)?;
        engine.execute(&binding)
    }

    /// Writes `v` as JSON.
    pub fn json<T: Serialize + ?Sized>(
        &self,
        sink: &mut dyn ResponseSink,
        status: StatusCode,
        v: &T,
    ) -> Result<(), RenderError> {
        let engine = JsonEngine {
            head: Head::new(status, CONTENT_JSON, Some(&self.config.charset))?,
            indent: self.indent_json(),
            prefix: self.config.prefix_json.clone().into_bytes(),
        };
        engine.render(sink, v)
    }

    /// Writes `v` as a JSONP call to `callback`.
    pub fn jsonp<T: Serialize + ?Sized>(
        &self,
        sink: &mut dyn ResponseSink,
        status: StatusCode,
        callback: &str,
        v: &T,
    ) -> Result<(), RenderError> {
        let engine = JsonpEngine {
            head: Head::new(status, CONTENT_JSONP, Some(&self.config.charset))?,
            indent: self.indent_json(),
            callback: callback.to_string(),
        };
        engine.render(sink, v)
    }

    /// Writes `v` as plain text.
    pub fn text(
        &self,
        sink: &mut dyn ResponseSink,
        status: StatusCode,
        v: &str,
    ) -> Result<(), RenderError> {
        let engine = TextEngine {
            head: Head::new(status, CONTENT_TEXT, Some(&self.config.charset))?,
        };
        engine.render(sink, v)
    }

    /// Writes `v` as XML.
    pub fn xml<T: Serialize + ?Sized>(
        &self,
        sink: &mut dyn ResponseSink,
        status: StatusCode,
        v: &T,
    ) -> Result<(), RenderError> {
        let engine = XmlEngine {
            head: Head::new(status, CONTENT_XML, Some(&self.config.charset))?,
            indent: self.config.indent_xml || self.config.development,
            prefix: self.config.prefix_xml.clone(),
        };
        engine.render(sink, v)
    }

    fn indent_json(&self) -> bool {
        self.config.indent_json || self.config.development
    }

    fn html_engine(
        &self,
        status: StatusCode,
        name: &str,
        opts: &HtmlOptions,
    ) -> Result<HtmlEngine, RenderError> {
        let template = self
            .templates
            .lookup(name)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))?;

        let layout_name = opts
            .layout
            .as_deref()
            .or(self.config.layout.as_deref())
            .filter(|layout| !layout.is_empty());
        let layout = match layout_name {
            Some(layout) => {
                let template = self
                    .templates
                    .lookup(layout)
                    .ok_or_else(|| RenderError::TemplateNotFound(layout.to_string()))?;
                Some((layout.to_string(), template))
            }
            None => None,
        };

        Ok(HtmlEngine {
            head: Head::new(status, &self.config.html_content_type, Some(&self.config.charset))?,
            name: name.to_string(),
            template,
            layout,
        })
    }
}
