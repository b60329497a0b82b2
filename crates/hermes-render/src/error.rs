//! Render errors.

use thiserror::Error;

/// Boxed error returned by template functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while encoding or writing a response body.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The payload could not be encoded as JSON.
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload could not be encoded as XML.
    #[error("xml encoding failed: {0}")]
    Xml(String),

    /// No template is registered under the name.
    #[error("html/template: {0:?} is undefined")]
    TemplateNotFound(String),

    /// A template failed while executing.
    #[error("template {name:?} failed: {source}")]
    Template {
        /// Name of the failing template.
        name: String,
        /// Error returned by the template.
        #[source]
        source: BoxError,
    },

    /// The configured charset or content type is not a valid header value.
    #[error("invalid content type {0:?}")]
    ContentType(String),

    /// The sink rejected the body.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Returns true if the error happened before anything was sent.
    ///
    /// Only write errors can occur after the status line went out.
    #[must_use]
    pub fn is_encoding(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
