//! # Hermes Render
//!
//! Multi-format response encoding.
//!
//! | Method | Engine | Content-Type |
//! |--------|--------|--------------|
//! | [`Renderer::data`] | [`DataEngine`] | `application/octet-stream` (unless already set) |
//! | [`Renderer::html`] | [`HtmlEngine`] | `text/html; charset=UTF-8` |
//! | [`Renderer::json`] | [`JsonEngine`] | `application/json; charset=UTF-8` |
//! | [`Renderer::jsonp`] | [`JsonpEngine`] | `application/javascript; charset=UTF-8` |
//! | [`Renderer::text`] | [`TextEngine`] | `text/plain; charset=UTF-8` |
//! | [`Renderer::xml`] | [`XmlEngine`] | `text/xml; charset=UTF-8` |
//!
//! Engines encode the whole body before sending the status line, so a
//! [`RenderError`] other than [`RenderError::Io`] means nothing reached the
//! sink. HTML templates are supplied by the application through a
//! [`TemplateRegistry`].

#![doc(html_root_url = "https://docs.rs/hermes-render/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;
mod error;
mod renderer;
mod template;

pub use engine::{
    DataEngine, Engine, Head, HtmlEngine, JsonEngine, JsonpEngine, TextEngine, XmlEngine,
};
pub use error::{BoxError, RenderError};
pub use renderer::{HtmlOptions, RenderConfig, Renderer};
pub use template::{Template, TemplateRegistry};
