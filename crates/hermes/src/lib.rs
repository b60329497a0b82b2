//! # Hermes
//!
//! **Response abstraction layer for HTTP handlers**
//!
//! Hermes sits between a server's raw write sink and application handlers:
//!
//! - **Rendering** – HTML, JSON, JSONP, XML, plain text and raw bytes behind
//!   one [`ResponseWriter`]
//! - **Parameters** – typed route, query and form accessors with defaults
//! - **API errors** – any error translated into a Kubernetes-style
//!   [`Status`](hermes_core::Status), with `Retry-After` hints
//! - **Write tracking** – has anything been sent, with what status, how many
//!   bytes
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hermes::prelude::*;
//!
//! let renderer = Arc::new(Renderer::new(RenderConfig::default()));
//! let request = Request::builder().uri("/widgets/9?verbose=true").param("id", "9").build();
//! let mut w = ResponseWriter::new(BufferedSink::new(), request, renderer);
//!
//! if w.param_int("id") != 9 {
//!     w.api_error(Some(&StatusError::not_found("widgets", "9")));
//! } else if w.query_bool("verbose") {
//!     w.json(StatusCode::OK, &serde_json::json!({"id": 9, "name": "sprocket"})).unwrap();
//! }
//!
//! assert_eq!(w.status(), 200);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! handler → ResponseWriter → Renderer (encode) → ResponseSink (transmit)
//!              ↓                                     ↑
//!           Request (params, query, context)     write state
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod forward;
mod redirect;
mod serve;
mod writer;

pub use error::{ResponseError, ResponseResult};
pub use writer::ResponseWriter;

// Re-export core types
pub use hermes_core as core;

// Re-export router types
pub use hermes_router as router;

// Re-export extraction types
pub use hermes_extract as extract;

// Re-export render engines
pub use hermes_render as render;

// Re-export telemetry
pub use hermes_telemetry as telemetry;

// Re-export configuration
#[cfg(feature = "config")]
pub use hermes_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ResponseError, ResponseResult, ResponseWriter};

    pub use hermes_core::{
        ApiStatus, BufferedSink, ContextError, RequestContext, RequestId, ResponseSink, Status,
        StatusError, StatusReason, TrackingSink,
    };

    pub use hermes_extract::{MultipartError, Request};

    pub use hermes_render::{HtmlOptions, RenderConfig, RenderError, Renderer, TemplateRegistry};

    pub use hermes_router::Params;

    pub use http::StatusCode;
}
