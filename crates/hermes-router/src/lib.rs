//! # Hermes Router
//!
//! Storage for route-matched path parameters.
//!
//! Hermes does not match routes itself. Whatever router sits in front of the
//! handlers fills a [`Params`] set with the raw (still percent-encoded) values
//! it captured, and the extractors in `hermes-extract` read them back with
//! typed accessors.
//!
//! ```rust
//! use hermes_router::Params;
//!
//! let mut params = Params::new();
//! params.push("owner", "alice");
//! params.set("repo", "hermes");
//!
//! assert_eq!(params.get("owner"), Some("alice"));
//! assert_eq!(params.get("repo"), Some("hermes"));
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod params;

pub use params::{Iter, Params};
