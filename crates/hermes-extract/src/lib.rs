//! # Hermes Extract
//!
//! The inbound [`Request`] and its typed parameter accessors.
//!
//! | Accessor | Source | Missing | Unparsable |
//! |----------|--------|---------|------------|
//! | [`Request::param`] | Route parameters | `""` | `""` |
//! | [`Request::param_int`], [`Request::param_int64`], [`Request::param_float64`] | Route parameters | `0` | `0` |
//! | [`Request::query`], [`Request::query_trim`] | Query and form values | `""` or default | - |
//! | [`Request::query_strings`] | Query and form values | `[]` or defaults | - |
//! | [`Request::query_int`], [`Request::query_int64`] | Query and form values | `0` or default | `0` |
//! | [`Request::query_bool`] | Query and form values | `false` or default | `false` |
//!
//! Url-encoded body values precede query values. Multipart text fields are
//! appended after both by the async [`Request::read_multipart_form`].
//!
//! Accessors never fail. Defaults apply only to absent keys; a present value
//! that does not parse reads as zero.
//!
//! ## Example
//!
//! ```rust
//! use hermes_extract::Request;
//!
//! let mut req = Request::builder()
//!     .uri("/users/42?limit=abc&sort=name")
//!     .param("id", "42")
//!     .build();
//!
//! assert_eq!(req.param_int(":id"), 42);
//! assert_eq!(req.query_int_or("limit", 20), 0);
//! assert_eq!(req.query_int_or("offset", 20), 20);
//!
//! req.set_param("id", "43");
//! assert_eq!(req.param("id"), "43");
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod multipart;
mod param;
mod query;
mod request;
mod values;

pub use multipart::{MultipartError, MAX_MULTIPART_TEXT};
pub use request::{Request, RequestBuilder};
pub use values::FormValues;
