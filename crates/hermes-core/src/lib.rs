//! # Hermes Core
//!
//! Core types shared by every Hermes crate:
//!
//! - [`Status`] - Versioned, structured API status object
//! - [`StatusError`] - Status-bearing error and the [`ApiStatus`] capability
//! - [`to_api_status`] - Error to status translation
//! - [`ResponseSink`] - Raw response write side, with [`TrackingSink`] and [`BufferedSink`]
//! - [`RequestContext`] - Cancellation, deadline and typed values for one request

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod sink;
pub mod status;
mod translate;

pub use context::{ContextError, RequestContext, RequestId};
pub use error::{ApiStatus, ApiStatusError, StatusError};
pub use sink::{BufferedSink, ResponseSink, TrackingSink, WriteState};
pub use status::{
    CauseType, Status, StatusCause, StatusDetails, StatusReason, STATUS_API_VERSION,
    STATUS_FAILURE, STATUS_KIND, STATUS_SUCCESS,
};
pub use translate::{normalize_status, to_api_status, to_api_status_of};
