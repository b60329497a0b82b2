//! Error to API status translation.
//!
//! [`to_api_status`] turns whatever a handler failed with into a well-formed
//! [`Status`]:
//!
//! | Input | Result |
//! |-------|--------|
//! | no error | `Success`, 200 |
//! | [`StatusError`], or an error whose `source()` chain holds one | its status, with flag and code defaulted |
//! | anything else | `Failure`, 500, reason `Unknown`, message from `Display` |
//!
//! A `dyn Error` cannot be asked for the [`ApiStatus`] capability, so other
//! status-carrying types go through [`to_api_status_of`], which accepts any
//! [`ApiStatus`] value including `dyn ApiStatusError`.
//!
//! Translation never fails and performs no I/O. Inputs that indicate a
//! programming error (an error without a status, or a status with an unknown
//! coarse flag) are reported through `tracing` and the anomaly metric.

use crate::error::{ApiStatus, StatusError};
use crate::status::{Status, StatusReason, STATUS_FAILURE, STATUS_SUCCESS};
use hermes_telemetry::metrics::record_status_anomaly;
use std::error::Error;

/// Converts an optional error into a structured API status.
///
/// The error and then each of its sources are checked for a [`StatusError`];
/// the first one found supplies the status.
///
/// # Example
///
/// ```
/// use hermes_core::{to_api_status, StatusError};
///
/// let ok = to_api_status(None);
/// assert_eq!(ok.code, 200);
///
/// let not_found = StatusError::not_found("user", "bob");
/// assert_eq!(to_api_status(Some(&not_found)).code, 404);
///
/// let io = std::io::Error::other("disk on fire");
/// let status = to_api_status(Some(&io));
/// assert_eq!(status.code, 500);
/// assert_eq!(status.message.as_deref(), Some("disk on fire"));
/// ```
#[must_use]
pub fn to_api_status(err: Option<&(dyn Error + 'static)>) -> Status {
    let Some(err) = err else {
        return Status::success();
    };

    let found = std::iter::successors(Some(err), |&e| e.source())
        .find_map(|e| e.downcast_ref::<StatusError>());

    match found {
        Some(status_err) => normalize_status(status_err.api_status()),
        None => {
            tracing::error!(
                error = %err,
                debug = ?err,
                "received an error that is not a structured API status"
            );
            record_status_anomaly("opaque");
            Status::failure(500, StatusReason::UNKNOWN, err.to_string())
        }
    }
}

/// Converts any value with the [`ApiStatus`] capability into a normalized
/// status.
#[must_use]
pub fn to_api_status_of<T: ApiStatus + ?Sized>(value: &T) -> Status {
    normalize_status(value.api_status())
}

/// Fills in defaults for a status reported by an error.
///
/// An empty flag becomes `Failure`; a zero code becomes 200 for `Success`
/// and 500 otherwise. The `kind`/`apiVersion` tags are always overwritten.
#[must_use]
pub fn normalize_status(mut status: Status) -> Status {
    if status.status.is_empty() {
        status.status = STATUS_FAILURE.to_string();
    }

    match status.status.as_str() {
        STATUS_SUCCESS => {
            if status.code == 0 {
                status.code = 200;
            }
        }
        STATUS_FAILURE => {
            if status.code == 0 {
                status.code = 500;
            }
        }
        other => {
            tracing::error!(
                status = other,
                code = status.code,
                "received an API status with an unknown status field"
            );
            record_status_anomaly("malformed");
            if status.code == 0 {
                status.code = 500;
            }
        }
    }

    status.stamp_type_meta();
    status
}
