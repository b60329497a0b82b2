//! Status-bearing errors.
//!
//! [`StatusError`] is the error type handlers return when they already know
//! how the failure should look on the wire. The status translator recognises
//! it and passes its [`Status`] through; every other error is reported as an
//! opaque `500`.
//!
//! # Example
//!
//! ```
//! use hermes_core::{StatusError, StatusReason};
//!
//! fn find_user(name: &str) -> Result<(), StatusError> {
//!     Err(StatusError::not_found("user", name))
//! }
//!
//! let err = find_user("bob").unwrap_err();
//! assert!(err.is_not_found());
//! assert_eq!(err.code(), 404);
//! assert_eq!(err.to_string(), "user \"bob\" not found");
//! ```

use crate::status::{Status, StatusCause, StatusDetails, StatusReason, STATUS_FAILURE};
use std::error::Error;
use std::fmt;

/// Capability of a value that can describe itself as a [`Status`].
///
/// Implement this for application error types that should be rendered as a
/// structured status without first being converted into a [`StatusError`].
pub trait ApiStatus {
    /// Returns the status describing this value.
    fn api_status(&self) -> Status;
}

/// An error that also carries the [`ApiStatus`] capability.
///
/// Every `Error + ApiStatus` type implements this, so a handler can pass its
/// own error type as `&dyn ApiStatusError` and keep its status.
pub trait ApiStatusError: Error + ApiStatus {}

impl<T: Error + ApiStatus + ?Sized> ApiStatusError for T {}

impl ApiStatus for Status {
    fn api_status(&self) -> Status {
        self.clone()
    }
}

/// An error that carries a structured [`Status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    status: Status,
}

impl StatusError {
    /// Wraps an existing status.
    #[must_use]
    pub fn from_status(status: Status) -> Self {
        Self { status }
    }

    /// Creates a failure with an arbitrary code, reason and message.
    #[must_use]
    pub fn generic(code: u16, reason: StatusReason, message: impl Into<String>) -> Self {
        Self::from_status(Status::failure(code, reason, message))
    }

    /// 400: the request is malformed.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::generic(400, StatusReason::BAD_REQUEST, message)
    }

    /// 401: valid credentials are required.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            "not authorized".to_string()
        } else {
            message
        };
        Self::generic(401, StatusReason::UNAUTHORIZED, message)
    }

    /// 403: the caller may not act on the named resource.
    #[must_use]
    pub fn forbidden(kind: &str, name: &str, message: impl fmt::Display) -> Self {
        Self::generic(
            403,
            StatusReason::FORBIDDEN,
            format!("{kind} \"{name}\" is forbidden: {message}"),
        )
        .with_resource(kind, name)
    }

    /// 404: the named resource does not exist.
    #[must_use]
    pub fn not_found(kind: &str, name: &str) -> Self {
        Self::generic(
            404,
            StatusReason::NOT_FOUND,
            format!("{kind} \"{name}\" not found"),
        )
        .with_resource(kind, name)
    }

    /// 405: the action is not supported on this kind of resource.
    #[must_use]
    pub fn method_not_supported(kind: &str, action: &str) -> Self {
        Self::generic(
            405,
            StatusReason::METHOD_NOT_ALLOWED,
            format!("{action} is not supported on resources of kind \"{kind}\""),
        )
    }

    /// 406: none of the accepted representations can be produced.
    #[must_use]
    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::generic(406, StatusReason::NOT_ACCEPTABLE, message)
    }

    /// 409: the named resource already exists.
    #[must_use]
    pub fn already_exists(kind: &str, name: &str) -> Self {
        Self::generic(
            409,
            StatusReason::ALREADY_EXISTS,
            format!("{kind} \"{name}\" already exists"),
        )
        .with_resource(kind, name)
    }

    /// 409: the request conflicts with the current state of the resource.
    #[must_use]
    pub fn conflict(kind: &str, name: &str, message: impl fmt::Display) -> Self {
        Self::generic(
            409,
            StatusReason::CONFLICT,
            format!("Operation cannot be fulfilled on {kind} \"{name}\": {message}"),
        )
        .with_resource(kind, name)
    }

    /// 410: the resource is no longer available.
    #[must_use]
    pub fn gone(message: impl Into<String>) -> Self {
        Self::generic(410, StatusReason::GONE, message)
    }

    /// 413: the request body is too large.
    #[must_use]
    pub fn request_entity_too_large(message: impl Into<String>) -> Self {
        Self::generic(
            413,
            StatusReason::REQUEST_ENTITY_TOO_LARGE,
            format!("Request entity too large: {}", message.into()),
        )
    }

    /// 415: the request content type is not supported.
    #[must_use]
    pub fn unsupported_media_type(content_type: &str) -> Self {
        Self::generic(
            415,
            StatusReason::UNSUPPORTED_MEDIA_TYPE,
            format!("the body of the request was in an unknown format - accepted media types include: {content_type}"),
        )
    }

    /// 422: the submitted object failed validation.
    #[must_use]
    pub fn invalid(kind: &str, name: &str, causes: Vec<StatusCause>) -> Self {
        let summary = causes
            .iter()
            .map(|cause| {
                if cause.field.is_empty() {
                    cause.message.clone()
                } else {
                    format!("{}: {}", cause.field, cause.message)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let message = if summary.is_empty() {
            format!("{kind} \"{name}\" is invalid")
        } else {
            format!("{kind} \"{name}\" is invalid: {summary}")
        };
        let mut err = Self::generic(422, StatusReason::INVALID, message).with_resource(kind, name);
        if let Some(details) = err.status.details.as_mut() {
            details.causes = causes;
        }
        err
    }

    /// 429: the caller is rate limited and should wait `retry_after_seconds`.
    #[must_use]
    pub fn too_many_requests(message: impl Into<String>, retry_after_seconds: u32) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            "Too many requests, please try again later.".to_string()
        } else {
            message
        };
        Self::generic(429, StatusReason::TOO_MANY_REQUESTS, message)
            .with_retry_after(retry_after_seconds)
    }

    /// 500: an unexpected internal failure.
    #[must_use]
    pub fn internal_error(err: impl fmt::Display) -> Self {
        let cause = err.to_string();
        let mut status = Status::failure(
            500,
            StatusReason::INTERNAL_ERROR,
            format!("Internal error occurred: {cause}"),
        );
        status.details = Some(StatusDetails {
            causes: vec![StatusCause::message(cause)],
            ..StatusDetails::default()
        });
        Self::from_status(status)
    }

    /// 503: the service is temporarily unavailable.
    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::generic(503, StatusReason::SERVICE_UNAVAILABLE, message)
    }

    /// 504: the request did not finish in time; retrying may succeed.
    #[must_use]
    pub fn timeout(message: impl Into<String>, retry_after_seconds: u32) -> Self {
        Self::generic(
            504,
            StatusReason::TIMEOUT,
            format!(
                "The operation could not be completed at this time, please try again: {}",
                message.into()
            ),
        )
        .with_retry_after(retry_after_seconds)
    }

    /// Sets the retry hint carried in the status details.
    #[must_use]
    pub fn with_retry_after(mut self, seconds: u32) -> Self {
        self.status
            .details
            .get_or_insert_with(StatusDetails::default)
            .retry_after_seconds = seconds;
        self
    }

    fn with_resource(mut self, kind: &str, name: &str) -> Self {
        let details = self.status.details.get_or_insert_with(StatusDetails::default);
        details.kind = kind.to_string();
        details.name = name.to_string();
        self
    }

    /// Returns the carried status.
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Consumes the error and returns the carried status.
    #[must_use]
    pub fn into_status(self) -> Status {
        self.status
    }

    /// Returns the status code, 0 when unset.
    #[must_use]
    pub fn code(&self) -> u16 {
        self.status.code
    }

    /// Returns the reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&StatusReason> {
        self.status.reason.as_ref()
    }

    /// Returns true if this error reports a missing resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.reason() == Some(&StatusReason::NOT_FOUND)
    }

    /// Returns true if this error reports a conflicting write.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.reason() == Some(&StatusReason::CONFLICT)
    }

    /// Returns true if this error reports an existing resource.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.reason() == Some(&StatusReason::ALREADY_EXISTS)
    }

    /// Returns true if this error reports rate limiting.
    #[must_use]
    pub fn is_too_many_requests(&self) -> bool {
        self.reason() == Some(&StatusReason::TOO_MANY_REQUESTS) || self.status.code == 429
    }

    /// Returns the number of seconds the client should wait, if the error
    /// suggests a delay.
    #[must_use]
    pub fn suggests_client_delay(&self) -> Option<u32> {
        self.status.retry_after_seconds()
    }
}

impl ApiStatus for StatusError {
    fn api_status(&self) -> Status {
        self.status.clone()
    }
}

impl From<Status> for StatusError {
    fn from(status: Status) -> Self {
        Self::from_status(status)
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status.message, &self.status.reason) {
            (Some(message), _) if !message.is_empty() => f.write_str(message),
            (_, Some(reason)) => write!(f, "{reason}"),
            _ if self.status.status == STATUS_FAILURE || self.status.status.is_empty() => {
                write!(f, "request failed with status code {}", self.status.code)
            }
            _ => write!(f, "status {} ({})", self.status.status, self.status.code),
        }
    }
}

impl Error for StatusError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::CauseType;

    #[test]
    fn test_not_found() {
        let err = StatusError::not_found("user", "bob");
        assert!(err.is_not_found());
        assert_eq!(err.code(), 404);
        assert_eq!(err.to_string(), "user \"bob\" not found");

        let details = err.status().details.as_ref().expect("details should be set");
        assert_eq!(details.kind, "user");
        assert_eq!(details.name, "bob");
    }

    #[test]
    fn test_conflict_message() {
        let err = StatusError::conflict("repo", "hermes", "the object has been modified");
        assert!(err.is_conflict());
        assert_eq!(err.code(), 409);
        assert!(err.to_string().starts_with("Operation cannot be fulfilled on repo"));
    }

    #[test]
    fn test_too_many_requests_carries_retry_hint() {
        let err = StatusError::too_many_requests("", 30);
        assert!(err.is_too_many_requests());
        assert_eq!(err.suggests_client_delay(), Some(30));
        assert_eq!(err.to_string(), "Too many requests, please try again later.");
    }

    #[test]
    fn test_invalid_lists_causes() {
        let err = StatusError::invalid(
            "user",
            "bob",
            vec![
                StatusCause::field(CauseType::FIELD_VALUE_REQUIRED, "email", "is required"),
                StatusCause::field(CauseType::FIELD_VALUE_INVALID, "age", "must be positive"),
            ],
        );

        assert_eq!(err.code(), 422);
        assert_eq!(
            err.to_string(),
            "user \"bob\" is invalid: email: is required, age: must be positive"
        );
        let details = err.status().details.as_ref().expect("details should be set");
        assert_eq!(details.causes.len(), 2);
    }

    #[test]
    fn test_internal_error_keeps_cause() {
        let err = StatusError::internal_error("disk on fire");
        assert_eq!(err.code(), 500);
        assert_eq!(err.to_string(), "Internal error occurred: disk on fire");
        let details = err.status().details.as_ref().expect("details should be set");
        assert_eq!(details.causes[0].message, "disk on fire");
    }

    #[test]
    fn test_display_falls_back_to_reason_then_code() {
        let mut status = Status::failure(409, StatusReason::CONFLICT, "");
        assert_eq!(StatusError::from_status(status.clone()).to_string(), "Conflict");

        status.reason = None;
        assert_eq!(
            StatusError::from_status(status).to_string(),
            "request failed with status code 409"
        );
    }

    #[test]
    fn test_unauthorized_default_message() {
        assert_eq!(StatusError::unauthorized("").to_string(), "not authorized");
    }

    #[test]
    fn test_api_status_capability() {
        let err = StatusError::gone("expired");
        let status = err.api_status();
        assert_eq!(status.code, 410);
        assert_eq!(status.reason, Some(StatusReason::GONE));
    }
}
