//! Versioned API status object.
//!
//! [`Status`] is the body Hermes sends for API errors. Its schema follows the
//! Kubernetes `meta/v1` `Status` kind so that existing clients and tooling
//! can decode it without a custom type:
//!
//! ```json
//! {
//!   "kind": "Status",
//!   "apiVersion": "v1",
//!   "status": "Failure",
//!   "code": 429,
//!   "reason": "TooManyRequests",
//!   "message": "slow down",
//!   "details": { "retryAfterSeconds": 30 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Value of the `kind` field stamped on every translated status.
pub const STATUS_KIND: &str = "Status";

/// Value of the `apiVersion` field stamped on every translated status.
pub const STATUS_API_VERSION: &str = "v1";

/// Coarse status flag for a successful outcome.
pub const STATUS_SUCCESS: &str = "Success";

/// Coarse status flag for a failed outcome.
pub const STATUS_FAILURE: &str = "Failure";

/// Machine-readable reason attached to a [`Status`].
///
/// Reasons are open-ended strings on the wire. The associated constants cover
/// the set Hermes produces itself; anything else received from a foreign
/// error is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusReason(Cow<'static, str>);

impl StatusReason {
    /// The server could not classify the error.
    pub const UNKNOWN: Self = Self::from_static("Unknown");
    /// Valid credentials are required.
    pub const UNAUTHORIZED: Self = Self::from_static("Unauthorized");
    /// The caller is not allowed to perform the action.
    pub const FORBIDDEN: Self = Self::from_static("Forbidden");
    /// The resource does not exist.
    pub const NOT_FOUND: Self = Self::from_static("NotFound");
    /// The resource being created already exists.
    pub const ALREADY_EXISTS: Self = Self::from_static("AlreadyExists");
    /// The request conflicts with the current state of the resource.
    pub const CONFLICT: Self = Self::from_static("Conflict");
    /// The resource is no longer available.
    pub const GONE: Self = Self::from_static("Gone");
    /// The submitted data failed validation.
    pub const INVALID: Self = Self::from_static("Invalid");
    /// The server could not finish in time but the request may still succeed.
    pub const SERVER_TIMEOUT: Self = Self::from_static("ServerTimeout");
    /// The request did not complete in the allotted time.
    pub const TIMEOUT: Self = Self::from_static("Timeout");
    /// The caller is being rate limited.
    pub const TOO_MANY_REQUESTS: Self = Self::from_static("TooManyRequests");
    /// The request is malformed.
    pub const BAD_REQUEST: Self = Self::from_static("BadRequest");
    /// The method is not supported for the target.
    pub const METHOD_NOT_ALLOWED: Self = Self::from_static("MethodNotAllowed");
    /// None of the accepted representations can be produced.
    pub const NOT_ACCEPTABLE: Self = Self::from_static("NotAcceptable");
    /// The request body is larger than the server accepts.
    pub const REQUEST_ENTITY_TOO_LARGE: Self = Self::from_static("RequestEntityTooLarge");
    /// The request content type is not supported.
    pub const UNSUPPORTED_MEDIA_TYPE: Self = Self::from_static("UnsupportedMediaType");
    /// An internal error occurred.
    pub const INTERNAL_ERROR: Self = Self::from_static("InternalError");
    /// The service is temporarily unavailable.
    pub const SERVICE_UNAVAILABLE: Self = Self::from_static("ServiceUnavailable");

    /// Creates a reason from a static string.
    #[must_use]
    pub const fn from_static(reason: &'static str) -> Self {
        Self(Cow::Borrowed(reason))
    }

    /// Creates a reason from any string.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(Cow::Owned(reason.into()))
    }

    /// Returns the reason as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Machine-readable description of a single cause within [`StatusDetails`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CauseType(Cow<'static, str>);

impl CauseType {
    /// A required field had no value.
    pub const FIELD_VALUE_REQUIRED: Self = Self(Cow::Borrowed("FieldValueRequired"));
    /// A field value did not pass validation.
    pub const FIELD_VALUE_INVALID: Self = Self(Cow::Borrowed("FieldValueInvalid"));
    /// A field value is a duplicate of one that must be unique.
    pub const FIELD_VALUE_DUPLICATE: Self = Self(Cow::Borrowed("FieldValueDuplicate"));
    /// A field value is not one of the supported values.
    pub const FIELD_VALUE_NOT_SUPPORTED: Self = Self(Cow::Borrowed("FieldValueNotSupported"));
    /// The server returned something it should not have.
    pub const UNEXPECTED_SERVER_RESPONSE: Self =
        Self(Cow::Borrowed("UnexpectedServerResponse"));

    /// Creates a cause type from any string.
    #[must_use]
    pub fn new(cause: impl Into<String>) -> Self {
        Self(Cow::Owned(cause.into()))
    }

    /// Returns the cause type as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One cause of a failure, usually tied to a field of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCause {
    /// Machine-readable cause.
    #[serde(rename = "reason", default, skip_serializing_if = "Option::is_none")]
    pub cause_type: Option<CauseType>,
    /// Human-readable description of the cause.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Path of the offending field, e.g. `spec.replicas`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
}

impl StatusCause {
    /// Creates a cause for a specific field.
    #[must_use]
    pub fn field(
        cause_type: CauseType,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            cause_type: Some(cause_type),
            message: message.into(),
            field: field.into(),
        }
    }

    /// Creates a cause carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            cause_type: None,
            message: message.into(),
            field: String::new(),
        }
    }
}

/// Extended data attached to a [`Status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetails {
    /// Name of the resource the status refers to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// API group of the resource.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    /// Kind of the resource.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Unique identifier of the resource.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    /// Individual causes of the failure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<StatusCause>,
    /// Seconds the client should wait before retrying. Zero means no hint.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub retry_after_seconds: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Structured, versioned description of the outcome of an API call.
///
/// # Example
///
/// ```
/// use hermes_core::{Status, StatusReason};
///
/// let status = Status::failure(404, StatusReason::NOT_FOUND, "user \"bob\" not found");
/// assert!(!status.is_success());
/// assert_eq!(status.code, 404);
///
/// let json = serde_json::to_value(&status).unwrap();
/// assert_eq!(json["kind"], "Status");
/// assert_eq!(json["reason"], "NotFound");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Schema kind tag, always [`STATUS_KIND`] once translated.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Schema version tag, always [`STATUS_API_VERSION`] once translated.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    /// Coarse flag, [`STATUS_SUCCESS`] or [`STATUS_FAILURE`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Suggested HTTP status code, 0 when unset.
    #[serde(default)]
    pub code: u16,
    /// Machine-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<StatusReason>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Extended data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<StatusDetails>,
}

impl Status {
    /// Creates the status reported when there is no error at all.
    #[must_use]
    pub fn success() -> Self {
        Self {
            kind: STATUS_KIND.to_string(),
            api_version: STATUS_API_VERSION.to_string(),
            status: STATUS_SUCCESS.to_string(),
            code: 200,
            ..Self::default()
        }
    }

    /// Creates a failure status with a code, reason and message.
    #[must_use]
    pub fn failure(code: u16, reason: StatusReason, message: impl Into<String>) -> Self {
        Self {
            kind: STATUS_KIND.to_string(),
            api_version: STATUS_API_VERSION.to_string(),
            status: STATUS_FAILURE.to_string(),
            code,
            reason: Some(reason),
            message: Some(message.into()),
            details: None,
        }
    }

    /// Returns a copy of this status with the given details.
    #[must_use]
    pub fn with_details(mut self, details: StatusDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Returns true when the coarse flag is [`STATUS_SUCCESS`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Returns the retry hint when it is positive.
    #[must_use]
    pub fn retry_after_seconds(&self) -> Option<u32> {
        self.details
            .as_ref()
            .map(|d| d.retry_after_seconds)
            .filter(|secs| *secs > 0)
    }

    /// Overwrites the schema tags with [`STATUS_KIND`] and [`STATUS_API_VERSION`].
    pub fn stamp_type_meta(&mut self) {
        self.kind = STATUS_KIND.to_string();
        self.api_version = STATUS_API_VERSION.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        let status = Status::success();
        assert!(status.is_success());
        assert_eq!(status.code, 200);
        assert!(status.message.is_none());
        assert!(status.reason.is_none());
    }

    #[test]
    fn test_failure_serialization_matches_wire_format() {
        let status = Status::failure(429, StatusReason::TOO_MANY_REQUESTS, "slow down")
            .with_details(StatusDetails {
                retry_after_seconds: 30,
                ..StatusDetails::default()
            });

        let json = serde_json::to_value(&status).expect("serialization should work");
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "Status",
                "apiVersion": "v1",
                "status": "Failure",
                "code": 429,
                "reason": "TooManyRequests",
                "message": "slow down",
                "details": { "retryAfterSeconds": 30 }
            })
        );
    }

    #[test]
    fn test_empty_optionals_are_omitted() {
        let json = serde_json::to_string(&Status::success()).expect("serialization should work");
        assert_eq!(
            json,
            r#"{"kind":"Status","apiVersion":"v1","status":"Success","code":200}"#
        );
    }

    #[test]
    fn test_foreign_reason_survives_round_trip() {
        let parsed: Status = serde_json::from_str(
            r#"{"status":"Failure","code":418,"reason":"Teapot","message":"short and stout"}"#,
        )
        .expect("deserialization should work");

        assert_eq!(parsed.reason, Some(StatusReason::new("Teapot")));
        assert!(parsed.kind.is_empty());
    }

    #[test]
    fn test_retry_after_only_when_positive() {
        let mut status = Status::failure(503, StatusReason::SERVICE_UNAVAILABLE, "busy");
        assert_eq!(status.retry_after_seconds(), None);

        status.details = Some(StatusDetails::default());
        assert_eq!(status.retry_after_seconds(), None);

        status.details = Some(StatusDetails {
            retry_after_seconds: 5,
            ..StatusDetails::default()
        });
        assert_eq!(status.retry_after_seconds(), Some(5));
    }

    #[test]
    fn test_cause_serializes_type_as_reason() {
        let cause = StatusCause::field(CauseType::FIELD_VALUE_REQUIRED, "name", "is required");
        let json = serde_json::to_value(&cause).expect("serialization should work");
        assert_eq!(json["reason"], "FieldValueRequired");
        assert_eq!(json["field"], "name");
    }
}
