//! Telemetry setup errors.

use thiserror::Error;

/// Failure while installing the logging subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level string is not a valid `EnvFilter` directive.
    #[error("invalid log filter {directive:?}: {reason}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// Another global subscriber was installed first.
    #[error("a global subscriber is already installed: {0}")]
    SubscriberInstalled(String),
}
