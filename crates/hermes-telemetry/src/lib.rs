//! Observability for Hermes.
//!
//! - **Logging**: structured logs through `tracing`, with a
//!   `tracing-subscriber` setup helper ([`init_logging`]).
//! - **Metrics**: response counters recorded through the `metrics` facade.
//!   Hermes never installs a recorder; the host application chooses the
//!   exporter.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hermes_responses_total` | Counter | `status` | Responses committed |
//! | `hermes_response_bytes_total` | Counter | - | Body bytes handed to the sink |
//! | `hermes_render_failures_total` | Counter | `format` | Encoding failures |
//! | `hermes_status_anomalies_total` | Counter | `kind` | Errors that needed a fallback status |

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
