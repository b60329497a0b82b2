//! Subscriber setup for applications that embed Hermes.
//!
//! The response layer only emits `tracing` events inside a `hermes.response`
//! span. Hosts that already run a subscriber can ignore this module; the rest
//! call [`init_logging`] once, before the first request is served.
//!
//! ```rust,ignore
//! use hermes_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// How events are laid out on stdout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event, span fields included.
    #[default]
    Json,
    /// Multi-line output for terminals.
    Pretty,
    /// Single-line text.
    Compact,
}

/// Subscriber settings, usually read from the `[logging]` config section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// When false, [`init_logging`] installs nothing.
    pub enabled: bool,
    /// `EnvFilter` directive such as `"info"` or `"hermes=debug,warn"`.
    pub level: String,
    /// Output layout.
    pub format: LogFormat,
    /// Emits ANSI color codes.
    pub ansi_enabled: bool,
    /// Adds source file and line to each event.
    pub include_location: bool,
    /// Adds the emitting module path to each event.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            ansi_enabled: false,
            include_location: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Debug-level pretty output with colors and source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            ansi_enabled: true,
            include_location: true,
            ..Self::default()
        }
    }

    /// Info-level JSON, identical to the default.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Parses [`level`](Self::level) into a filter.
    pub fn filter(&self) -> TelemetryResult<EnvFilter> {
        parse_filter(&self.level)
    }

    fn layer(&self) -> TelemetryResult<Box<dyn Layer<Registry> + Send + Sync>> {
        let filter = self.filter()?;
        let base = fmt::layer()
            .with_ansi(self.ansi_enabled)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_target(self.include_target);

        Ok(match self.format {
            LogFormat::Json => base.json().with_filter(filter).boxed(),
            LogFormat::Pretty => base.pretty().with_filter(filter).boxed(),
            LogFormat::Compact => base.compact().with_filter(filter).boxed(),
        })
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing when logging is disabled.
///
/// # Errors
///
/// [`TelemetryError::InvalidFilter`] for a bad level directive and
/// [`TelemetryError::SubscriberInstalled`] when a global subscriber already
/// exists.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(config.layer()?)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInstalled(e.to_string()))
}

/// Parses an `EnvFilter` directive.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] naming the directive.
pub fn parse_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}
