//! Top-level configuration.

use serde::{Deserialize, Serialize};

use hermes_render::RenderConfig;
use hermes_telemetry::logging::LogConfig;

use crate::ConfigError;

/// Complete Hermes configuration.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert_eq!(config.render.charset, "UTF-8");
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Response rendering.
    #[serde(default)]
    pub render: RenderConfig,

    /// Structured logging.
    #[serde(default)]
    pub logging: LogConfig,
}

impl HermesConfig {
    /// Development preset: pretty logs at debug level, indented JSON and XML.
    #[must_use]
    pub fn development() -> Self {
        Self {
            render: RenderConfig {
                development: true,
                ..RenderConfig::default()
            },
            logging: LogConfig::development(),
        }
    }

    /// Production preset: JSON logs at info level, compact output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            render: RenderConfig::default(),
            logging: LogConfig::production(),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The charset or HTML content type is empty or not a valid header value
    /// - The default layout is set to an empty name
    /// - The log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.charset.is_empty() || !is_header_safe(&self.render.charset) {
            return Err(ConfigError::invalid_value(
                "render.charset",
                format!("invalid charset: {:?}", self.render.charset),
            ));
        }

        if self.render.html_content_type.is_empty()
            || !is_header_safe(&self.render.html_content_type)
        {
            return Err(ConfigError::invalid_value(
                "render.html_content_type",
                format!("invalid media type: {:?}", self.render.html_content_type),
            ));
        }

        if self.render.layout.as_deref() == Some("") {
            return Err(ConfigError::invalid_value(
                "render.layout",
                "must name a template or be omitted",
            ));
        }

        if self.logging.enabled {
            self.logging
                .filter()
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }
}

fn is_header_safe(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b))
}
