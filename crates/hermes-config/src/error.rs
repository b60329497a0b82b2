//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required file is absent.
    #[error("{}: no such configuration file", path.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("{}: {source}", path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML, or a TOML key Hermes does not know.
    #[error("TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or a JSON key Hermes does not know.
    #[error("JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither TOML nor JSON.
    #[error("unsupported configuration format {0:?}")]
    UnsupportedFormat(String),

    /// An environment override has a value of the wrong shape.
    #[error("{var}={value:?}: expected {expected}")]
    InvalidEnv {
        /// The full variable name.
        var: String,
        /// The rejected value.
        value: String,
        /// What the override accepts.
        expected: &'static str,
    },

    /// A loaded setting fails validation.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted path of the setting, e.g. `render.charset`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid_env(var: &str, value: &str, expected: &'static str) -> Self {
        Self::InvalidEnv {
            var: var.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    pub(crate) fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
