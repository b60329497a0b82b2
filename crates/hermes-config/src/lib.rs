//! Typed configuration for Hermes.
//!
//! A [`HermesConfig`] has two sections: `[render]` feeds the
//! [`Renderer`](hermes_render::Renderer) and `[logging]` feeds
//! [`hermes_telemetry::init_logging`]. [`ConfigLoader`] reads them from a TOML
//! or JSON file, lets `PREFIX__SECTION__KEY` environment variables override
//! single fields, and rejects keys it does not know.
//!
//! # Example
//!
//! ```no_run
//! use hermes_config::ConfigLoader;
//!
//! # fn main() -> Result<(), hermes_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//!
//! hermes_telemetry::init_logging(&config.logging).ok();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [render]
//! charset = "UTF-8"
//! indent_json = false
//! prefix_json = ""
//! indent_xml = false
//! prefix_xml = ""
//! html_content_type = "text/html"
//! layout = "base"
//! development = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `HERMES__RENDER__INDENT_JSON=true`
//! - `HERMES__RENDER__LAYOUT=base`
//! - `HERMES__LOGGING__LEVEL=hermes=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;

pub use config::HermesConfig;
pub use error::ConfigError;
pub use hermes_render::RenderConfig;
pub use hermes_telemetry::{LogConfig, LogFormat};
pub use loader::ConfigLoader;
