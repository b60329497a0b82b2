//! Building a [`HermesConfig`] from defaults, a file and the environment.

use std::env;
use std::fs;
use std::io;
use std::path::Path;

use hermes_telemetry::LogFormat;

use crate::{ConfigError, HermesConfig};

/// Builder that assembles a [`HermesConfig`].
///
/// Sources are applied in call order, then environment overrides, then
/// validation. A file or string source replaces the whole configuration, so
/// anything it leaves out falls back to the defaults rather than to an
/// earlier preset.
///
/// ```no_run
/// use hermes_config::ConfigLoader;
///
/// # fn main() -> Result<(), hermes_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("hermes.toml")?
///     .with_env_prefix("HERMES")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: HermesConfig,
    env_prefix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if name.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    fn parse(self, content: &str) -> Result<HermesConfig, ConfigError> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }
}

impl ConfigLoader {
    /// Starts from [`HermesConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to [`HermesConfig::default`].
    #[must_use]
    pub fn with_defaults(self) -> Self {
        self.with_config(HermesConfig::default())
    }

    /// Resets to [`HermesConfig::development`].
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert!(config.render.development);
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(self) -> Self {
        self.with_config(HermesConfig::development())
    }

    /// Resets to [`HermesConfig::production`].
    #[must_use]
    pub fn with_production(self) -> Self {
        self.with_config(HermesConfig::production())
    }

    /// Uses an already built configuration as the base.
    #[must_use]
    pub fn with_config(mut self, config: HermesConfig) -> Self {
        self.config = config;
        self
    }

    /// Reads a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] when the file is missing,
    /// [`ConfigError::UnsupportedFormat`] for any other extension, and a
    /// parse error when the content is malformed or has unknown keys.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match read_file(path)? {
            Some(config) => Ok(self.with_config(config)),
            None => Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Like [`with_file`](Self::with_file), but a missing file leaves the
    /// configuration untouched.
    ///
    /// # Errors
    ///
    /// Any error of [`with_file`](Self::with_file) other than a missing file.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match read_file(path)? {
            Some(config) => Ok(self.with_config(config)),
            None => {
                tracing::debug!(path = %path.display(), "optional configuration file absent");
                Ok(self)
            }
        }
    }

    /// Parses `content` as `format`, either `"toml"` or `"json"`.
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[render]\nindent_json = true\nlayout = \"base\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.render.indent_json);
    /// assert_eq!(config.render.layout.as_deref(), Some("base"));
    /// ```
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedFormat`] or a parse error.
    pub fn with_string(self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let format =
            Format::from_name(format).ok_or_else(|| ConfigError::UnsupportedFormat(format.to_string()))?;
        Ok(self.with_config(format.parse(content)?))
    }

    /// Enables overrides from variables named `PREFIX__SECTION__KEY`, such as
    /// `HERMES__RENDER__INDENT_JSON=true`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_ascii_uppercase());
        self
    }

    /// Applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidEnv`] for a malformed override and
    /// [`ConfigError::InvalidValue`] when validation fails.
    pub fn load(mut self) -> Result<HermesConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env(&prefix, env::vars())?;
        }
        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration as assembled so far, skipping environment
    /// overrides and validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HermesConfig {
        self.config
    }

    fn apply_env<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (var, value) in vars {
            let Some(key) = var
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix("__"))
            else {
                continue;
            };
            if let Some((section, field)) = key.split_once("__") {
                self.apply_override(&var, section, field, &value)?;
            }
        }
        Ok(())
    }

    fn apply_override(
        &mut self,
        var: &str,
        section: &str,
        field: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let flag = || env_bool(var, value);
        let render = &mut self.config.render;
        let logging = &mut self.config.logging;

        match (section, field) {
            ("RENDER", "CHARSET") => render.charset = value.to_string(),
            ("RENDER", "HTML_CONTENT_TYPE") => render.html_content_type = value.to_string(),
            ("RENDER", "INDENT_JSON") => render.indent_json = flag()?,
            ("RENDER", "PREFIX_JSON") => render.prefix_json = value.to_string(),
            ("RENDER", "INDENT_XML") => render.indent_xml = flag()?,
            ("RENDER", "PREFIX_XML") => render.prefix_xml = value.to_string(),
            ("RENDER", "LAYOUT") => {
                render.layout = Some(value.to_string()).filter(|name| !name.is_empty());
            }
            ("RENDER", "DEVELOPMENT") => render.development = flag()?,

            ("LOGGING", "ENABLED") => logging.enabled = flag()?,
            ("LOGGING", "LEVEL") => logging.level = value.to_string(),
            ("LOGGING", "FORMAT") => {
                logging.format = match value.to_ascii_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    "compact" => LogFormat::Compact,
                    _ => return Err(ConfigError::invalid_env(var, value, "json, pretty or compact")),
                };
            }
            ("LOGGING", "ANSI_ENABLED") => logging.ansi_enabled = flag()?,
            ("LOGGING", "INCLUDE_LOCATION") => logging.include_location = flag()?,
            ("LOGGING", "INCLUDE_TARGET") => logging.include_target = flag()?,

            _ => tracing::warn!(var, "ignoring unknown configuration override"),
        }
        Ok(())
    }
}

/// `Ok(None)` when the file does not exist.
fn read_file(path: &Path) -> Result<Option<HermesConfig>, ConfigError> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_name)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    tracing::debug!(path = %path.display(), ?format, "loaded configuration file");
    format.parse(&content).map(Some)
}

fn env_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_env(var, value, "a boolean")),
    }
}
