//! HTML template lookup.
//!
//! Hermes does not parse templates. Applications compile templates with the
//! engine of their choice and register each one here as a [`Template`]: a
//! function from a JSON binding to an HTML string.

use crate::error::{BoxError, RenderError};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A compiled template.
pub trait Template: Send + Sync {
    /// Executes the template with `binding`.
    fn execute(&self, binding: &Value) -> Result<String, BoxError>;
}

impl<F> Template for F
where
    F: Fn(&Value) -> Result<String, BoxError> + Send + Sync,
{
    fn execute(&self, binding: &Value) -> Result<String, BoxError> {
        self(binding)
    }
}

/// Named set of compiled templates.
///
/// # Example
///
/// ```rust
/// use hermes_render::TemplateRegistry;
///
/// let mut templates = TemplateRegistry::new();
/// templates.register("hello", |binding: &serde_json::Value| {
///     Ok(format!("<p>Hello {}</p>", binding["name"].as_str().unwrap_or("stranger")))
/// });
///
/// let html = templates
///     .execute("hello", &serde_json::json!({"name": "Ada"}))
///     .unwrap();
/// assert_eq!(html, "<p>Hello Ada</p>");
/// ```
#[derive(Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<dyn Template>>,
}

impl TemplateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template function, replacing any template with the same
    /// name.
    pub fn register<F>(&mut self, name: impl Into<String>, template: F)
    where
        F: Fn(&Value) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.register_template(name, template);
    }

    /// Registers any [`Template`] implementation.
    pub fn register_template<T: Template + 'static>(&mut self, name: impl Into<String>, template: T) {
        self.templates.insert(name.into(), Arc::new(template));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, template: F) -> Self
    where
        F: Fn(&Value) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.register(name, template);
        self
    }

    /// Returns the template registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Template>> {
        self.templates.get(name).cloned()
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Returns the registered names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Returns the number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Looks up and executes `name`.
    pub fn execute(&self, name: &str, binding: &Value) -> Result<String, RenderError> {
        let template = self
            .lookup(name)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))?;
        template
            .execute(binding)
            .map_err(|source| RenderError::Template {
                name: name.to_string(),
                source,
            })
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("TemplateRegistry")
            .field("templates", &names)
            .finish()
    }
}
