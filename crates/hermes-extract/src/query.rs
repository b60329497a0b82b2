//! Query and form value accessors.
//!
//! Every accessor comes in two forms: `query_x(name)` and
//! `query_x_or(name, default)`. The default is returned only when `name` is
//! absent. A value that is present but does not parse reads as the type's
//! zero value, not the default.

use crate::request::Request;

impl Request {
    /// Returns the first value for `name`, or an empty string.
    #[must_use]
    pub fn query(&self, name: &str) -> String {
        self.query_or(name, "")
    }

    /// Returns the first value for `name`, or `default` if absent.
    #[must_use]
    pub fn query_or(&self, name: &str, default: &str) -> String {
        self.form.get(name).unwrap_or(default).to_string()
    }

    /// Returns the first value for `name` with surrounding whitespace removed.
    #[must_use]
    pub fn query_trim(&self, name: &str) -> String {
        self.query_trim_or(name, "")
    }

    /// Like [`query_trim`](Self::query_trim), trimming `default` too.
    #[must_use]
    pub fn query_trim_or(&self, name: &str, default: &str) -> String {
        self.form.get(name).unwrap_or(default).trim().to_string()
    }

    /// Returns every value for `name` in order, or an empty vector.
    #[must_use]
    pub fn query_strings(&self, name: &str) -> Vec<String> {
        self.query_strings_or(name, &[])
    }

    /// Returns every value for `name` in order, or `defaults` if absent.
    #[must_use]
    pub fn query_strings_or(&self, name: &str, defaults: &[&str]) -> Vec<String> {
        if !self.form.contains(name) {
            return defaults.iter().map(ToString::to_string).collect();
        }
        self.form.get_all(name).map(str::to_string).collect()
    }

    /// Returns the first value for `name` as a pointer-sized integer, or 0.
    #[must_use]
    pub fn query_int(&self, name: &str) -> isize {
        self.query_int_or(name, 0)
    }

    /// Like [`query_int`](Self::query_int), or `default` if absent.
    #[must_use]
    pub fn query_int_or(&self, name: &str, default: isize) -> isize {
        self.form
            .get(name)
            .map_or(default, |v| v.parse().unwrap_or_default())
    }

    /// Returns the first value for `name` as an `i64`, or 0.
    #[must_use]
    pub fn query_int64(&self, name: &str) -> i64 {
        self.query_int64_or(name, 0)
    }

    /// Returns the first value for `name` as an `i64`, or `default` if absent.
    #[must_use]
    pub fn query_int64_or(&self, name: &str, default: i64) -> i64 {
        self.form
            .get(name)
            .map_or(default, |v| v.parse().unwrap_or_default())
    }

    /// Returns the first value for `name` as a `bool`, or false.
    ///
    /// `1`, `t` and `true` are true; `0`, `f` and `false` are false; case is
    /// ignored. Anything else reads as false.
    #[must_use]
    pub fn query_bool(&self, name: &str) -> bool {
        self.query_bool_or(name, false)
    }

    /// Returns the first value for `name` as a `bool`, or `default` if absent.
    #[must_use]
    pub fn query_bool_or(&self, name: &str, default: bool) -> bool {
        self.form
            .get(name)
            .map_or(default, |v| parse_bool(v).unwrap_or_default())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}
