//! Parameter accessors forwarded from the writer to its request.
//!
//! Handlers usually hold only the writer, so the extractor surface of
//! [`Request`](hermes_extract::Request) is repeated here verbatim.

use crate::writer::ResponseWriter;
use hermes_core::ResponseSink;
use hermes_extract::MultipartError;

impl<S: ResponseSink> ResponseWriter<S> {
    /// See [`Request::param`](hermes_extract::Request::param).
    pub fn param(&self, name: &str) -> String {
        self.request.param(name)
    }

    /// See [`Request::param_int`](hermes_extract::Request::param_int).
    pub fn param_int(&self, name: &str) -> isize {
        self.request.param_int(name)
    }

    /// See [`Request::param_int64`](hermes_extract::Request::param_int64).
    pub fn param_int64(&self, name: &str) -> i64 {
        self.request.param_int64(name)
    }

    /// See [`Request::param_float64`](hermes_extract::Request::param_float64).
    pub fn param_float64(&self, name: &str) -> f64 {
        self.request.param_float64(name)
    }

    /// See [`Request::set_param`](hermes_extract::Request::set_param).
    pub fn set_param(&mut self, name: &str, value: &str) {
        self.request.set_param(name, value);
    }

    /// See [`Request::query`](hermes_extract::Request::query).
    pub fn query(&self, name: &str) -> String {
        self.request.query(name)
    }

    /// See [`Request::query_or`](hermes_extract::Request::query_or).
    pub fn query_or(&self, name: &str, default: &str) -> String {
        self.request.query_or(name, default)
    }

    /// See [`Request::query_trim`](hermes_extract::Request::query_trim).
    pub fn query_trim(&self, name: &str) -> String {
        self.request.query_trim(name)
    }

    /// See [`Request::query_trim_or`](hermes_extract::Request::query_trim_or).
    pub fn query_trim_or(&self, name: &str, default: &str) -> String {
        self.request.query_trim_or(name, default)
    }

    /// See [`Request::query_strings`](hermes_extract::Request::query_strings).
    pub fn query_strings(&self, name: &str) -> Vec<String> {
        self.request.query_strings(name)
    }

    /// See [`Request::query_strings_or`](hermes_extract::Request::query_strings_or).
    pub fn query_strings_or(&self, name: &str, defaults: &[&str]) -> Vec<String> {
        self.request.query_strings_or(name, defaults)
    }

    /// See [`Request::query_int`](hermes_extract::Request::query_int).
    pub fn query_int(&self, name: &str) -> isize {
        self.request.query_int(name)
    }

    /// See [`Request::query_int_or`](hermes_extract::Request::query_int_or).
    pub fn query_int_or(&self, name: &str, default: isize) -> isize {
        self.request.query_int_or(name, default)
    }

    /// See [`Request::query_int64`](hermes_extract::Request::query_int64).
    pub fn query_int64(&self, name: &str) -> i64 {
        self.request.query_int64(name)
    }

    /// See [`Request::query_int64_or`](hermes_extract::Request::query_int64_or).
    pub fn query_int64_or(&self, name: &str, default: i64) -> i64 {
        self.request.query_int64_or(name, default)
    }

    /// See [`Request::query_bool`](hermes_extract::Request::query_bool).
    pub fn query_bool(&self, name: &str) -> bool {
        self.request.query_bool(name)
    }

    /// See [`Request::query_bool_or`](hermes_extract::Request::query_bool_or).
    pub fn query_bool_or(&self, name: &str, default: bool) -> bool {
        self.request.query_bool_or(name, default)
    }

    /// See [`Request::read_multipart_form`](hermes_extract::Request::read_multipart_form).
    ///
    /// # Errors
    ///
    /// See [`MultipartError`].
    pub async fn read_multipart_form(&mut self) -> Result<usize, MultipartError> {
        self.request.read_multipart_form().await
    }
}
