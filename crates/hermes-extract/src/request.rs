//! The inbound request.
//!
//! A [`Request`] bundles everything the parameter accessors read: the HTTP
//! head, the body, the route parameters captured by the router, the decoded
//! query/form values and the request context.

use crate::values::FormValues;
use bytes::Bytes;
use hermes_core::RequestContext;
use hermes_router::Params;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An inbound HTTP request as seen by handlers.
///
/// Query values and url-encoded form values are merged into one ordered
/// [`FormValues`] set when the request is built. Body values come first, so
/// they win over query values of the same name. The body is only decoded for
/// `POST`, `PUT` and `PATCH` requests whose `Content-Type` is
/// `application/x-www-form-urlencoded`; a body that fails to decode is
/// ignored. Multipart text fields are merged on demand by
/// [`read_multipart_form`](Self::read_multipart_form).
///
/// # Example
///
/// ```rust
/// use hermes_extract::Request;
/// use http::Method;
///
/// let req = Request::builder()
///     .method(Method::POST)
///     .uri("/repos/alice?tab=code")
///     .header("content-type", "application/x-www-form-urlencoded")
///     .body("tab=issues&draft=1")
///     .param("owner", "alice")
///     .build();
///
/// assert_eq!(req.param("owner"), "alice");
/// assert_eq!(req.query("tab"), "issues");
/// assert_eq!(req.query_strings("tab"), vec!["issues", "code"]);
/// assert!(req.query_bool("draft"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    pub(crate) params: Params,
    pub(crate) form: FormValues,
    pub(crate) multipart_read: bool,
    context: RequestContext,
}

impl Request {
    /// Creates a request, decoding query and form values.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes, params: Params) -> Self {
        let form = decode_values(&method, &uri, &headers, &body);
        Self {
            method,
            uri,
            headers,
            body,
            params,
            form,
            multipart_read: false,
            context: RequestContext::new(),
        }
    }

    /// Creates a request from an `http::Request` and the router's parameters.
    ///
    /// A [`RequestContext`] found in the request extensions is used as the
    /// request context; otherwise a fresh one is created.
    #[must_use]
    pub fn from_http(request: http::Request<Bytes>, params: Params) -> Self {
        let (mut parts, body) = request.into_parts();
        let context = parts
            .extensions
            .remove::<RequestContext>()
            .unwrap_or_default();
        let mut req = Self::new(parts.method, parts.uri, parts.headers, body, params);
        req.context = context;
        req
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request target as received.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// URI path, still percent-encoded.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the raw query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name`, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw body bytes. Form values are decoded from these at construction.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the route parameters, still percent-encoded.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the decoded query and form values.
    #[must_use]
    pub fn form(&self) -> &FormValues {
        &self.form
    }

    /// Cancellation, deadline and values shared with the handler.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Returns the request context for modification.
    pub fn context_mut(&mut self) -> &mut RequestContext {
        &mut self.context
    }

    /// Replaces the request context.
    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

/// Body values, then query values.
fn decode_values(method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) -> FormValues {
    let query = uri.query().map(FormValues::parse).unwrap_or_default();

    let is_form = matches!(*method, Method::POST | Method::PUT | Method::PATCH)
        && headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE));
    if !is_form {
        return query;
    }

    match FormValues::try_parse_bytes(body) {
        Ok(mut values) => {
            values.extend(query);
            values
        }
        Err(e) => {
            tracing::debug!(error = %e, "ignoring undecodable form body");
            query
        }
    }
}

/// Assembles a [`Request`] outside a server, mostly for tests.
///
/// Method defaults to `GET` and the URI to `/`.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    params: Params,
    context: Option<RequestContext>,
}

impl RequestBuilder {
    /// Same as [`Request::builder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults to `GET`.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI. An unparsable URI is ignored.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        if let Ok(uri) = uri.parse() {
            self.uri = Some(uri);
        }
        self
    }

    /// Adds a single header. An invalid name or value is ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the route parameters.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Adds a single raw route parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(name, value);
        self
    }

    /// Sets the request context.
    #[must_use]
    pub fn context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Builds the request.
    #[must_use]
    pub fn build(self) -> Request {
        let mut req = Request::new(
            self.method.unwrap_or(Method::GET),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.body,
            self.params,
        );
        if let Some(context) = self.context {
            req.context = context;
        }
        req
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let mut params = Params::new();
        params.push("userId", "42");

        let req = Request::new(
            Method::GET,
            Uri::from_static("/users/42?active=true"),
            HeaderMap::new(),
            Bytes::new(),
            params,
        );

        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.query_string(), Some("active=true"));
        assert_eq!(req.params().get("userId"), Some("42"));
        assert_eq!(req.form().get("active"), Some("true"));
    }

    #[test]
    fn test_builder_defaults() {
        let req = Request::builder().build();
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.path(), "/");
        assert!(req.form().is_empty());
    }

    #[test]
    fn test_form_body_takes_precedence_over_query() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/submit?a=query&c=3")
            .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .body("a=body&b=2")
            .build();

        let pairs: Vec<_> = req.form().iter().collect();
        assert_eq!(pairs, vec![("a", "body"), ("b", "2"), ("a", "query"), ("c", "3")]);
        assert_eq!(req.query("a"), "body");
    }

    #[test]
    fn test_non_form_body_keeps_query_values() {
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/submit?a=query")
            .header("content-type", "application/json")
            .body("a=body")
            .build();

        assert_eq!(req.query_strings("a"), vec!["query"]);
    }

    #[test]
    fn test_body_ignored_for_other_content_types() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/submit")
            .header("content-type", "application/json")
            .body("a=body")
            .build();

        assert!(req.form().is_empty());
    }

    #[test]
    fn test_body_ignored_for_get() {
        let req = Request::builder()
            .uri("/submit")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("a=body")
            .build();

        assert!(req.form().is_empty());
    }

    #[test]
    fn test_from_http_keeps_context() {
        let context = RequestContext::new();
        let id = context.request_id();
        let request = http::Request::builder()
            .method(Method::PUT)
            .uri("/items/7?x=1")
            .extension(context)
            .body(Bytes::new())
            .unwrap();

        let req = Request::from_http(request, Params::new());
        assert_eq!(req.method(), &Method::PUT);
        assert_eq!(req.context().request_id(), id);
        assert_eq!(req.form().get("x"), Some("1"));
    }

    #[test]
    fn test_header_access() {
        let req = Request::builder()
            .header("x-request-id", "abc-123")
            .build();

        assert_eq!(req.header("x-request-id"), Some("abc-123"));
        assert_eq!(req.header("missing"), None);
    }
}
