//! The per-request response writer.
//!
//! A [`ResponseWriter`] owns one raw [`ResponseSink`] and one inbound
//! [`Request`] for a single request/response cycle. Everything a handler
//! sends goes through it: rendered payloads, plain-text errors, API statuses,
//! redirects and file downloads. The writer reads write state back from the
//! sink, so the sink must track writes (see [`TrackingSink`]).
//!
//! [`TrackingSink`]: hermes_core::TrackingSink

use crate::error::{ResponseError, ResponseResult};
use hermes_core::{
    to_api_status, to_api_status_of, ApiStatus, ApiStatusError, ContextError, ResponseSink,
    Status, WriteState,
};
use hermes_extract::Request;
use hermes_render::{Engine, HtmlOptions, RenderError, Renderer, Template};
use hermes_telemetry::metrics::{record_render_failure, record_response, record_response_bytes};
use http::header::{self, HeaderMap, HeaderValue};
use http::StatusCode;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::Span;

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Writes one response on behalf of a handler.
///
/// Render methods delegate encoding to the shared [`Renderer`]. When encoding
/// fails before anything was sent, the writer answers `500 Render failed,
/// reason: ...` in plain text and still returns the error, so the handler
/// knows the payload never went out.
///
/// Calling a render method twice is not rejected. The second call finds a
/// committed sink; the transport drops its status line and the writer logs a
/// warning.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use hermes::core::BufferedSink;
/// use hermes::extract::Request;
/// use hermes::render::{RenderConfig, Renderer};
/// use hermes::ResponseWriter;
/// use http::StatusCode;
///
/// let renderer = Arc::new(Renderer::new(RenderConfig::default()));
/// let request = Request::builder().uri("/users/7").param("id", "7").build();
/// let mut w = ResponseWriter::new(BufferedSink::new(), request, renderer);
///
/// let id = w.param_int64("id");
/// w.json(StatusCode::OK, &serde_json::json!({ "id": id })).unwrap();
/// assert!(w.written());
/// assert_eq!(w.status(), 200);
///
/// let response = w.into_sink().into_response();
/// assert_eq!(response.body().as_ref(), br#"{"id":7}"#);
/// ```
pub struct ResponseWriter<S> {
    pub(crate) sink: S,
    pub(crate) request: Request,
    pub(crate) renderer: Arc<Renderer>,
    pub(crate) span: Span,
}

impl<S: ResponseSink> ResponseWriter<S> {
    /// Creates a writer for one request.
    ///
    /// Log events are attached to a `hermes.response` span carrying the
    /// request ID, method and path. Use [`with_span`](Self::with_span) to log
    /// under a span of your own instead.
    pub fn new(sink: S, request: Request, renderer: Arc<Renderer>) -> Self {
        let span = tracing::info_span!(
            "hermes.response",
            request_id = %request.context().request_id(),
            method = %request.method(),
            path = request.path(),
        );
        Self {
            sink,
            request,
            renderer,
            span,
        }
    }

    /// Replaces the span log events are attached to.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the span log events are attached to.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Returns the inbound request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the inbound request for modification.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Returns the shared renderer.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Returns the raw sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the writer and returns the raw sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    /// Renders `data` with a caller-supplied engine.
    pub fn render<T, E>(&mut self, engine: &E, data: &T) -> ResponseResult<()>
    where
        T: ?Sized,
        E: Engine<T> + ?Sized,
    {
        self.render_with("custom", |renderer, sink| {
            renderer.render(sink, engine, data)
        })
    }

    /// Writes raw bytes, as `application/octet-stream` unless a content type
    /// is already set.
    pub fn data(&mut self, status: StatusCode, v: &[u8]) -> ResponseResult<()> {
        self.render_with("data", |renderer, sink| renderer.data(sink, status, v))
    }

    /// Executes template `name` with `binding` and writes it as HTML.
    pub fn html<B: Serialize + ?Sized>(
        &mut self,
        status: StatusCode,
        name: &str,
        binding: &B,
        opts: &HtmlOptions,
    ) -> ResponseResult<()> {
        self.render_with("html", |renderer, sink| {
            renderer.html(sink, status, name, binding, opts)
        })
    }

    /// Writes `v` as JSON.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, v: &T) -> ResponseResult<()> {
        self.render_with("json", |renderer, sink| renderer.json(sink, status, v))
    }

    /// Writes `v` as a JSONP call to `callback`.
    pub fn jsonp<T: Serialize + ?Sized>(
        &mut self,
        status: StatusCode,
        callback: &str,
        v: &T,
    ) -> ResponseResult<()> {
        self.render_with("jsonp", |renderer, sink| {
            renderer.jsonp(sink, status, callback, v)
        })
    }

    /// Writes `v` as plain text.
    pub fn text(&mut self, status: StatusCode, v: &str) -> ResponseResult<()> {
        self.render_with("text", |renderer, sink| renderer.text(sink, status, v))
    }

    /// Writes `v` as XML.
    pub fn xml<T: Serialize + ?Sized>(&mut self, status: StatusCode, v: &T) -> ResponseResult<()> {
        self.render_with("xml", |renderer, sink| renderer.xml(sink, status, v))
    }

    /// Executes template `name` and returns the HTML without writing it.
    pub fn html_string<B: Serialize + ?Sized>(
        &self,
        name: &str,
        binding: &B,
        opts: &HtmlOptions,
    ) -> Result<String, RenderError> {
        self.renderer.html_string(name, binding, opts)
    }

    /// Returns the template registered under `name`.
    pub fn template_lookup(&self, name: &str) -> Option<Arc<dyn Template>> {
        self.renderer.template_lookup(name)
    }

    fn render_with<F>(&mut self, format: &'static str, render: F) -> ResponseResult<()>
    where
        F: FnOnce(&Renderer, &mut dyn ResponseSink) -> Result<(), RenderError>,
    {
        self.tracked(|w| {
            if let Some(state) = w.sink.write_state().filter(WriteState::written) {
                tracing::warn!(
                    parent: &w.span,
                    format,
                    previous_status = state.status,
                    "render on an already committed response"
                );
            }

            let renderer: &Renderer = &w.renderer;
            let sink: &mut dyn ResponseSink = &mut w.sink;
            let Err(err) = render(renderer, sink) else {
                return Ok(());
            };

            tracing::error!(parent: &w.span, format, error = %err, "render failed");
            record_render_failure(format);

            let committed = w.sink.write_state().is_some_and(|state| state.written());
            if err.is_encoding() && !committed {
                w.write_plain(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Render failed, reason: {err}"),
                );
            }
            Err(ResponseError::Render(err))
        })
    }

    // ---------------------------------------------------------------------
    // Errors
    // ---------------------------------------------------------------------

    /// Sends the standard reason phrase for `status` as plain text.
    pub fn error(&mut self, status: StatusCode) {
        let message = status.canonical_reason().unwrap_or_default();
        self.tracked(|w| w.write_plain(status, message));
    }

    /// Sends `message` as a plain-text error.
    pub fn error_message(&mut self, status: StatusCode, message: &str) {
        self.tracked(|w| w.write_plain(status, message));
    }

    /// Logs `title` with `err` and sends the error's description as a
    /// plain-text error.
    pub fn error_with_title(&mut self, status: StatusCode, title: &str, err: impl fmt::Display) {
        let message = err.to_string();
        tracing::error!(
            parent: &self.span,
            title,
            error = %message,
            status = status.as_u16(),
            "{title}"
        );
        self.tracked(|w| w.write_plain(status, &message));
    }

    /// Translates `err` into an API [`Status`] and sends it.
    ///
    /// Sets `Retry-After` when the status asks the client to wait. A `204`
    /// status sends the status line only; anything else is sent as JSON.
    /// Returns the status code sent.
    ///
    /// A [`StatusError`](hermes_core::StatusError) is recognised anywhere in
    /// the `source()` chain. Other error types that carry a status must go
    /// through [`api_error_of`](Self::api_error_of) or
    /// [`api_status_error`](Self::api_status_error); behind a plain
    /// `dyn Error` they are sent as an opaque 500.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use hermes::core::{BufferedSink, StatusError};
    /// use hermes::extract::Request;
    /// use hermes::render::Renderer;
    /// use hermes::ResponseWriter;
    ///
    /// let mut w = ResponseWriter::new(
    ///     BufferedSink::new(),
    ///     Request::builder().build(),
    ///     Arc::new(Renderer::default()),
    /// );
    ///
    /// let err = StatusError::too_many_requests("slow down", 30);
    /// assert_eq!(w.api_error(Some(&err)), 429);
    ///
    /// let response = w.into_sink().into_response();
    /// assert_eq!(response.headers()["retry-after"], "30");
    /// ```
    pub fn api_error(&mut self, err: Option<&(dyn Error + 'static)>) -> u16 {
        let status = to_api_status(err);
        self.write_api_status(&status)
    }

    /// Like [`api_error`](Self::api_error) for errors that carry their own
    /// API status. `None` sends `Success`.
    pub fn api_error_of(&mut self, err: Option<&(dyn ApiStatusError + 'static)>) -> u16 {
        let status = match err {
            Some(err) => to_api_status_of(err),
            None => to_api_status(None),
        };
        self.write_api_status(&status)
    }

    /// Like [`api_error`](Self::api_error) for types exposing an API status
    /// directly.
    pub fn api_status_error<T: ApiStatus + ?Sized>(&mut self, value: &T) -> u16 {
        let status = to_api_status_of(value);
        self.write_api_status(&status)
    }

    fn write_api_status(&mut self, status: &Status) -> u16 {
        let code = match StatusCode::from_u16(status.code) {
            Ok(code) => code,
            Err(_) => {
                tracing::error!(
                    parent: &self.span,
                    code = status.code,
                    "API status carries an invalid HTTP code, sending 500"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if let Some(details) = status.details.as_ref() {
            if details.retry_after_seconds > 0 {
                self.sink
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(details.retry_after_seconds));
            }
        }

        if code == StatusCode::NO_CONTENT {
            self.write_header(code);
            return code.as_u16();
        }

        match self.json(code, status) {
            Ok(()) => code.as_u16(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }

    pub(crate) fn write_plain(&mut self, status: StatusCode, message: &str) {
        let headers = self.sink.headers_mut();
        headers.remove(header::CONTENT_LENGTH);
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF8));
        headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        self.sink.write_header(status);

        let mut body = String::with_capacity(message.len() + 1);
        body.push_str(message);
        body.push('\n');
        if let Err(err) = self.sink.write_all(body.as_bytes()) {
            tracing::warn!(parent: &self.span, error = %err, "failed to write error body");
        }
    }

    // ---------------------------------------------------------------------
    // Write state
    // ---------------------------------------------------------------------

    /// Returns true once a status code has been sent.
    ///
    /// # Panics
    ///
    /// Panics if the sink does not track writes.
    pub fn written(&self) -> bool {
        self.write_state().written()
    }

    /// Returns the status code sent, or 0 if nothing was sent.
    ///
    /// # Panics
    ///
    /// Panics if the sink does not track writes.
    pub fn status(&self) -> u16 {
        self.write_state().status
    }

    /// Returns the number of body bytes written.
    ///
    /// # Panics
    ///
    /// Panics if the sink does not track writes.
    pub fn bytes_written(&self) -> usize {
        self.write_state().bytes_written
    }

    fn write_state(&self) -> WriteState {
        match self.sink.write_state() {
            Some(state) => state,
            None => panic!(
                "unsupported method: the response sink does not track writes, \
                 install a tracking layer (hermes::core::TrackingSink)"
            ),
        }
    }

    /// Runs `f` and records what it committed and wrote.
    pub(crate) fn tracked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let before = self.sink.write_state();
        let out = f(self);
        if let (Some(before), Some(after)) = (before, self.sink.write_state()) {
            if !before.written() && after.written() {
                tracing::debug!(
                    parent: &self.span,
                    status = after.status,
                    age_ms = self.request.context().age().as_millis(),
                    "response committed"
                );
                record_response(after.status);
            }
            let written = after.bytes_written.saturating_sub(before.bytes_written);
            if written > 0 {
                record_response_bytes(written);
            }
        }
        out
    }

    // ---------------------------------------------------------------------
    // Direct sink access
    // ---------------------------------------------------------------------

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        self.sink.headers()
    }

    /// Returns the response headers for modification.
    pub fn header_mut(&mut self) -> &mut HeaderMap {
        self.sink.headers_mut()
    }

    /// Sends the status line. Only the first call takes effect.
    pub fn write_header(&mut self, status: StatusCode) {
        self.tracked(|w| w.sink.write_header(status));
    }

    /// Writes body bytes, committing `200` first if nothing was sent.
    pub fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tracked(|w| w.sink.write(buf))
    }

    // ---------------------------------------------------------------------
    // Context
    // ---------------------------------------------------------------------

    /// Returns the request deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.request.context().deadline()
    }

    /// Resolves once the request is cancelled or its deadline passes.
    pub async fn done(&self) {
        self.request.context().done().await;
    }

    /// Returns why the request is done, or `None` while it is live.
    pub fn err(&self) -> Option<ContextError> {
        self.request.context().err()
    }

    /// Looks up a request-scoped value by type.
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.request.context().value::<T>()
    }
}

impl<S> fmt::Debug for ResponseWriter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("method", self.request.method())
            .field("path", &self.request.path())
            .finish_non_exhaustive()
    }
}
