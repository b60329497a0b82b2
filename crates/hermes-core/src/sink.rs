//! Raw response sinks and write tracking.
//!
//! A [`ResponseSink`] is the transport-facing end of a response: a header map,
//! a status line that can be sent once, and a byte stream. Sinks may also
//! report their [`WriteState`]; that capability is what lets middleware and
//! handlers ask "has anything been written yet?" after the fact.
//!
//! Sinks that cannot track writes return `None` from
//! [`ResponseSink::write_state`]. Wrap them in a [`TrackingSink`] to add the
//! capability. [`BufferedSink`] is an in-memory sink that tracks natively and
//! converts into an `http::Response<Bytes>`.

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use std::io;

/// Snapshot of what has been sent through a sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteState {
    /// Status code sent, 0 when nothing has been committed.
    pub status: u16,
    /// Total body bytes written.
    pub bytes_written: usize,
}

impl WriteState {
    /// Returns true once a status code has been sent.
    #[must_use]
    pub fn written(&self) -> bool {
        self.status > 0
    }
}

/// The raw write side of an HTTP response.
pub trait ResponseSink {
    /// Returns the headers that will be sent with the status line.
    fn headers(&self) -> &HeaderMap;

    /// Returns the headers for modification.
    ///
    /// Changes made after the status line was sent have no effect on the
    /// transmitted response.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sends the status line and headers.
    ///
    /// Only the first call takes effect; later calls are ignored by the
    /// transport.
    fn write_header(&mut self, status: StatusCode);

    /// Writes body bytes, sending a `200` status line first if none was sent.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying transport.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Writes the whole buffer.
    ///
    /// # Errors
    ///
    /// Returns `WriteZero` if the sink stops accepting bytes, or any error
    /// from [`write`](Self::write).
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole buffer",
                    ))
                }
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Returns the write state, or `None` if this sink does not track writes.
    fn write_state(&self) -> Option<WriteState> {
        None
    }
}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        (**self).write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn write_state(&self) -> Option<WriteState> {
        (**self).write_state()
    }
}

impl<S: ResponseSink + ?Sized> ResponseSink for Box<S> {
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        (**self).write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn write_state(&self) -> Option<WriteState> {
        (**self).write_state()
    }
}

/// Adds write tracking to a sink that does not track on its own.
///
/// # Example
///
/// ```
/// use hermes_core::{BufferedSink, ResponseSink, TrackingSink};
/// use http::StatusCode;
///
/// let mut sink = TrackingSink::new(BufferedSink::new());
/// assert!(!sink.write_state().unwrap().written());
///
/// sink.write_header(StatusCode::CREATED);
/// sink.write(b"hello").unwrap();
///
/// let state = sink.write_state().unwrap();
/// assert_eq!(state.status, 201);
/// assert_eq!(state.bytes_written, 5);
/// ```
#[derive(Debug, Default)]
pub struct TrackingSink<S> {
    inner: S,
    state: WriteState,
}

impl<S: ResponseSink> TrackingSink<S> {
    /// Wraps `inner` with a fresh write state.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            state: WriteState::default(),
        }
    }

    /// Returns the wrapped sink.
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consumes the tracker and returns the wrapped sink.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ResponseSink> ResponseSink for TrackingSink<S> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        if self.state.written() {
            tracing::debug!(
                previous = self.state.status,
                ignored = status.as_u16(),
                "superfluous write_header call"
            );
            return;
        }
        self.state.status = status.as_u16();
        self.inner.write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.state.written() {
            self.write_header(StatusCode::OK);
        }
        let n = self.inner.write(buf)?;
        self.state.bytes_written += n;
        Ok(n)
    }

    fn write_state(&self) -> Option<WriteState> {
        Some(self.state)
    }
}

/// In-memory sink that records the committed response.
///
/// Headers are snapshotted when the status line is sent, so later header
/// changes do not leak into [`BufferedSink::into_response`], matching what a
/// real transport would transmit.
#[derive(Debug, Default)]
pub struct BufferedSink {
    headers: HeaderMap,
    sent: Option<(StatusCode, HeaderMap)>,
    body: BytesMut,
}

impl BufferedSink {
    /// Creates an empty, uncommitted sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the committed status, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.sent.as_ref().map(|(status, _)| *status)
    }

    /// Returns the headers as they were when the status line was sent.
    #[must_use]
    pub fn sent_headers(&self) -> Option<&HeaderMap> {
        self.sent.as_ref().map(|(_, headers)| headers)
    }

    /// Returns the body written so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the recorded data into an HTTP response.
    ///
    /// An uncommitted sink becomes an empty `200` response with the current
    /// headers, which is what a server sends when a handler writes nothing.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let (status, headers) = self
            .sent
            .unwrap_or_else(|| (StatusCode::OK, self.headers));
        let mut response = Response::new(self.body.freeze());
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl ResponseSink for BufferedSink {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if self.sent.is_none() {
            self.sent = Some((status, self.headers.clone()));
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.sent.is_none() {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn write_state(&self) -> Option<WriteState> {
        Some(WriteState {
            status: self.status().map_or(0, |s| s.as_u16()),
            bytes_written: self.body.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;

    /// A sink that forwards to a buffer but cannot report write state.
    #[derive(Default)]
    struct Untracked(BufferedSink);

    impl ResponseSink for Untracked {
        fn headers(&self) -> &HeaderMap {
            self.0.headers()
        }

        fn headers_mut(&mut self) -> &mut HeaderMap {
            self.0.headers_mut()
        }

        fn write_header(&mut self, status: StatusCode) {
            self.0.write_header(status);
        }

        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }
    }

    #[test]
    fn test_untracked_sink_reports_nothing() {
        let sink = Untracked::default();
        assert!(sink.write_state().is_none());
    }

    #[test]
    fn test_tracking_sink_adds_state() {
        let mut sink = TrackingSink::new(Untracked::default());
        assert_eq!(sink.write_state(), Some(WriteState::default()));

        sink.write(b"abc").expect("write should succeed");
        sink.write(b"de").expect("write should succeed");

        let state = sink.write_state().expect("tracking sink tracks");
        assert_eq!(state.status, 200);
        assert_eq!(state.bytes_written, 5);
    }

    #[test]
    fn test_tracking_sink_first_status_wins() {
        let mut sink = TrackingSink::new(Untracked::default());
        sink.write_header(StatusCode::NOT_FOUND);
        sink.write_header(StatusCode::OK);

        assert_eq!(sink.write_state().map(|s| s.status), Some(404));
        assert_eq!(sink.get_ref().0.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_buffered_sink_snapshots_headers() {
        let mut sink = BufferedSink::new();
        sink.headers_mut()
            .insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        sink.write_header(StatusCode::ACCEPTED);
        sink.headers_mut()
            .insert(header::LOCATION, "/late".parse().unwrap());
        sink.write(b"ok").unwrap();

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert!(response.headers().get(header::LOCATION).is_none());
        assert_eq!(response.body().as_ref(), b"ok");
    }

    #[test]
    fn test_buffered_sink_uncommitted_response() {
        let sink = BufferedSink::new();
        assert_eq!(sink.write_state(), Some(WriteState::default()));

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_write_state_is_stable_between_writes() {
        let mut sink = BufferedSink::new();
        sink.write(b"hello").unwrap();

        let first = sink.write_state();
        let second = sink.write_state();
        assert_eq!(first, second);
    }
}
