//! File downloads.
//!
//! Content is sent as an attachment with `Last-Modified`, conditional
//! (`If-Modified-Since`) and single byte-range support. A `Range` header
//! naming several ranges is ignored and the whole content is sent.

use crate::error::ResponseResult;
use crate::writer::ResponseWriter;
use hermes_core::ResponseSink;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

const CONTENT_DESCRIPTION: HeaderName = HeaderName::from_static("content-description");
const CONTENT_TRANSFER_ENCODING: HeaderName = HeaderName::from_static("content-transfer-encoding");

const COPY_BUF_SIZE: usize = 32 * 1024;

/// An unsatisfiable or malformed `Range` header.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid range: {0}")]
struct RangeError(&'static str);

/// Inclusive byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    fn len(self) -> u64 {
        self.end - self.start + 1
    }
}

impl<S: ResponseSink> ResponseWriter<S> {
    /// Sends `content` as a download named `name`.
    ///
    /// `modified` is sent as `Last-Modified` and compared against
    /// `If-Modified-Since`; a fresh client copy gets `304 Not Modified`.
    /// Without a modification time the current time is used, so the header
    /// is always present. A
    /// single `Range: bytes=` request gets `206 Partial Content`, an
    /// unsatisfiable one `416`.
    ///
    /// Errors are returned only for I/O failures; the client has already been
    /// answered where that was still possible.
    pub fn serve_content<R: Read + Seek>(
        &mut self,
        name: &str,
        mut content: R,
        modified: Option<SystemTime>,
    ) -> ResponseResult<()> {
        self.tracked(|w| w.serve_content_inner(name, &mut content, modified))
    }

    /// Sends the file at `path` as a download.
    ///
    /// The download name defaults to the file's base name. A missing file is
    /// answered with `404`, an unreadable one with `403`, and any other
    /// failure with `500`, all in plain text.
    pub fn serve_file(&mut self, path: impl AsRef<Path>, name: Option<&str>) -> ResponseResult<()> {
        let path = path.as_ref();
        let opened = File::open(path).and_then(|file| {
            let metadata = file.metadata()?;
            if metadata.is_dir() {
                return Err(io::Error::new(io::ErrorKind::NotFound, "path is a directory"));
            }
            Ok((file, metadata.modified().ok()))
        });
        let (file, modified) = match opened {
            Ok(opened) => opened,
            Err(err) => {
                let status = match err.kind() {
                    io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    io::ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
                    _ => {
                        tracing::error!(
                            parent: &self.span,
                            path = %path.display(),
                            error = %err,
                            "failed to open file for download"
                        );
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                self.error(status);
                return Err(err.into());
            }
        };

        let default_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.serve_content(name.unwrap_or(&default_name), file, modified)
    }

    fn serve_content_inner<R: Read + Seek>(
        &mut self,
        name: &str,
        content: &mut R,
        modified: Option<SystemTime>,
    ) -> ResponseResult<()> {
        let size = match content_size(content) {
            Ok(size) => size,
            Err(err) => {
                tracing::error!(parent: &self.span, error = %err, "failed to size download");
                self.write_plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
                return Err(err.into());
            }
        };

        set_download_headers(self.sink.headers_mut(), name);

        let method = self.request.method().clone();
        let modified = modified.unwrap_or_else(SystemTime::now);
        if modified > UNIX_EPOCH {
            if let Ok(value) = HeaderValue::try_from(httpdate::fmt_http_date(modified)) {
                self.sink.headers_mut().insert(header::LAST_MODIFIED, value);
            }
            let conditional = method == Method::GET || method == Method::HEAD;
            if conditional && not_modified(self.request.headers(), modified) {
                let headers = self.sink.headers_mut();
                headers.remove(header::CONTENT_TYPE);
                headers.remove(header::CONTENT_LENGTH);
                self.sink.write_header(StatusCode::NOT_MODIFIED);
                return Ok(());
            }
        }

        let range = match parse_range(self.request.headers().get(header::RANGE), size) {
            Ok(range) => range,
            Err(err) => {
                tracing::debug!(parent: &self.span, error = %err, size, "rejecting range request");
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{size}")) {
                    self.sink.headers_mut().insert(header::CONTENT_RANGE, value);
                }
                self.write_plain(StatusCode::RANGE_NOT_SATISFIABLE, &err.to_string());
                return Ok(());
            }
        };

        let headers = self.sink.headers_mut();
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        let (status, start, len) = match range {
            Some(range) => {
                if let Ok(value) =
                    HeaderValue::from_str(&format!("bytes {}-{}/{size}", range.start, range.end))
                {
                    headers.insert(header::CONTENT_RANGE, value);
                }
                (StatusCode::PARTIAL_CONTENT, range.start, range.len())
            }
            None => (StatusCode::OK, 0, size),
        };
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        self.sink.write_header(status);

        if method == Method::HEAD {
            return Ok(());
        }

        let copied = content
            .seek(SeekFrom::Start(start))
            .and_then(|_| copy_to_sink(&mut content.take(len), &mut self.sink));
        if let Err(err) = copied {
            tracing::error!(parent: &self.span, error = %err, "download interrupted");
            return Err(err.into());
        }
        Ok(())
    }
}

fn content_size<R: Seek>(content: &mut R) -> io::Result<u64> {
    let size = content.seek(SeekFrom::End(0))?;
    content.seek(SeekFrom::Start(0))?;
    Ok(size)
}

fn set_download_headers(headers: &mut HeaderMap, name: &str) {
    headers.insert(CONTENT_DESCRIPTION, HeaderValue::from_static("File Transfer"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    let disposition = HeaderValue::from_str(&format!("attachment; filename={name}"))
        .or_else(|_| {
            HeaderValue::from_str(&format!(
                "attachment; filename*=UTF-8''{}",
                urlencoding::encode(name)
            ))
        });
    if let Ok(disposition) = disposition {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    headers.insert(CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("binary"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("must-revalidate"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("public"));
}

/// Returns true when the client copy, dated by `If-Modified-Since`, is at
/// least as new as `modified`. Compared in whole seconds.
fn not_modified(headers: &HeaderMap, modified: SystemTime) -> bool {
    let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| httpdate::parse_http_date(value).ok())
    else {
        return false;
    };
    let secs = |t: SystemTime| t.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs());
    matches!((secs(modified), secs(since)), (Some(m), Some(s)) if m <= s)
}

/// Parses a single `bytes=` range against `size`.
///
/// Returns `Ok(None)` when there is no header or it lists several ranges.
fn parse_range(header: Option<&HeaderValue>, size: u64) -> Result<Option<ByteRange>, RangeError> {
    let Some(header) = header else {
        return Ok(None);
    };
    let spec = header
        .to_str()
        .map_err(|_| RangeError("header is not ASCII"))?
        .strip_prefix("bytes=")
        .ok_or(RangeError("only byte ranges are supported"))?;
    if spec.contains(',') {
        return Ok(None);
    }

    let (first, last) = spec.split_once('-').ok_or(RangeError("missing '-'"))?;
    let (first, last) = (first.trim(), last.trim());
    if size == 0 {
        return Err(RangeError("failed to overlap"));
    }

    let (start, end) = if first.is_empty() {
        // Suffix range: the last N bytes.
        let suffix: u64 = last.parse().map_err(|_| RangeError("bad suffix length"))?;
        if suffix == 0 {
            return Err(RangeError("failed to overlap"));
        }
        (size.saturating_sub(suffix), size - 1)
    } else {
        let start: u64 = first.parse().map_err(|_| RangeError("bad start"))?;
        let end = if last.is_empty() {
            size - 1
        } else {
            last.parse().map_err(|_| RangeError("bad end"))?
        };
        (start, end)
    };

    if start > end {
        return Err(RangeError("start after end"));
    }
    if start >= size {
        return Err(RangeError("failed to overlap"));
    }
    Ok(Some(ByteRange {
        start,
        end: end.min(size - 1),
    }))
}

fn copy_to_sink<R: Read, S: ResponseSink>(reader: &mut R, sink: &mut S) -> io::Result<()> {
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        sink.write_all(&buf[..n])?;
    }
}
