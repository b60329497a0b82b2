//! `multipart/form-data` text fields.
//!
//! Url-encoded bodies are decoded when a [`Request`] is built. Multipart
//! bodies need an async parser, so their text fields are merged only when a
//! handler asks for them with [`Request::read_multipart_form`]. Text values
//! are appended after the values already present; file parts are skipped.

use crate::request::Request;
use crate::values::FormValues;
use http::header;
use std::io;
use thiserror::Error;

/// Upper bound on the total size of merged text values (32 MiB).
pub const MAX_MULTIPART_TEXT: usize = 32 << 20;

/// Why a multipart body could not be merged.
#[derive(Debug, Error)]
pub enum MultipartError {
    /// No `multipart/form-data` content type, or no usable boundary.
    #[error("request is not multipart/form-data")]
    NotMultipart,

    /// The text fields together exceed [`MAX_MULTIPART_TEXT`].
    #[error("multipart text values exceed {limit} bytes")]
    TooLarge {
        /// The enforced limit.
        limit: usize,
    },

    /// The body does not follow the multipart framing.
    #[error("malformed multipart body: {0}")]
    Malformed(#[from] multer::Error),
}

impl Request {
    /// Parses a `multipart/form-data` body and appends its text fields to
    /// the query and form values, returning how many values were added.
    ///
    /// File parts and unnamed parts are skipped. The body is only read once;
    /// later calls return `Ok(0)`. On error nothing is merged.
    ///
    /// # Errors
    ///
    /// See [`MultipartError`].
    pub async fn read_multipart_form(&mut self) -> Result<usize, MultipartError> {
        if self.multipart_read {
            return Ok(0);
        }

        let content_type = self
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .ok_or(MultipartError::NotMultipart)?;
        let boundary =
            multer::parse_boundary(content_type).map_err(|_| MultipartError::NotMultipart)?;

        let body = self.body().clone();
        let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut values = FormValues::new();
        let mut size = 0;
        while let Some(field) = multipart.next_field().await? {
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().filter(|n| !n.is_empty()).map(str::to_string) else {
                continue;
            };
            let value = field.text().await?;
            size += name.len() + value.len();
            if size > MAX_MULTIPART_TEXT {
                return Err(MultipartError::TooLarge {
                    limit: MAX_MULTIPART_TEXT,
                });
            }
            values.append(name, value);
        }

        self.multipart_read = true;
        let added = values.len();
        tracing::debug!(fields = added, "merged multipart form values");
        self.form.extend(values);
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    const BOUNDARY: &str = "hermes-boundary";

    fn upload(uri: &str, body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}").as_str(),
            )
            .body(body.to_string())
            .build()
    }

    fn body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut out = String::new();
        for (name, file_name, value) in parts {
            out.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file) => out.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\nContent-Type: text/plain\r\n\r\n"
                )),
                None => out.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            out.push_str(value);
            out.push_str("\r\n");
        }
        out.push_str(&format!("--{BOUNDARY}--\r\n"));
        out
    }

    #[tokio::test]
    async fn test_text_fields_follow_query_values() {
        let mut req = upload(
            "/upload?title=from-query",
            &body(&[
                ("title", None, "Release notes"),
                ("attachment", Some("notes.txt"), "file contents"),
                ("draft", None, "true"),
            ]),
        );
        assert_eq!(req.query("title"), "from-query");
        assert!(!req.query_bool("draft"));

        assert_eq!(req.read_multipart_form().await.unwrap(), 2);

        assert_eq!(req.query("title"), "from-query");
        assert_eq!(req.query_strings("title"), vec!["from-query", "Release notes"]);
        assert!(req.query_bool("draft"));
        assert!(!req.form().contains("attachment"));
    }

    #[tokio::test]
    async fn test_second_read_adds_nothing() {
        let mut req = upload("/upload", &body(&[("tag", None, "a")]));

        assert_eq!(req.read_multipart_form().await.unwrap(), 1);
        assert_eq!(req.read_multipart_form().await.unwrap(), 0);
        assert_eq!(req.query_strings("tag"), vec!["a"]);
    }

    #[tokio::test]
    async fn test_url_encoded_request_is_not_multipart() {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("tag=a")
            .build();

        let err = req.read_multipart_form().await.unwrap_err();
        assert!(matches!(err, MultipartError::NotMultipart));
        assert_eq!(req.query_strings("tag"), vec!["a"]);
    }

    #[tokio::test]
    async fn test_truncated_body_is_malformed() {
        let mut req = upload(
            "/upload?tag=q",
            &format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"tag\"\r\n\r\nunterminated"),
        );

        let err = req.read_multipart_form().await.unwrap_err();
        assert!(matches!(err, MultipartError::Malformed(_)));
        assert_eq!(req.query_strings("tag"), vec!["q"]);
    }
}
