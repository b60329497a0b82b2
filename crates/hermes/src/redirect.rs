//! Redirect responses.

use crate::writer::ResponseWriter;
use hermes_core::ResponseSink;
use http::header::{self, HeaderValue};
use http::{Method, StatusCode};
use url::{ParseError, Url};

/// Throwaway origin used to resolve relative locations against the request
/// path. Only the path, query and fragment of the result are kept.
const RESOLVE_BASE: &str = "http://hermes.invalid/";

impl<S: ResponseSink> ResponseWriter<S> {
    /// Redirects to `location` with `302 Found`.
    pub fn redirect(&mut self, location: &str) {
        self.redirect_with_status(location, StatusCode::FOUND);
    }

    /// Redirects to `location` with `status`.
    ///
    /// A relative location is resolved against the request path. GET and HEAD
    /// requests get an HTML content type, and GET requests a short body
    /// linking to the target, unless the handler already set a content type.
    pub fn redirect_with_status(&mut self, location: &str, status: StatusCode) {
        let target = resolve_location(self.request.path(), location);
        let Ok(value) = HeaderValue::try_from(target.as_str()) else {
            tracing::error!(parent: &self.span, location, "redirect location is not a valid header value");
            self.error(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        };

        tracing::debug!(parent: &self.span, location = %target, status = status.as_u16(), "redirect");
        self.tracked(|w| {
            let method = w.request.method().clone();
            let headers = w.sink.headers_mut();
            let had_content_type = headers.contains_key(header::CONTENT_TYPE);
            headers.insert(header::LOCATION, value);
            if !had_content_type && (method == Method::GET || method == Method::HEAD) {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                );
            }
            w.sink.write_header(status);

            if !had_content_type && method == Method::GET {
                let body = format!(
                    "<a href=\"{}\">{}</a>.\n\n",
                    html_escape(&target),
                    status.canonical_reason().unwrap_or_default()
                );
                if let Err(err) = w.sink.write_all(body.as_bytes()) {
                    tracing::warn!(parent: &w.span, error = %err, "failed to write redirect body");
                }
            }
        });
    }

    /// Redirects to the first acceptable entry of `locations`, or to
    /// `app_sub_url + "/"` when none is.
    ///
    /// An entry is skipped when it is empty, protocol-relative (`//host` or
    /// `/\host`, which browsers treat as a different origin), unparsable, or
    /// an absolute URL outside `app_url` (compared case-insensitively).
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use hermes::core::BufferedSink;
    /// use hermes::extract::Request;
    /// use hermes::render::Renderer;
    /// use hermes::ResponseWriter;
    ///
    /// let mut w = ResponseWriter::new(
    ///     BufferedSink::new(),
    ///     Request::builder().build(),
    ///     Arc::new(Renderer::default()),
    /// );
    /// w.redirect_to_first(
    ///     "https://git.example.com/",
    ///     "",
    ///     &["//evil.example", "https://evil.example/", "/user/settings"],
    /// );
    ///
    /// let response = w.into_sink().into_response();
    /// assert_eq!(response.headers()["location"], "/user/settings");
    /// ```
    pub fn redirect_to_first(&mut self, app_url: &str, app_sub_url: &str, locations: &[&str]) {
        match first_safe_location(app_url, locations) {
            Some(location) => self.redirect(location),
            None => self.redirect(&format!("{app_sub_url}/")),
        }
    }
}

fn first_safe_location<'a>(app_url: &str, locations: &[&'a str]) -> Option<&'a str> {
    let app_url = app_url.to_lowercase();
    locations.iter().copied().find(|location| {
        if location.is_empty() || location.starts_with("//") || location.starts_with("/\\") {
            return false;
        }
        match Url::parse(location) {
            Ok(_) => location.to_lowercase().starts_with(&app_url),
            Err(ParseError::RelativeUrlWithoutBase) => true,
            Err(_) => false,
        }
    })
}

/// Makes a relative location absolute-path, the way browsers would resolve
/// it against the current request path. Absolute and protocol-relative
/// locations are returned unchanged.
fn resolve_location(request_path: &str, location: &str) -> String {
    if location.starts_with("//") {
        return location.to_string();
    }
    if !matches!(Url::parse(location), Err(ParseError::RelativeUrlWithoutBase)) {
        return location.to_string();
    }

    let request_path = if request_path.is_empty() { "/" } else { request_path };
    let resolved = Url::parse(RESOLVE_BASE)
        .and_then(|base| base.join(request_path))
        .and_then(|base| base.join(location));
    match resolved {
        Ok(url) => {
            let mut out = url.path().to_string();
            if let Some(query) = url.query() {
                out.push('?');
                out.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                out.push('#');
                out.push_str(fragment);
            }
            out
        }
        Err(_) => location.to_string(),
    }
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::BufferedSink;
    use hermes_extract::Request;
    use hermes_render::Renderer;
    use std::sync::Arc;

    fn writer(method: Method, uri: &str) -> ResponseWriter<BufferedSink> {
        let request = Request::builder().method(method).uri(uri).build();
        ResponseWriter::new(BufferedSink::new(), request, Arc::new(Renderer::default()))
    }

    fn location(w: ResponseWriter<BufferedSink>) -> String {
        let response = w.into_sink().into_response();
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_redirect_get_body() {
        let mut w = writer(Method::GET, "/login");
        w.redirect("/home?tab=\"x\"");

        assert_eq!(w.status(), 302);
        let response = w.into_sink().into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.starts_with("<a href=\"/home?tab="));
        assert!(body.ends_with("\">Found</a>.\n\n"));
        assert!(!body.contains("\"x\""));
    }

    #[test]
    fn test_redirect_head_and_post() {
        let mut w = writer(Method::HEAD, "/");
        w.redirect("/a");
        assert_eq!(w.bytes_written(), 0);
        assert_eq!(w.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");

        let mut w = writer(Method::POST, "/");
        w.redirect_with_status("/a", StatusCode::SEE_OTHER);
        assert_eq!(w.status(), 303);
        assert_eq!(w.bytes_written(), 0);
        assert!(w.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_redirect_keeps_existing_content_type() {
        let mut w = writer(Method::GET, "/");
        w.header_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        w.redirect("/a");
        assert_eq!(w.bytes_written(), 0);
    }

    #[test]
    fn test_relative_locations_resolve_against_path() {
        assert_eq!(resolve_location("/repo/issues/1", "2"), "/repo/issues/2");
        assert_eq!(resolve_location("/repo/issues/", "../pulls/"), "/repo/pulls/");
        assert_eq!(resolve_location("", "x?y=1"), "/x?y=1");
        assert_eq!(resolve_location("/a/b", "/c"), "/c");
        assert_eq!(
            resolve_location("/a/b", "https://example.com/x"),
            "https://example.com/x"
        );
        assert_eq!(resolve_location("/a/b", "//cdn.example"), "//cdn.example");

        let mut w = writer(Method::GET, "/settings/keys");
        w.redirect("ssh");
        assert_eq!(location(w), "/settings/ssh");
    }

    #[test]
    fn test_redirect_to_first_skips_unsafe() {
        let app = "https://git.example.com/";
        assert_eq!(first_safe_location(app, &["", "//evil", "/\\evil", "/ok"]), Some("/ok"));
        assert_eq!(
            first_safe_location(app, &["https://evil.example/x", "/ok"]),
            Some("/ok")
        );
        assert_eq!(
            first_safe_location(app, &["HTTPS://GIT.EXAMPLE.COM/explore"]),
            Some("HTTPS://GIT.EXAMPLE.COM/explore")
        );
        assert_eq!(first_safe_location(app, &["http://[::1"]), None);
        assert_eq!(first_safe_location(app, &["javascript:alert(1)"]), None);
        assert_eq!(first_safe_location(app, &[]), None);
    }

    #[test]
    fn test_redirect_to_first_fallback() {
        let mut w = writer(Method::GET, "/");
        w.redirect_to_first("https://git.example.com/", "/sub", &["//evil.example"]);
        assert_eq!(location(w), "/sub/");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&#34;x&#34;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
