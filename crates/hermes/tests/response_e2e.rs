//! End-to-end response tests.
//!
//! Each test drives a [`ResponseWriter`] the way a handler would, from an
//! `http::Request` through to the `http::Response` the sink would transmit.

use bytes::Bytes;
use hermes::config::ConfigLoader;
use hermes::prelude::*;
use http::header::{self, HeaderMap};
use http::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// A transport sink that cannot report its write state.
#[derive(Default)]
struct RawSink {
    headers: HeaderMap,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl ResponseSink for RawSink {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        self.status.get_or_insert(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

fn renderer() -> Arc<Renderer> {
    let templates = TemplateRegistry::new()
        .with("repo/home", |b: &Value| {
            Ok(format!("<h1>{}</h1>", b["name"].as_str().unwrap_or_default()))
        })
        .with("base", |b: &Value| {
            Ok(format!("<body>{}</body>", b["yield"].as_str().unwrap_or_default()))
        });
    let config = RenderConfig {
        layout: Some("base".to_string()),
        ..RenderConfig::default()
    };
    Arc::new(Renderer::new(config).with_templates(templates))
}

fn writer(request: http::Request<Bytes>, params: Params) -> ResponseWriter<BufferedSink> {
    ResponseWriter::new(
        BufferedSink::new(),
        Request::from_http(request, params),
        renderer(),
    )
}

fn get(uri: &str) -> http::Request<Bytes> {
    http::Request::builder()
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
}

fn body_json(w: ResponseWriter<BufferedSink>) -> (http::Response<Bytes>, Value) {
    let response = w.into_sink().into_response();
    let json = serde_json::from_slice(response.body()).unwrap();
    (response, json)
}

#[test]
fn test_handler_reads_params_and_renders_html() {
    let mut params = Params::new();
    params.push("owner", "ada");
    params.push("repo", "engine%20notes");
    let mut w = writer(get("/ada/engine%20notes?tab=files"), params);

    let name = format!("{}/{}", w.param(":owner"), w.param("repo"));
    assert_eq!(w.query_or("tab", "readme"), "files");

    w.html(
        StatusCode::OK,
        "repo/home",
        &json!({ "name": name }),
        &HtmlOptions::default(),
    )
    .unwrap();

    let response = w.into_sink().into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=UTF-8"
    );
    assert_eq!(
        response.body().as_ref(),
        b"<body><h1>ada/engine notes</h1></body>"
    );
}

#[test]
fn test_form_body_feeds_query_accessors() {
    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/search?q=first")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Bytes::from_static(b"q=second&limit=5"))
        .unwrap();
    let w = writer(request, Params::new());

    assert_eq!(w.query("q"), "second");
    assert_eq!(w.query_strings("q"), vec!["second", "first"]);
    assert_eq!(w.query_int_or("limit", 20), 5);
}

#[tokio::test]
async fn test_multipart_text_fields_feed_query_accessors() {
    let body = "--b\r\nContent-Disposition: form-data; name=\"limit\"\r\n\r\n50\r\n\
                --b\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\n\
                Content-Type: image/png\r\n\r\nPNG\r\n--b--\r\n";
    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/settings?limit=10")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=b")
        .body(Bytes::from(body))
        .unwrap();
    let mut w = writer(request, Params::new());

    assert_eq!(w.read_multipart_form().await.unwrap(), 1);
    assert_eq!(w.query_int("limit"), 10);
    assert_eq!(w.query_strings("limit"), vec!["10", "50"]);
    assert_eq!(w.query("avatar"), "");
}

#[test]
fn test_api_error_with_retry_after() {
    let mut w = writer(get("/api/v1/repos"), Params::new());
    let err = StatusError::too_many_requests("rate limited", 30);

    assert_eq!(w.api_error(Some(&err)), 429);

    let (response, body) = body_json(w);
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    assert_eq!(body["kind"], "Status");
    assert_eq!(body["apiVersion"], "v1");
    assert_eq!(body["status"], "Failure");
    assert_eq!(body["code"], 429);
    assert_eq!(body["reason"], "TooManyRequests");
    assert_eq!(body["details"]["retryAfterSeconds"], 30);
}

#[test]
fn test_api_error_boxed_status_error() {
    let mut w = writer(get("/api/v1/repos/x"), Params::new());
    let err: Box<dyn std::error::Error + Send + Sync> =
        Box::new(StatusError::not_found("repos", "x"));

    assert_eq!(w.api_error(Some(&*err)), 404);

    let (response, body) = body_json(w);
    assert!(response.headers().get(header::RETRY_AFTER).is_none());
    assert_eq!(body["reason"], "NotFound");
}

#[test]
fn test_api_error_opaque_error() {
    let mut w = writer(get("/api/v1/repos"), Params::new());
    let err = io::Error::other("connection refused");

    assert_eq!(w.api_error(Some(&err)), 500);

    let (_, body) = body_json(w);
    assert_eq!(body["status"], "Failure");
    assert_eq!(body["reason"], "Unknown");
    assert_eq!(body["message"], "connection refused");
}

#[test]
fn test_api_error_no_content_writes_no_body() {
    let mut w = writer(get("/api/v1/repos/x"), Params::new());
    let err = StatusError::generic(204, StatusReason::new("Deleted"), "gone for good");

    assert_eq!(w.api_error(Some(&err)), 204);
    assert!(w.written());
    assert_eq!(w.status(), 204);
    assert_eq!(w.bytes_written(), 0);
}

#[test]
fn test_render_failure_produces_plaintext_500() {
    #[derive(Serialize)]
    struct Page {
        #[serde(serialize_with = "fail")]
        broken: u8,
    }

    fn fail<S: serde::Serializer>(_: &u8, _: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("cannot encode page"))
    }

    let mut w = writer(get("/page"), Params::new());
    let err = w.json(StatusCode::OK, &Page { broken: 1 }).unwrap_err();
    assert!(matches!(err, ResponseError::Render(RenderError::Json(_))));

    let response = w.into_sink().into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        response.body().as_ref(),
        b"Render failed, reason: json encoding failed: cannot encode page\n".as_ref()
    );
}

#[test]
fn test_tracking_layer_over_raw_sink() {
    let mut w = ResponseWriter::new(
        TrackingSink::new(RawSink::default()),
        Request::builder().build(),
        renderer(),
    );
    w.text(StatusCode::CREATED, "made").unwrap();

    assert!(w.written());
    assert_eq!(w.status(), 201);
    assert_eq!(w.bytes_written(), 4);

    let raw = w.into_sink().into_inner();
    assert_eq!(raw.status, Some(StatusCode::CREATED));
    assert_eq!(raw.body, b"made");
}

#[test]
#[should_panic(expected = "install a tracking layer")]
fn test_write_state_without_tracking_panics() {
    let w = ResponseWriter::new(RawSink::default(), Request::builder().build(), renderer());
    let _ = w.written();
}

#[test]
fn test_raw_sink_still_renders() {
    let mut w = ResponseWriter::new(RawSink::default(), Request::builder().build(), renderer());
    w.text(StatusCode::ACCEPTED, "queued").unwrap();

    let raw = w.into_sink();
    assert_eq!(raw.status, Some(StatusCode::ACCEPTED));
    assert_eq!(raw.body, b"queued");
}

#[test]
fn test_redirect_to_first_picks_safe_location() {
    let mut w = writer(get("/user/login"), Params::new());
    w.redirect_to_first(
        "https://code.example.org/",
        "/sub",
        &["", "/\\evil.example", "https://phish.example/", "https://code.example.org/explore"],
    );

    let response = w.into_sink().into_response();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://code.example.org/explore"
    );
}

#[test]
fn test_serve_file_with_range() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"hello, range requests").unwrap();

    let request = http::Request::builder()
        .uri("/attachments/1")
        .header(header::RANGE, "bytes=-8")
        .body(Bytes::new())
        .unwrap();
    let mut w = writer(request, Params::new());
    w.serve_file(file.path(), Some("notes.txt")).unwrap();

    let response = w.into_sink().into_response();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=notes.txt"
    );
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 13-20/21");
    assert!(response.headers().contains_key(header::LAST_MODIFIED));
    assert_eq!(response.body().as_ref(), b"requests");
}

#[test]
fn test_serve_file_not_modified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("avatar.png");
    std::fs::write(&path, b"png").unwrap();

    let later = SystemTime::now() + Duration::from_secs(3600);
    let request = http::Request::builder()
        .uri("/avatars/1")
        .header(header::IF_MODIFIED_SINCE, httpdate::fmt_http_date(later))
        .body(Bytes::new())
        .unwrap();
    let mut w = writer(request, Params::new());
    w.serve_file(&path, None).unwrap();

    assert_eq!(w.status(), 304);
    assert_eq!(w.bytes_written(), 0);
    assert_eq!(
        w.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=avatar.png"
    );
}

#[test]
fn test_serve_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut w = writer(get("/attachments/404"), Params::new());

    let err = w.serve_file(dir.path().join("nope.bin"), None).unwrap_err();
    assert!(matches!(err, ResponseError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));

    let response = w.into_sink().into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body().as_ref(), b"Not Found\n");
}

#[test]
fn test_configured_renderer() {
    let config = ConfigLoader::new()
        .with_defaults()
        .with_string(
            r#"
            [render]
            indent_json = true
            prefix_json = "while(1);"
            "#,
            "toml",
        )
        .unwrap()
        .load()
        .unwrap();

    let renderer = Arc::new(Renderer::new(config.render));
    let mut w = ResponseWriter::new(BufferedSink::new(), Request::builder().build(), renderer);
    w.json(StatusCode::OK, &json!({"a": 1})).unwrap();

    assert_eq!(
        w.into_sink().body(),
        b"while(1);{\n  \"a\": 1\n}\n".as_ref()
    );
}

#[tokio::test]
async fn test_context_deadline_forwarded() {
    let ctx = RequestContext::new().with_timeout(Duration::from_millis(10));
    let mut request = get("/slow");
    request.extensions_mut().insert(ctx);
    let w = writer(request, Params::new());

    assert!(w.deadline().is_some());
    w.done().await;
    assert_eq!(w.err(), Some(ContextError::DeadlineExceeded));
}
