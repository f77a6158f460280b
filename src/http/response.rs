//! HTTP response building module
//!
//! Provides builders for the responses the server emits, decoupled from
//! specific business logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::cache::CachePolicy;

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND)
}

/// Build a plain-text error response, e.g. `403 Forbidden`
pub fn build_error_response(status: StatusCode) -> Response<Full<Bytes>> {
    let body = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body.clone())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from(body)))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache: Option<CachePolicy>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(304).header("ETag", etag);
    if let Some(policy) = cache {
        builder = builder.header("Cache-Control", policy.to_header_value());
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build a 200 response for file contents
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    etag: Option<&str>,
    cache: Option<CachePolicy>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", data.len());
    if let Some(etag) = etag {
        builder = builder.header("ETag", etag);
    }
    if let Some(policy) = cache {
        builder = builder.header("Cache-Control", policy.to_header_value());
    }
    builder.body(Full::new(data)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build a text response with the given status and content type
pub fn build_text_response(
    status: StatusCode,
    content_type: &str,
    content: String,
) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content.len())
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build generic HTML response
pub fn build_html_response(status: StatusCode, content: String) -> Response<Full<Bytes>> {
    build_text_response(status, "text/html; charset=utf-8", content)
}

/// Build JSON response; never cached
pub fn build_json_response(value: &serde_json::Value) -> Response<Full<Bytes>> {
    let mut response = build_text_response(StatusCode::OK, "application/json", value.to_string());
    if let Ok(header) = CachePolicy::NoCache.to_header_value().parse() {
        response.headers_mut().insert("Cache-Control", header);
    }
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
