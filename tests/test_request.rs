use bytes::Bytes;
use rawhttp::http::headers::HeaderMap;
use rawhttp::http::request::{Request, RequestLine};

fn request_with(headers: HeaderMap, body: &'static [u8]) -> Request {
    Request {
        request_line: RequestLine {
            method: "POST".to_string(),
            target: "/api".to_string(),
            http_version: "1.1".to_string(),
        },
        headers,
        body: Bytes::from_static(body),
    }
}

#[test]
fn test_request_header_retrieval() {
    let mut headers = HeaderMap::new();
    headers.set("Host", "example.com");
    headers.set("Content-Type", "application/json");

    let req = request_with(headers, b"");

    assert_eq!(req.header("host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_line_accessors() {
    let req = request_with(HeaderMap::new(), b"");

    assert_eq!(req.method(), "POST");
    assert_eq!(req.target(), "/api");
}

#[test]
fn test_request_content_length_parsing() {
    let mut headers = HeaderMap::new();
    headers.set("Content-Length", "42");

    assert_eq!(request_with(headers, b"").content_length(), 42);
}

#[test]
fn test_request_content_length_missing() {
    assert_eq!(request_with(HeaderMap::new(), b"").content_length(), 0);
}

#[test]
fn test_request_content_length_invalid() {
    let mut headers = HeaderMap::new();
    headers.set("Content-Length", "not-a-number");

    assert_eq!(request_with(headers, b"").content_length(), 0);
}

#[test]
fn test_request_content_length_negative_is_invalid() {
    let mut headers = HeaderMap::new();
    headers.set("Content-Length", "-5");

    assert_eq!(request_with(headers, b"").content_length(), 0);
}

#[test]
fn test_request_with_body() {
    let req = request_with(HeaderMap::new(), b"test body content");

    assert_eq!(&req.body[..], b"test body content");
}
