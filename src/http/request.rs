use bytes::Bytes;

use crate::http::headers::HeaderMap;

/// The first line of an HTTP request.
///
/// Only `HTTP/1.1` requests are accepted, so `http_version` is always `"1.1"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// The request method token (e.g. "GET")
    pub method: String,
    /// The request target, path plus query (e.g. "/search?q=rust")
    pub target: String,
    /// Version number without the `HTTP/` prefix
    pub http_version: String,
}

/// Represents a fully parsed HTTP request from a client.
///
/// Produced by [`RequestParser`](crate::http::parser::RequestParser) once it
/// reaches the `Done` state; never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_line: RequestLine,
    /// Request headers, looked up case-insensitively
    pub headers: HeaderMap,
    /// Exactly `Content-Length` bytes, empty when the header is absent
    pub body: Bytes,
}

impl Request {
    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    /// Retrieves a header value by name (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number. This leniency
    /// is deliberate: an unparsable length means "no body", not a bad request.
    pub fn content_length(&self) -> usize {
        content_length(&self.headers)
    }
}

pub(crate) fn content_length(headers: &HeaderMap) -> usize {
    headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
