//! HTTP/1.1 protocol implementation.
//!
//! Requests are parsed from raw bytes and responses are written to raw byte
//! sinks; no other HTTP stack is involved.
//!
//! # Architecture
//!
//! - **`headers`**: case-insensitive field map and the field-line parser
//! - **`parser`**: resumable request parser fed from a sliding buffer
//! - **`request`**: the parsed request value
//! - **`response`**: status codes, default headers and unguarded write helpers
//! - **`writer`**: order-enforcing response writer with chunked helpers
//! - **`connection`**: drives one request/response exchange over a stream
//! - **`error`**: error kinds shared by all of the above
//!
//! # Connection flow
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← read, parse, slide buffer; repeat
//!        └──────┬──────┘
//!               │ Request complete        (malformed → 400, close)
//!               ▼
//!        ┌──────────────────┐
//!        │    Handling      │ ← handler writes via ResponseWriter
//!        └──────┬───────────┘
//!               │ Handler returned         (error → synthesized response)
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │ ← one request per connection
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rawhttp::http::headers::HeaderMap;
//! use rawhttp::http::response::StatusCode;
//! use rawhttp::http::writer::ResponseWriter;
//!
//! # tokio_test_block(async {
//! let mut w = ResponseWriter::new(Vec::new());
//! let mut headers = HeaderMap::new();
//! headers.set("Content-Length", "5");
//!
//! w.write_status_line(StatusCode::Ok).await.unwrap();
//! w.write_headers(&headers).await.unwrap();
//! w.write_body(b"hello").await.unwrap();
//!
//! assert_eq!(w.into_inner(), b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello");
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

pub use connection::{Handler, HandlerError};
pub use error::{Error, Result};
pub use headers::HeaderMap;
pub use parser::{ParserState, RequestParser};
pub use request::{Request, RequestLine};
pub use response::StatusCode;
pub use writer::{ResponseWriter, WriterState};
