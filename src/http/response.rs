use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::error::{Error, Result};
use crate::http::headers::HeaderMap;

const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP status codes supported by the server.
///
/// The set is closed: any other numeric code is rejected by
/// [`StatusCode::from_u16`] rather than passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Maps a numeric code onto the supported set.
    ///
    /// # Example
    ///
    /// ```
    /// # use rawhttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::from_u16(400).unwrap(), StatusCode::BadRequest);
    /// assert!(StatusCode::from_u16(404).is_err());
    /// ```
    pub fn from_u16(code: u16) -> Result<Self> {
        match code {
            200 => Ok(StatusCode::Ok),
            400 => Ok(StatusCode::BadRequest),
            500 => Ok(StatusCode::InternalServerError),
            other => Err(Error::UnrecognizedStatusCode(other)),
        }
    }

    /// Returns the numeric HTTP status code.
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Baseline headers for a response with a `content_len` byte body.
///
/// Callers adjust fields with [`HeaderMap::replace`] / [`HeaderMap::delete`]
/// before writing them.
pub fn default_headers(content_len: usize) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.set("Content-Length", content_len.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}

pub(crate) fn status_line(status: StatusCode) -> String {
    format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    )
}

/// Appends every field as `Name: Value\r\n`, without the closing blank line.
pub(crate) fn serialize_fields(headers: &HeaderMap, buf: &mut Vec<u8>) {
    for (k, v) in headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
}

pub(crate) fn header_block(headers: &HeaderMap) -> Vec<u8> {
    let mut buf = Vec::new();
    serialize_fields(headers, &mut buf);

    // Header/body separator
    buf.extend_from_slice(b"\r\n");
    buf
}

/// Writes a status line without any ordering checks.
///
/// Use [`ResponseWriter`](crate::http::writer::ResponseWriter) for normal
/// responses; this is for paths where nothing about earlier output is known.
pub async fn write_status_line<W>(w: &mut W, status: StatusCode) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    w.write_all(status_line(status).as_bytes())
        .await
        .map_err(Error::StreamWriteFailure)
}

/// Writes a header block (fields plus blank line) without ordering checks.
pub async fn write_headers<W>(w: &mut W, headers: &HeaderMap) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    w.write_all(&header_block(headers))
        .await
        .map_err(Error::StreamWriteFailure)
}
