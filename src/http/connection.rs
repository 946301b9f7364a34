use std::future::Future;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::http::error::{Error, Result};
use crate::http::parser::RequestParser;
use crate::http::request::Request;
use crate::http::response::{self, StatusCode, default_headers};
use crate::http::writer::ResponseWriter;

/// Bytes requested from the stream per read.
pub const DEFAULT_READ_SIZE: usize = 1024;

/// Failure reported by a [`Handler`].
///
/// The connection driver turns it into a response carrying `status` and a
/// plain-text body of `message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} {}", .status.as_u16(), .message)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InternalServerError, message)
    }
}

/// Writer failures inside a handler surface as `500 Internal Server Error`.
impl From<Error> for HandlerError {
    fn from(err: Error) -> Self {
        Self::internal(err.to_string())
    }
}

/// Produces the response for one parsed request.
///
/// The handler writes through `w` in status line → headers → body order.
/// Returning an error makes the driver write a synthesized error response.
/// That response is written even if the handler already produced output,
/// which yields a second status line on the wire; handlers should fail
/// before their first write.
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        w: &mut ResponseWriter<W>,
        req: &Request,
    ) -> impl Future<Output = std::result::Result<(), HandlerError>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

/// Reads one request from `reader` using slide-and-refill buffering.
///
/// Each read appends to the buffer, the parser is fed the whole unconsumed
/// region, and consumed bytes are dropped from the front. End of stream
/// before the request is complete is a [`Error::StreamReadFailure`].
pub async fn read_request<R>(reader: &mut R, read_size: usize) -> Result<Request>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut parser = RequestParser::new();
    let mut buffer = BytesMut::with_capacity(read_size);

    while !parser.is_done() {
        buffer.reserve(read_size);
        let n = reader
            .read_buf(&mut buffer)
            .await
            .map_err(Error::StreamReadFailure)?;

        if n == 0 {
            return Err(Error::StreamReadFailure(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before request was complete",
            )));
        }

        let consumed = parser.parse(&buffer)?;
        buffer.advance(consumed);
    }

    parser.finish().ok_or(Error::RequestInErrorState)
}

/// Writes a complete error response without writer state checks.
pub async fn write_handler_error<W>(w: &mut W, err: &HandlerError) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let headers = default_headers(err.message.len());

    response::write_status_line(w, err.status).await?;
    response::write_headers(w, &headers).await?;
    w.write_all(err.message.as_bytes())
        .await
        .map_err(Error::StreamWriteFailure)
}

fn is_premature_eof(err: &Error) -> bool {
    matches!(err, Error::StreamReadFailure(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
}

/// Handles exactly one request/response exchange on `stream`, then shuts the
/// stream down.
///
/// Malformed requests are answered with `400 Bad Request`; other read
/// failures abort the connection without a response.
pub async fn serve_connection<S, H>(mut stream: S, handler: &H, read_size: usize) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    H: Handler,
{
    let result = exchange(&mut stream, handler, read_size).await;

    if let Err(e) = stream.shutdown().await {
        debug!(error = %e, "Failed to shut down connection");
    }

    result
}

async fn exchange<S, H>(stream: &mut S, handler: &H, read_size: usize) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    H: Handler,
{
    let request = match read_request(stream, read_size).await {
        Ok(request) => request,
        Err(e) if e.is_parse_error() || is_premature_eof(&e) => {
            warn!(error = %e, "Rejecting malformed request");
            let err = HandlerError::new(StatusCode::BadRequest, e.to_string());
            write_handler_error(stream, &err).await?;
            return stream.flush().await.map_err(Error::StreamWriteFailure);
        }
        Err(e) => return Err(e),
    };

    debug!(
        method = request.method(),
        target = request.target(),
        body_len = request.body.len(),
        "Request parsed"
    );

    let mut writer = ResponseWriter::new(&mut *stream);
    let outcome = handler.handle(&mut writer, &request).await;
    let started = writer.has_started();

    if let Err(err) = outcome {
        if started {
            warn!(
                status = err.status.as_u16(),
                error = %err.message,
                "Handler failed after writing output; error response follows it"
            );
        } else {
            warn!(status = err.status.as_u16(), error = %err.message, "Handler failed");
        }
        write_handler_error(stream, &err).await?;
    }

    stream.flush().await.map_err(Error::StreamWriteFailure)
}
