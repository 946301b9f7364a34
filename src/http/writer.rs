use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::error::{Error, Result};
use crate::http::headers::HeaderMap;
use crate::http::response::{StatusCode, header_block, serialize_fields, status_line};

/// Where a [`ResponseWriter`] is in the response.
///
/// Transitions only move forward. `AwaitingBody` is never left, so the body
/// can be written in any number of pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    AwaitingStatusLine,
    AwaitingHeaders,
    AwaitingBody,
}

/// Writes a response to a sink in strict status line → headers → body order.
///
/// Out-of-order calls fail with [`Error::InvalidWriterState`] before touching
/// the sink. The writer knows nothing about chunked framing beyond the small
/// helpers below, which are plain body writes.
pub struct ResponseWriter<W> {
    sink: W,
    state: WriterState,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: WriterState::AwaitingStatusLine,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// True once any part of the response has been written.
    pub fn has_started(&self) -> bool {
        self.state != WriterState::AwaitingStatusLine
    }

    fn expect(&self, expected: WriterState) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidWriterState {
                expected,
                found: self.state,
            });
        }
        Ok(())
    }

    async fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink
            .write_all(bytes)
            .await
            .map_err(Error::StreamWriteFailure)
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<()> {
        self.expect(WriterState::AwaitingStatusLine)?;
        self.write_raw(status_line(status).as_bytes()).await?;
        self.state = WriterState::AwaitingHeaders;
        Ok(())
    }

    /// Writes every field followed by the blank line ending the header section.
    pub async fn write_headers(&mut self, headers: &HeaderMap) -> Result<()> {
        self.expect(WriterState::AwaitingHeaders)?;
        self.write_raw(&header_block(headers)).await?;
        self.state = WriterState::AwaitingBody;
        Ok(())
    }

    /// Writes body bytes verbatim. May be called repeatedly.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize> {
        self.expect(WriterState::AwaitingBody)?;
        self.write_raw(body).await?;
        Ok(body.len())
    }

    /// Writes one chunk as `<hex len>\r\n<data>\r\n`.
    ///
    /// An empty `data` writes nothing; a zero-length chunk would end the body.
    pub async fn write_chunk(&mut self, data: &[u8]) -> Result<usize> {
        self.expect(WriterState::AwaitingBody)?;
        if data.is_empty() {
            return Ok(0);
        }

        let mut frame = Vec::with_capacity(data.len() + 12);
        frame.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
        frame.extend_from_slice(data);
        frame.extend_from_slice(b"\r\n");
        self.write_raw(&frame).await?;
        Ok(data.len())
    }

    /// Writes the last chunk, `0\r\n`. Trailers follow.
    pub async fn write_chunked_body_done(&mut self) -> Result<()> {
        self.write_body(b"0\r\n").await.map(|_| ())
    }

    /// Writes trailer fields and the blank line that closes a chunked body.
    ///
    /// Exactly one blank line follows the trailers: the message ends
    /// `0\r\n<trailers>\r\n`, with no second CRLF after the trailer block.
    pub async fn write_trailers(&mut self, trailers: &HeaderMap) -> Result<()> {
        self.expect(WriterState::AwaitingBody)?;
        let mut buf = Vec::new();
        serialize_fields(trailers, &mut buf);
        buf.extend_from_slice(b"\r\n");
        self.write_raw(&buf).await
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.sink.flush().await.map_err(Error::StreamWriteFailure)
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
