//! Upstream fetching for relayed routes
//!
//! Sends a plain HTTP/1.0 GET to the upstream so the reply body is unframed and
//! ends when the upstream closes, then hands the body out in fixed-size
//! segments.

use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

/// Upper bound on the upstream response head
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Fetches paths below a fixed base URL.
#[derive(Debug, Clone)]
pub struct UpstreamRelay {
    base: Url,
    chunk_size: usize,
}

impl UpstreamRelay {
    pub fn new(base: Url, chunk_size: usize) -> Self {
        Self { base, chunk_size }
    }

    pub fn parse(base: &str, chunk_size: usize) -> Result<Self> {
        let base = Url::parse(base).context("Invalid upstream URL")?;
        Ok(Self::new(base, chunk_size))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Request target for `path` below the base URL's path.
    fn target(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build the request bytes sent upstream for `path`
    pub fn build_http_request(&self, path: &str) -> Result<Vec<u8>> {
        let host = self.base.host_str().context("Upstream URL missing host")?;
        let host_value = match self.base.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let mut buffer = Vec::new();
        buffer.extend_from_slice(format!("GET {} HTTP/1.0\r\n", self.target(path)).as_bytes());
        buffer.extend_from_slice(format!("Host: {}\r\n", host_value).as_bytes());
        buffer.extend_from_slice(b"Connection: close\r\n");
        buffer.extend_from_slice(b"\r\n");
        Ok(buffer)
    }

    /// Connect, send the request and read the response head.
    pub async fn open(&self, path: &str) -> Result<UpstreamBody> {
        if self.base.scheme() != "http" {
            anyhow::bail!("Unsupported upstream scheme: {}", self.base.scheme());
        }

        let host = self.base.host_str().context("Upstream URL missing host")?;
        let port = self.base.port_or_known_default().unwrap_or(80);

        let mut stream = TcpStream::connect((host, port))
            .await
            .with_context(|| format!("Failed to connect to upstream {}:{}", host, port))?;

        tracing::trace!(upstream = %self.base, path, "Connected to upstream");

        stream.write_all(&self.build_http_request(path)?).await?;
        stream.flush().await?;

        let mut buffer = BytesMut::with_capacity(self.chunk_size.max(1024));
        let status = read_response_head(&mut stream, &mut buffer).await?;

        Ok(UpstreamBody {
            stream,
            buffer,
            chunk_size: self.chunk_size,
            status,
            eof: false,
        })
    }
}

/// Read until the blank line ending the response head.
///
/// Drops the head from `buffer`, leaving any body bytes already received, and
/// returns the upstream status code.
async fn read_response_head(stream: &mut TcpStream, buffer: &mut BytesMut) -> Result<u16> {
    loop {
        if let Some(headers_end) = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
        {
            let head = buffer.split_to(headers_end + 4);
            return parse_status(&head);
        }

        // Prevent unbounded header growth
        if buffer.len() > MAX_HEAD_SIZE {
            anyhow::bail!("Upstream response headers too large");
        }

        let n = stream.read_buf(buffer).await?;
        if n == 0 {
            anyhow::bail!("Upstream closed before complete response head received");
        }
    }
}

fn parse_status(head: &[u8]) -> Result<u16> {
    let head = std::str::from_utf8(head).context("Invalid UTF-8 in upstream response head")?;
    let status_line = head.lines().next().context("Empty upstream response")?;

    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        anyhow::bail!("Invalid upstream status line: {}", status_line);
    }

    parts
        .next()
        .context("Upstream status line missing code")?
        .parse()
        .context("Invalid upstream status code")
}

/// Body of an upstream response, read until the upstream closes.
#[derive(Debug)]
pub struct UpstreamBody {
    stream: TcpStream,
    buffer: BytesMut,
    chunk_size: usize,
    status: u16,
    eof: bool,
}

impl UpstreamBody {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Next segment of at most `chunk_size` bytes, `None` at end of body.
    pub async fn next_segment(&mut self) -> Result<Option<Bytes>> {
        if self.buffer.is_empty() && !self.eof {
            self.buffer.reserve(self.chunk_size);
            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                self.eof = true;
            }
        }

        if self.buffer.is_empty() {
            return Ok(None);
        }

        let take = self.buffer.len().min(self.chunk_size);
        Ok(Some(self.buffer.split_to(take).freeze()))
    }
}
