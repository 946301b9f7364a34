//! Demo routes served by the binary.
//!
//! | target              | response                                       |
//! |---------------------|------------------------------------------------|
//! | `/yourproblem`      | 400 HTML page                                  |
//! | `/myproblem`        | 500 HTML page                                  |
//! | `/video`            | contents of the configured video file          |
//! | `/httpbin/<path>`   | upstream body relayed with chunked framing     |
//! | anything else       | 200 HTML page                                  |

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;
use tracing::{info, warn};

use crate::config::RoutesConfig;
use crate::http::connection::{Handler, HandlerError};
use crate::http::headers::HeaderMap;
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::ResponseWriter;
use crate::proxy::UpstreamRelay;

pub const BAD_REQUEST_PAGE: &str = "<html><head><title>400 Bad Request</title></head><body><h1>Bad Request</h1><p>Your request honestly kinda sucked.</p></body></html>";

pub const INTERNAL_ERROR_PAGE: &str = "<html><head><title>500 Internal Server Error</title></head><body><h1>Internal Server Error</h1><p>Okay, you know what? This one is on me.</p></body></html>";

pub const OK_PAGE: &str = "<html><head><title>200 OK</title></head><body><h1>Success!</h1><p>Your request was an absolute banger.</p></body></html>";

const RELAY_PREFIX: &str = "/httpbin/";

pub struct DemoRouter {
    video_path: PathBuf,
    relay: UpstreamRelay,
}

impl DemoRouter {
    pub fn new(video_path: impl Into<PathBuf>, relay: UpstreamRelay) -> Self {
        Self {
            video_path: video_path.into(),
            relay,
        }
    }

    pub fn from_config(cfg: &RoutesConfig) -> anyhow::Result<Self> {
        let relay = UpstreamRelay::parse(&cfg.upstream, cfg.relay_chunk_size)?;
        Ok(Self::new(&cfg.video_path, relay))
    }

    async fn video<W>(&self, w: &mut ResponseWriter<W>) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let data = tokio::fs::read(&self.video_path).await.map_err(|e| {
            HandlerError::internal(format!("failed to read {}: {}", self.video_path.display(), e))
        })?;

        let mut headers = default_headers(data.len());
        headers.replace("Content-Type", "video/mp4");

        w.write_status_line(StatusCode::Ok).await?;
        w.write_headers(&headers).await?;
        w.write_body(&data).await?;
        Ok(())
    }

    /// Streams the upstream body as chunks, then trailers carrying its
    /// SHA-256 and length.
    async fn relay<W>(&self, w: &mut ResponseWriter<W>, path: &str) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut upstream = self
            .relay
            .open(path)
            .await
            .map_err(|e| HandlerError::internal(format!("{e:#}")))?;

        info!(
            upstream = %self.relay.base(),
            path,
            status = upstream.status(),
            "Relaying upstream response"
        );

        let mut headers = default_headers(0);
        headers.delete("Content-Length");
        headers.set("Transfer-Encoding", "chunked");
        headers.replace("Content-Type", "text/plain");
        headers.set("Trailer", "X-Content-SHA256");
        headers.set("Trailer", "X-Content-Length");

        w.write_status_line(StatusCode::Ok).await?;
        w.write_headers(&headers).await?;

        let mut hasher = Sha256::new();
        let mut total = 0usize;

        loop {
            let segment = match upstream.next_segment().await {
                Ok(Some(segment)) => segment,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Upstream read failed, ending relayed body");
                    break;
                }
            };

            w.write_chunk(&segment).await?;
            hasher.update(&segment);
            total += segment.len();
        }

        w.write_chunked_body_done().await?;

        let mut trailers = HeaderMap::new();
        trailers.set("X-Content-SHA256", format!("{:x}", hasher.finalize()));
        trailers.set("X-Content-Length", total.to_string());
        w.write_trailers(&trailers).await?;
        Ok(())
    }
}

async fn write_page<W>(
    w: &mut ResponseWriter<W>,
    status: StatusCode,
    page: &str,
) -> Result<(), HandlerError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = default_headers(page.len());
    headers.replace("Content-Type", "text/html");

    w.write_status_line(status).await?;
    w.write_headers(&headers).await?;
    w.write_body(page.as_bytes()).await?;
    Ok(())
}

impl Handler for DemoRouter {
    async fn handle<W>(&self, w: &mut ResponseWriter<W>, req: &Request) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let target = req.target();

        match target {
            "/yourproblem" => write_page(w, StatusCode::BadRequest, BAD_REQUEST_PAGE).await,
            "/myproblem" => write_page(w, StatusCode::InternalServerError, INTERNAL_ERROR_PAGE).await,
            "/video" => self.video(w).await,
            _ => match target.strip_prefix(RELAY_PREFIX) {
                Some(path) => self.relay(w, path).await,
                None => write_page(w, StatusCode::Ok, OK_PAGE).await,
            },
        }
    }
}
