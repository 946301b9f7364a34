//! Request dumping for the `tcplistener` binary.
//!
//! Output layout:
//!
//! ```text
//! Request line:
//! - Method: GET
//! - Target: /
//! - Version: 1.1
//! Headers:
//! - Host:localhost:42069
//! Body:
//!
//! ```

use std::fmt::Write;

use tokio::io::AsyncRead;

use crate::http::connection::read_request;
use crate::http::error::Result;
use crate::http::request::Request;

/// Renders `req` in the dump layout. Body bytes that are not UTF-8 are
/// replaced with U+FFFD.
pub fn render(req: &Request) -> String {
    let mut out = String::new();

    out.push_str("Request line:\n");
    let _ = writeln!(out, "- Method: {}", req.request_line.method);
    let _ = writeln!(out, "- Target: {}", req.request_line.target);
    let _ = writeln!(out, "- Version: {}", req.request_line.http_version);

    out.push_str("Headers:\n");
    req.headers.for_each(|name, value| {
        let _ = writeln!(out, "- {}:{}", name, value);
    });

    out.push_str("Body:\n");
    out.push_str(&String::from_utf8_lossy(&req.body));
    out.push('\n');
    out
}

/// Reads one request from `reader` and renders it.
pub async fn dump_request<R>(reader: &mut R, read_size: usize) -> Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let request = read_request(reader, read_size).await?;
    Ok(render(&request))
}
