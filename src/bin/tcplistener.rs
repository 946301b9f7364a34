//! Accepts connections, parses one request from each and prints it to stdout.

use rawhttp::config::Config;
use rawhttp::dump::dump_request;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::load()?;
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    let read_size = cfg.server.read_buffer_size;

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (mut stream, peer) = accepted?;
                info!("Accepted connection from {}", peer);

                tokio::spawn(async move {
                    match dump_request(&mut stream, read_size).await {
                        Ok(dump) => print!("{dump}"),
                        Err(e) => error!("Failed to parse request from {}: {}", peer, e),
                    }
                    if let Err(e) = stream.shutdown().await {
                        debug!(error = %e, "Failed to shut down connection");
                    }
                    info!("Connection from {} closed", peer);
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                return Ok(());
            }
        }
    }
}
