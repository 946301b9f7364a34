use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::http::connection::{Handler, serve_connection};
use crate::server::dispatch::Dispatch;

/// A running server: one accept loop, one task per connection.
///
/// Connections have no read or write timeouts, so a silent peer keeps its
/// task alive until it disconnects.
pub struct Server {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    accept_loop: JoinHandle<()>,
}

impl Server {
    /// Binds `cfg.listen_addr` and starts accepting in the background.
    pub async fn serve<H: Handler>(cfg: &ServerConfig, handler: H) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&cfg.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", cfg.listen_addr))?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let (shutdown, closed) = watch::channel(false);
        let accept_loop = tokio::spawn(run(
            listener,
            Arc::new(handler),
            Dispatch::from_config(&cfg.dispatch),
            cfg.read_buffer_size,
            closed,
        ));

        Ok(Self {
            local_addr,
            shutdown,
            accept_loop,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting and waits for in-flight connections to finish.
    pub async fn close(self) {
        if self.shutdown.send(true).is_err() {
            debug!("Accept loop already stopped");
        }

        if let Err(e) = self.accept_loop.await {
            error!(error = %e, "Accept loop terminated abnormally");
        }
    }
}

async fn run<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    dispatch: Dispatch,
    read_size: usize,
    mut closed: watch::Receiver<bool>,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            res = listener.accept() => {
                let (socket, peer) = match res {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!(error = %e, "Accept failed, stopping listener");
                        break;
                    }
                };
                info!("Accepted connection from {}", peer);

                let handler = Arc::clone(&handler);
                dispatch
                    .spawn(&mut connections, async move {
                        if let Err(e) = serve_connection(socket, handler.as_ref(), read_size).await {
                            error!("Connection error from {}: {}", peer, e);
                        }
                    })
                    .await;
            }

            Some(res) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = res {
                    error!(error = %e, "Connection task panicked");
                }
            }

            _ = closed.changed() => {
                info!("Stopped accepting connections");
                break;
            }
        }
    }

    drop(listener);

    while let Some(res) = connections.join_next().await {
        if let Err(e) = res {
            error!(error = %e, "Connection task panicked");
        }
    }
}
