use rawhttp::config::Config;
use rawhttp::routes::DemoRouter;
use rawhttp::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let router = DemoRouter::from_config(&cfg.routes)?;

    let server = Server::serve(&cfg.server, router).await?;
    tracing::info!("Server started on {}", server.local_addr());

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    server.close().await;
    tracing::info!("Server gracefully stopped");

    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "Cannot listen for SIGTERM"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for SIGINT");
    }
}
