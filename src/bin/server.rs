use anyhow::{Context, Result};
use grpc_patterns::ServerConfig;
use grpc_patterns::grpc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    grpc_patterns::init_tracing();

    let config = ServerConfig::default();
    let addr = config.listen_addr;

    let listener = TcpListener::bind(addr)
        .await
        .inspect_err(|e| error!(%addr, error = %e, "Failed to listen"))
        .with_context(|| format!("failed to listen on {addr}"))?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
        info!("Shutdown requested");
    };

    grpc::serve_with_shutdown(listener, config, shutdown)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to serve"))?;

    Ok(())
}
