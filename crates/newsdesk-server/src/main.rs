//! Access-token server.
//!
//! Holds the vendor API key and hands out short-lived streaming session
//! tokens on `POST /api/get-access-token`. Shuts down gracefully on
//! SIGTERM/SIGINT.

use newsdesk_avatar::StreamingTokenIssuer;
use newsdesk_server::api::AppState;
use newsdesk_server::{app, config, telemetry};
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config_path, config_source) = config::resolve_config_path(std::env::args().nth(1));
    let config = config::load_config(Some(config_path.as_str()))?;

    telemetry::init_tracing(&config.logging);

    tracing::info!(
        source = config_source,
        path = %config_path,
        "resolved startup configuration path"
    );

    let issuer = StreamingTokenIssuer::new(config.avatar.streaming_api())?;
    if !issuer.is_enabled() {
        tracing::warn!("avatar.api_key is not set; access-token requests will fail with 503");
    }

    let addr = SocketAddr::new(config.server.host, config.server.port);
    tracing::info!(%addr, "starting newsdesk server");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app(AppState { issuer }))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("newsdesk server shut down");
    Ok(())
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
