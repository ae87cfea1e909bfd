use std::net::SocketAddr;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use projex::logging::{init_basic_console_logging, init_tracing, shutdown_tracer};
use projex::metrics::{init_metrics, is_observability_enabled, metrics_app};
use projex::router::init_router;
use projex::state::init_app_state;

fn env_port(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if is_observability_enabled() {
        init_tracing()?;
    } else {
        init_basic_console_logging();
    }

    let metrics_handle = init_metrics()?;
    let state = init_app_state().await?;
    let app = init_router(state);

    if let Some(handle) = metrics_handle {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], env_port("METRICS_PORT", 9090)));
        tokio::spawn(async move {
            match TcpListener::bind(metrics_addr).await {
                Ok(listener) => {
                    info!(addr = %metrics_addr, "Metrics server listening");
                    if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                        error!(error = %e, "Metrics server stopped");
                    }
                }
                Err(e) => warn!(error = %e, addr = %metrics_addr, "Metrics server not started"),
            }
        });
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], env_port("PORT", 3000)));
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server running");
    info!("Swagger UI available at http://{addr}/swagger-ui");
    info!("Scalar UI available at http://{addr}/scalar");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if is_observability_enabled() {
        shutdown_tracer().await;
    }

    Ok(())
}
