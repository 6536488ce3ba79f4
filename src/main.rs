use std::net::SocketAddr;

use dotenvy::dotenv;
use mesrs::logging::{init_tracing, shutdown_tracer};
use mesrs::metrics::{init_metrics, metrics_app};
use mesrs::router::init_router;
use mesrs::state::init_app_state;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let state = init_app_state().await?;
    let mut app = init_router(state);

    if let Some(handle) = init_metrics() {
        app = app.merge(metrics_app(handle));
        info!("Prometheus metrics exposed on /metrics");
    }

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    info!(port, "Server running on http://localhost:{}", port);
    info!("Swagger UI available at http://localhost:{}/swagger-ui", port);
    info!("Scalar UI available at http://localhost:{}/scalar", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
