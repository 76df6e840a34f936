use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, sync::Arc};

use crate::{Res, api, api::AppState};

/// Application routes. The state is shared through an `Extension` layer.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::home))
        .route("/callback", get(api::callback))
        .route("/top-data", get(api::top_data))
        .route("/health", get(api::health))
        .layer(Extension(state))
}

pub async fn start_api_server(state: Arc<AppState>, addr: SocketAddr) -> Res<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "api server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Serves the metrics router (see `Telemetry::router`) on its own address,
/// apart from the application routes.
pub async fn start_metrics_server(metrics: Router, addr: SocketAddr) -> Res<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "metrics server listening");
    axum::serve(listener, metrics).await?;
    Ok(())
}
