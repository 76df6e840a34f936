use std::{net::SocketAddr, sync::Arc};

use crate::{
    api::AppState, config::Settings, error, info, server, success, telemetry::Telemetry, warning,
};

pub async fn serve(open_browser: bool) {
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => error!("Cannot load settings. Err: {}", e),
    };

    let telemetry = match Telemetry::install() {
        Ok(t) => t,
        Err(e) => error!("Cannot install metrics recorder. Err: {}", e),
    };

    let metrics_router = telemetry.router();
    let metrics_addr = settings.metrics_addr;
    tokio::spawn(async move {
        if let Err(e) = server::start_metrics_server(metrics_router, metrics_addr).await {
            tracing::error!(error = %e, "metrics server stopped");
        }
    });
    info!("Metrics exposed on http://{}/metrics", metrics_addr);

    let countries = settings
        .countries
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(",");
    info!("Collecting top data for {}", countries);

    let state = Arc::new(AppState::from_settings(&settings));
    let browse_url = format!("http://{}/", browsable(settings.server_addr));
    success!("Open {} to authorize and fetch top data", browse_url);

    if open_browser && webbrowser::open(&browse_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            browse_url
        )
    }

    if let Err(e) = server::start_api_server(state, settings.server_addr).await {
        error!("Server stopped. Err: {}", e);
    }
}

/// A wildcard bind address is not something a browser can open.
fn browsable(addr: SocketAddr) -> SocketAddr {
    if addr.ip().is_unspecified() {
        SocketAddr::from(([127, 0, 0, 1], addr.port()))
    } else {
        addr
    }
}
