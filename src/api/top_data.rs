use std::sync::Arc;

use axum::{
    Extension, Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio::time::Instant;

use crate::{
    api::{AppState, TOKEN_COOKIE, bearer_token, cookie_value},
    output::{to_json, to_metric_observations, to_rows},
    telemetry,
};

/// Runs one aggregation cycle for the caller's token.
///
/// The aggregation path never fails: upstream errors degrade to empty lists
/// and the response is always 200 with all three top-level keys. Only a
/// missing token is rejected (401), before any upstream call is made.
pub async fn top_data(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(token) = bearer_token(&headers).or_else(|| cookie_value(&headers, TOKEN_COOKIE))
    else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing access token, authorize via / first" })),
        )
            .into_response();
    };

    let started = Instant::now();

    let result = state.aggregator.aggregate(&state.countries, &token).await;

    let rows = to_rows(&result);
    if let Err(e) = state.reports.write_all(&rows).await {
        tracing::error!(error = %e, dir = %state.reports.dir().display(), "failed to write reports");
    }

    telemetry::record_observations(&to_metric_observations(&result));

    let body = to_json(&result);
    telemetry::record_request_duration(started.elapsed());

    (StatusCode::OK, Json(body)).into_response()
}
