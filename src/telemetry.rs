use std::time::Duration;

use axum::{Router, routing::get};
use metrics::{describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::types::{MetricObservation, ResourceKind};

pub const TOP_TRACKS_GAUGE: &str = "top_tracks_by_country";
pub const TOP_ARTISTS_GAUGE: &str = "top_artists_by_country";
pub const TOP_GENRES_GAUGE: &str = "top_genres_by_country";
pub const REQUEST_TIME: &str = "request_processing_seconds";

pub struct Telemetry {
    handle: PrometheusHandle,
}

impl Telemetry {
    /// Installs the process-wide Prometheus recorder.
    ///
    /// Histograms are rendered as summaries (quantiles), which is what the
    /// request-duration metric is exposed as.
    pub fn install() -> Result<Self, BuildError> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe();
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_gauge!(TOP_TRACKS_GAUGE, "Top tracks by country");
    describe_gauge!(TOP_ARTISTS_GAUGE, "Top artists by country");
    describe_gauge!(TOP_GENRES_GAUGE, "Top genres by country");
    describe_histogram!(REQUEST_TIME, "Time spent processing request");
}

pub fn gauge_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Track => TOP_TRACKS_GAUGE,
        ResourceKind::Artist => TOP_ARTISTS_GAUGE,
        ResourceKind::Genre => TOP_GENRES_GAUGE,
    }
}

/// Sets one gauge per observation, labelled `{country, <kind>}`.
pub fn record_observations(observations: &[MetricObservation]) {
    for obs in observations {
        gauge!(
            gauge_name(obs.kind),
            "country" => obs.country.to_string(),
            obs.kind.as_str() => obs.name.clone()
        )
        .set(obs.value);
    }
}

pub fn record_request_duration(elapsed: Duration) {
    histogram!(REQUEST_TIME).record(elapsed.as_secs_f64());
}
