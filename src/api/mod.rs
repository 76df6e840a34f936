//! # API Module
//!
//! HTTP endpoints of the sportop web server.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`home`] - Redirects the browser to Spotify's authorization page.
//! - [`callback`] - Receives the authorization code, exchanges it for an access
//!   token and keeps the token in an HttpOnly session cookie.
//!
//! ### Data
//!
//! - [`top_data`] - Runs one aggregation over all configured countries and
//!   answers with the JSON projection. Also refreshes the CSV reports and the
//!   Prometheus gauges.
//!
//! ### Monitoring
//!
//! - [`health`] - Status and version.
//!
//! ## Session Handling
//!
//! There is no server-side token store. The access token travels with each
//! request (cookie or `Authorization: Bearer`) and is handed to the aggregator
//! explicitly, so concurrent users never share state.

mod callback;
mod health;
mod home;
mod session;
mod top_data;

use std::sync::Arc;

use reqwest::Client;

pub use callback::callback;
pub use health::health;
pub use home::home;
pub use session::{STATE_COOKIE, TOKEN_COOKIE, bearer_token, cookie_value, session_cookie};
pub use top_data::top_data;

use crate::{
    config::{OAuthSettings, Settings},
    fetch::FanOutAggregator,
    output::CsvReportWriter,
    spotify::{ResourceFetcher, SpotifySearch},
    types::Country,
};

/// Everything the handlers need, shared read-only across requests.
pub struct AppState {
    pub oauth: OAuthSettings,
    pub countries: Vec<Country>,
    pub aggregator: FanOutAggregator,
    pub reports: CsvReportWriter,
    pub http: Client,
}

impl AppState {
    pub fn new(settings: &Settings, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        let aggregator = FanOutAggregator::new(fetcher)
            .with_backoff(settings.backoff)
            .with_deadline(settings.fetch_deadline);

        Self {
            oauth: settings.oauth.clone(),
            countries: settings.countries.clone(),
            aggregator,
            reports: CsvReportWriter::new(settings.output_dir.clone()),
            http: Client::new(),
        }
    }

    /// State wired to the real Spotify search endpoint.
    pub fn from_settings(settings: &Settings) -> Self {
        let http = Client::new();
        let fetcher = Arc::new(SpotifySearch::with_client(http.clone(), &settings.api_url));
        let mut state = Self::new(settings, fetcher);
        state.http = http;
        state
    }
}
