#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    path::Path,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Value, json};
use sportop::{
    config::{OAuthSettings, Settings},
    fetch::BackoffPolicy,
    spotify::{FetchFailure, FetchOutcome, ResourceFetcher},
    types::{Country, ResourceKind},
};
use tokio::time::Instant;

struct Script {
    queue: VecDeque<FetchOutcome>,
    fallback: FetchOutcome,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub kind: ResourceKind,
    pub country: Country,
    pub token: String,
    pub at: Instant,
}

/// Fetcher answering from per-(kind, country) scripts. Unscripted pairs get
/// an empty item list.
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<(ResourceKind, Country), Script>>,
    calls: Mutex<Vec<Call>>,
    default: FetchOutcome,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::with_default(FetchOutcome::Items(Vec::new()))
    }

    pub fn with_default(default: FetchOutcome) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            default,
        }
    }

    /// Plays `outcomes` in order, then keeps answering with empty items.
    pub fn script(self, kind: ResourceKind, country: &str, outcomes: Vec<FetchOutcome>) -> Self {
        self.insert(kind, country, outcomes, FetchOutcome::Items(Vec::new()))
    }

    pub fn rate_limited_forever(self, kind: ResourceKind, country: &str) -> Self {
        self.insert(kind, country, Vec::new(), rate_limited())
    }

    fn insert(
        self,
        kind: ResourceKind,
        country: &str,
        outcomes: Vec<FetchOutcome>,
        fallback: FetchOutcome,
    ) -> Self {
        self.scripts.lock().unwrap().insert(
            (kind, Country::new(country)),
            Script {
                queue: outcomes.into(),
                fallback,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_times(&self, kind: ResourceKind, country: &str) -> Vec<Instant> {
        let country = Country::new(country);
        self.calls()
            .into_iter()
            .filter(|c| c.kind == kind && c.country == country)
            .map(|c| c.at)
            .collect()
    }
}

#[async_trait]
impl ResourceFetcher for ScriptedFetcher {
    async fn fetch(&self, kind: ResourceKind, country: &Country, token: &str) -> FetchOutcome {
        self.calls.lock().unwrap().push(Call {
            kind,
            country: country.clone(),
            token: token.to_string(),
            at: Instant::now(),
        });

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&(kind, country.clone())) {
            Some(script) => script
                .queue
                .pop_front()
                .unwrap_or_else(|| script.fallback.clone()),
            None => self.default.clone(),
        }
    }
}

pub fn rate_limited() -> FetchOutcome {
    FetchOutcome::RateLimited { retry_after: None }
}

pub fn failed(status: u16) -> FetchOutcome {
    FetchOutcome::Failed(FetchFailure::Status(status))
}

pub fn track(name: &str, artist: &str, popularity: u64) -> Value {
    json!({ "name": name, "artist": artist, "popularity": popularity })
}

pub fn named(name: &str, popularity: u64) -> Value {
    json!({ "name": name, "popularity": popularity })
}

pub fn countries(codes: &[&str]) -> Vec<Country> {
    codes.iter().map(|c| Country::new(*c)).collect()
}

/// Asserts a paused-clock gap equals `secs`, allowing for timer granularity.
pub fn assert_delay(gap: Duration, secs: u64) {
    let expected = Duration::from_secs(secs);
    assert!(
        gap >= expected && gap < expected + Duration::from_millis(50),
        "expected a delay of {}s, got {:?}",
        secs,
        gap
    );
}

pub fn test_settings(output_dir: &Path, token_url: &str) -> Settings {
    Settings {
        oauth: OAuthSettings {
            client_id: "client-123".to_string(),
            client_secret: "secret-456".to_string(),
            redirect_uri: "http://localhost:5000/callback".to_string(),
            scope: "user-read-private".to_string(),
            auth_url: "https://accounts.example.test/authorize".to_string(),
            token_url: token_url.to_string(),
        },
        api_url: "http://127.0.0.1:1".to_string(),
        server_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
        metrics_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
        countries: countries(&["US", "ES", "FR", "GB", "AU"]),
        output_dir: output_dir.to_path_buf(),
        fetch_deadline: Duration::from_secs(30),
        backoff: BackoffPolicy::default(),
    }
}
