//! Configuration management for sportop.
//!
//! Values come from environment variables, optionally seeded from `.env` files.
//! The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`<data_local_dir>/sportop/.env`)
//! 4. Application defaults (where applicable)
//!
//! The individual accessors are kept small; [`Settings::from_env`] gathers them
//! into one immutable value that the server and CLI pass around explicitly.

use std::{env, fmt, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::{fetch::BackoffPolicy, types::Country};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SCOPE: &str = "user-read-private";
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:5000";
pub const DEFAULT_METRICS_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_COUNTRIES: &str = "US,ES,FR,GB,AU";
pub const DEFAULT_OUTPUT_DIR: &str = "data_generated";
pub const DEFAULT_FETCH_DEADLINE_SECS: u64 = 300;
pub const DEFAULT_BACKOFF_INITIAL_SECS: u64 = 1;
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} must be set", name),
            ConfigError::Invalid { name, value } => {
                write!(f, "{} has an invalid value: {:?}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loads environment variables from `.env` files.
///
/// Both the working-directory `.env` and `<data_local_dir>/sportop/.env` are
/// tried. A missing file is not an error; the process environment may already
/// carry everything. The data directory is created so users find the place
/// where `build.rs` drops `.env.example`.
pub async fn load_env() -> Result<(), String> {
    let _ = dotenv::dotenv();

    let path = local_env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }

    Ok(())
}

fn local_env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sportop/.env");
    path
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = optional(name, default);
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { name, value })
}

/// Spotify application client ID (`SPOTIFY_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, ConfigError> {
    required("SPOTIFY_CLIENT_ID")
}

/// Spotify application client secret (`SPOTIFY_CLIENT_SECRET`).
///
/// Only sent to the token endpoint, never logged.
pub fn spotify_client_secret() -> Result<String, ConfigError> {
    required("SPOTIFY_CLIENT_SECRET")
}

/// OAuth redirect URI registered for the application (`SPOTIFY_REDIRECT_URI`),
/// e.g. `http://localhost:5000/callback`.
pub fn spotify_redirect_uri() -> Result<String, ConfigError> {
    required("SPOTIFY_REDIRECT_URI")
}

pub fn spotify_scope() -> String {
    optional("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    optional("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Base URL of the Web API, without trailing slash.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_string()
}

pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

pub fn server_addr() -> Result<SocketAddr, ConfigError> {
    parsed("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Address of the separate Prometheus exposition server.
pub fn metrics_addr() -> Result<SocketAddr, ConfigError> {
    parsed("METRICS_ADDRESS", DEFAULT_METRICS_ADDRESS)
}

pub fn countries() -> Vec<Country> {
    parse_countries(&optional("SPORTOP_COUNTRIES", DEFAULT_COUNTRIES))
}

pub fn output_dir() -> PathBuf {
    PathBuf::from(optional("SPORTOP_OUTPUT_DIR", DEFAULT_OUTPUT_DIR))
}

/// Upper bound for one whole aggregation call.
pub fn fetch_deadline() -> Result<Duration, ConfigError> {
    let secs: u64 = parsed(
        "SPORTOP_FETCH_DEADLINE_SECS",
        &DEFAULT_FETCH_DEADLINE_SECS.to_string(),
    )?;
    Ok(Duration::from_secs(secs))
}

/// Backoff delays in whole seconds. Zero is rejected for both values.
pub fn backoff_policy() -> Result<BackoffPolicy, ConfigError> {
    let initial = non_zero_secs(
        "SPORTOP_BACKOFF_INITIAL_SECS",
        DEFAULT_BACKOFF_INITIAL_SECS,
    )?;
    let max = non_zero_secs("SPORTOP_BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS)?;
    Ok(BackoffPolicy::new(
        Duration::from_secs(initial),
        Duration::from_secs(max),
    ))
}

fn non_zero_secs(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match parsed::<u64>(name, &default.to_string())? {
        0 => Err(ConfigError::Invalid {
            name,
            value: "0".to_string(),
        }),
        secs => Ok(secs),
    }
}

/// Splits a comma separated market list, dropping blanks and duplicates while
/// keeping the first-seen order.
pub fn parse_countries(raw: &str) -> Vec<Country> {
    let mut out: Vec<Country> = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let country = Country::new(code);
        if !out.contains(&country) {
            out.push(country);
        }
    }
    out
}

/// OAuth client credentials.
#[derive(Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
}

impl fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub oauth: OAuthSettings,
    pub api_url: String,
    pub server_addr: SocketAddr,
    pub metrics_addr: SocketAddr,
    pub countries: Vec<Country>,
    pub output_dir: PathBuf,
    pub fetch_deadline: Duration,
    pub backoff: BackoffPolicy,
}

impl Settings {
    /// Reads every setting from the environment.
    ///
    /// Fails on the first missing required variable or malformed value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            oauth: OAuthSettings {
                client_id: spotify_client_id()?,
                client_secret: spotify_client_secret()?,
                redirect_uri: spotify_redirect_uri()?,
                scope: spotify_scope(),
                auth_url: spotify_apiauth_url(),
                token_url: spotify_apitoken_url(),
            },
            api_url: spotify_apiurl(),
            server_addr: server_addr()?,
            metrics_addr: metrics_addr()?,
            countries: countries(),
            output_dir: output_dir(),
            fetch_deadline: fetch_deadline()?,
            backoff: backoff_policy()?,
        })
    }
}
