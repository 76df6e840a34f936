//! # Spotify Integration Module
//!
//! Integration layer between sportop and the Spotify Web API. Everything that
//! speaks HTTP to Spotify lives here; the rest of the crate only sees
//! [`ResourceFetcher`] and the token types.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers / CLI
//!          ↓
//! Fetch pipeline (retry, fan-out)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (authorization-code grant)
//!     └── Search (top tracks, artists, genres per market)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication Module
//!
//! [`auth`] - Authorization-code flow with a confidential client:
//! - **Authorize URL**: `response_type=code`, `client_id`, `redirect_uri`, `scope`, `state`
//! - **Code Exchange**: form-encoded POST to the token endpoint, no retry
//!
//! ### Search Module
//!
//! [`search`] - One request per (kind, market) against `/search`:
//! - **Status Mapping**: 200 → items, 429 → rate limited, anything else → failed
//! - **Lenient Parsing**: a missing `<kind>.items` path is an empty list, not an error
//! - **Retry-After**: the header is surfaced to the caller, which owns the backoff
//!
//! ## API Coverage
//!
//! - `GET /search?q=<term>&type=<kind>&market=<country>&limit=10`
//! - `POST /api/token` (authorization code grant)
//!
//! ## Error Types
//!
//! - [`auth::AuthError`] for the token exchange
//! - [`search::FetchOutcome`] / [`search::FetchFailure`] are values, never raised

pub mod auth;
pub mod search;

pub use search::{FetchFailure, FetchOutcome, ResourceFetcher, SpotifySearch};
