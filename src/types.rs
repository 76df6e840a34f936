use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Market code such as `US`, passed verbatim to the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Country(String);

impl Country {
    pub fn new(code: impl Into<String>) -> Self {
        Country(code.into().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Country {
    fn from(code: &str) -> Self {
        Country::new(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Track,
    Artist,
    Genre,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Track, ResourceKind::Artist, ResourceKind::Genre];

    /// Free-text `q` parameter sent to the search endpoint.
    pub fn query_term(self) -> &'static str {
        match self {
            ResourceKind::Track => "top hits",
            ResourceKind::Artist => "top artists",
            ResourceKind::Genre => "top genres",
        }
    }

    /// Value of the `type` search parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Track => "track",
            ResourceKind::Artist => "artist",
            ResourceKind::Genre => "genre",
        }
    }

    /// Top-level response key holding the `items` list.
    pub fn items_key(self) -> &'static str {
        match self {
            ResourceKind::Track => "tracks",
            ResourceKind::Artist => "artists",
            ResourceKind::Genre => "genres",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "track" | "tracks" => Ok(ResourceKind::Track),
            "artist" | "artists" => Ok(ResourceKind::Artist),
            "genre" | "genres" => Ok(ResourceKind::Genre),
            other => Err(format!(
                "unknown resource kind '{}', expected track, artist or genre",
                other
            )),
        }
    }
}

/// One raw item as returned by the upstream search endpoint.
///
/// Kept as untyped JSON so the JSON projection can pass it through with full
/// fidelity; typed rows are derived from it by the projector.
pub type ResultItem = serde_json::Value;

/// Unit of concurrent work. At most one task per pair runs in an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTask {
    pub kind: ResourceKind,
    pub country: Country,
}

impl fmt::Display for FetchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.country)
    }
}

/// Access token from the authorization-code exchange. Other fields of the
/// token response are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub access_token: String,
    /// Lifetime in seconds; zero when the endpoint did not say.
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct TrackRow {
    pub country: String,
    pub track: String,
    pub artist: String,
    pub popularity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ArtistRow {
    pub country: String,
    pub artist: String,
    pub popularity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct GenreRow {
    pub country: String,
    pub genre: String,
    pub popularity: u8,
}

/// One gauge sample: labels `{country, name}` with the popularity as value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricObservation {
    pub kind: ResourceKind,
    pub country: Country,
    pub name: String,
    pub value: f64,
}
