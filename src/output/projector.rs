//! Projections of an [`AggregatedResult`] into rows, metric samples and JSON.
//!
//! Rows and metric samples only include valid items: a string `name`, an
//! integer `popularity` within 0..=100 and, for tracks, an artist name. The
//! JSON document is a passthrough of whatever the upstream returned.

use serde_json::{Map, Value};

use crate::{
    fetch::AggregatedResult,
    types::{ArtistRow, GenreRow, MetricObservation, ResourceKind, ResultItem, TrackRow},
};

pub const TRACKS_JSON_KEY: &str = "top_tracks_by_country";
pub const ARTISTS_JSON_KEY: &str = "top_artists_by_country";
pub const GENRES_JSON_KEY: &str = "top_genres_by_country";

/// Required fields of an item that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidItem<'a> {
    pub name: &'a str,
    pub artist: Option<&'a str>,
    pub popularity: u8,
}

/// Checks the required fields for `kind`, returning `None` for items that must
/// be dropped.
///
/// Tracks accept either a flat `artist` string or the first entry of the
/// `artists` array that full Spotify track objects carry.
pub fn validate(kind: ResourceKind, item: &ResultItem) -> Option<ValidItem<'_>> {
    let name = item.get("name")?.as_str()?;
    let popularity = item.get("popularity")?.as_u64()?;
    if popularity > 100 {
        return None;
    }

    let artist = match kind {
        ResourceKind::Track => Some(track_artist(item)?),
        ResourceKind::Artist | ResourceKind::Genre => None,
    };

    Some(ValidItem {
        name,
        artist,
        popularity: popularity as u8,
    })
}

fn track_artist(item: &ResultItem) -> Option<&str> {
    if let Some(artist) = item.get("artist").and_then(Value::as_str) {
        return Some(artist);
    }
    item.get("artists")?
        .as_array()?
        .first()?
        .get("name")?
        .as_str()
}

/// Rows for all three kinds, ready for CSV or table output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedRows {
    pub tracks: Vec<TrackRow>,
    pub artists: Vec<ArtistRow>,
    pub genres: Vec<GenreRow>,
}

impl ProjectedRows {
    pub fn len(&self) -> usize {
        self.tracks.len() + self.artists.len() + self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn to_rows(result: &AggregatedResult) -> ProjectedRows {
    ProjectedRows {
        tracks: track_rows(result),
        artists: artist_rows(result),
        genres: genre_rows(result),
    }
}

/// Iterates `(country, valid item)` for one kind, countries in key order and
/// items in upstream order.
fn valid_items(
    result: &AggregatedResult,
    kind: ResourceKind,
) -> impl Iterator<Item = (String, ValidItem<'_>)> + '_ {
    result
        .by_country(kind)
        .into_iter()
        .flat_map(|per_country| per_country.iter())
        .flat_map(move |(country, items)| {
            items
                .iter()
                .filter_map(move |item| validate(kind, item))
                .map(move |valid| (country.to_string(), valid))
        })
}

pub fn track_rows(result: &AggregatedResult) -> Vec<TrackRow> {
    valid_items(result, ResourceKind::Track)
        .map(|(country, item)| TrackRow {
            country,
            track: item.name.to_string(),
            artist: item.artist.unwrap_or_default().to_string(),
            popularity: item.popularity,
        })
        .collect()
}

pub fn artist_rows(result: &AggregatedResult) -> Vec<ArtistRow> {
    valid_items(result, ResourceKind::Artist)
        .map(|(country, item)| ArtistRow {
            country,
            artist: item.name.to_string(),
            popularity: item.popularity,
        })
        .collect()
}

pub fn genre_rows(result: &AggregatedResult) -> Vec<GenreRow> {
    valid_items(result, ResourceKind::Genre)
        .map(|(country, item)| GenreRow {
            country,
            genre: item.name.to_string(),
            popularity: item.popularity,
        })
        .collect()
}

/// One gauge sample per valid item of every kind present in `result`.
pub fn to_metric_observations(result: &AggregatedResult) -> Vec<MetricObservation> {
    result
        .kinds()
        .flat_map(move |kind| {
            result
                .by_country(kind)
                .into_iter()
                .flat_map(|per_country| per_country.iter())
                .flat_map(move |(country, items)| {
                    items.iter().filter_map(move |item| {
                        validate(kind, item).map(|valid| MetricObservation {
                            kind,
                            country: country.clone(),
                            name: valid.name.to_string(),
                            value: f64::from(valid.popularity),
                        })
                    })
                })
        })
        .collect()
}

pub fn json_key(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Track => TRACKS_JSON_KEY,
        ResourceKind::Artist => ARTISTS_JSON_KEY,
        ResourceKind::Genre => GENRES_JSON_KEY,
    }
}

/// `{top_tracks_by_country, top_artists_by_country, top_genres_by_country}`,
/// each mapping country to the raw upstream items.
///
/// All three keys are always present; a kind that was not fetched maps to an
/// empty object.
pub fn to_json(result: &AggregatedResult) -> Value {
    let mut doc = Map::new();
    for kind in ResourceKind::ALL {
        let per_country: Map<String, Value> = result
            .by_country(kind)
            .map(|countries| {
                countries
                    .iter()
                    .map(|(country, items)| (country.to_string(), Value::Array(items.clone())))
                    .collect()
            })
            .unwrap_or_default();
        doc.insert(json_key(kind).to_string(), Value::Object(per_country));
    }
    Value::Object(doc)
}
