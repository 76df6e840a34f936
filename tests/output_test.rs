mod common;

use common::{named, track};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use sportop::{
    fetch::AggregatedResult,
    output::{
        CsvReportWriter, to_json, to_metric_observations, to_rows,
        csv::{ARTISTS_FILE, GENRES_FILE, TRACKS_FILE, encode},
        projector::{TRACKS_JSON_KEY, validate},
    },
    telemetry,
    types::{Country, ResourceKind, TrackRow},
};

// US has two valid tracks and one without popularity; ES has a full Spotify
// track object with an `artists` array instead of a flat `artist`.
fn fixture() -> AggregatedResult {
    let mut result = AggregatedResult::empty(&ResourceKind::ALL, &[Country::new("US"), Country::new("ES")]);
    result.insert(
        ResourceKind::Track,
        Country::new("US"),
        vec![
            track("Song A", "Artist A", 80),
            json!({ "name": "Broken", "artist": "Nobody" }),
            track("Song B", "Artist B", 70),
        ],
    );
    result.insert(
        ResourceKind::Track,
        Country::new("ES"),
        vec![json!({
            "name": "Canción",
            "popularity": 66,
            "artists": [{ "name": "Primera" }, { "name": "Segunda" }]
        })],
    );
    result.insert(
        ResourceKind::Artist,
        Country::new("US"),
        vec![named("Artist A", 91), json!({ "name": null, "popularity": 50 })],
    );
    result.insert(
        ResourceKind::Genre,
        Country::new("ES"),
        vec![named("pop", 75), named("overflow", 150)],
    );
    result
}

#[test]
fn test_rows_drop_malformed_items_json_keeps_them() {
    let result = fixture();

    let rows = to_rows(&result);
    assert_eq!(
        rows.tracks,
        vec![
            TrackRow {
                country: "ES".to_string(),
                track: "Canción".to_string(),
                artist: "Primera".to_string(),
                popularity: 66,
            },
            TrackRow {
                country: "US".to_string(),
                track: "Song A".to_string(),
                artist: "Artist A".to_string(),
                popularity: 80,
            },
            TrackRow {
                country: "US".to_string(),
                track: "Song B".to_string(),
                artist: "Artist B".to_string(),
                popularity: 70,
            },
        ]
    );

    let doc = to_json(&result);
    let us_tracks = doc[TRACKS_JSON_KEY]["US"].as_array().unwrap();
    assert_eq!(us_tracks.len(), 3);
    assert_eq!(us_tracks[1], json!({ "name": "Broken", "artist": "Nobody" }));
}

#[test]
fn test_null_and_out_of_range_fields_are_invalid() {
    let rows = to_rows(&fixture());

    assert_eq!(rows.artists.len(), 1);
    assert_eq!(rows.artists[0].artist, "Artist A");
    assert_eq!(rows.genres.len(), 1);
    assert_eq!(rows.genres[0].genre, "pop");

    assert!(validate(ResourceKind::Artist, &json!({ "name": "x", "popularity": "high" })).is_none());
    assert!(validate(ResourceKind::Track, &named("no artist", 10)).is_none());
    assert!(validate(ResourceKind::Genre, &Value::Null).is_none());
    assert!(validate(ResourceKind::Genre, &named("edge", 100)).is_some());
}

#[test]
fn test_metric_observations_only_for_valid_items() {
    let observations = to_metric_observations(&fixture());

    // 3 tracks + 1 artist + 1 genre
    assert_eq!(observations.len(), 5);
    let artist = observations
        .iter()
        .find(|o| o.kind == ResourceKind::Artist)
        .unwrap();
    assert_eq!(artist.country, Country::new("US"));
    assert_eq!(artist.name, "Artist A");
    assert_eq!(artist.value, 91.0);
    assert!(!observations.iter().any(|o| o.name == "Broken"));
}

#[test]
fn test_json_shape_is_complete_for_empty_result() {
    let result = AggregatedResult::empty(&[ResourceKind::Track], &[Country::new("AU")]);

    let doc = to_json(&result);

    assert_eq!(
        doc,
        json!({
            "top_tracks_by_country": { "AU": [] },
            "top_artists_by_country": {},
            "top_genres_by_country": {}
        })
    );
}

#[test]
fn test_encode_writes_header_for_empty_rows() {
    let bytes = encode::<TrackRow>(&["country", "track", "artist", "popularity"], &[]).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "country,track,artist,popularity\n");
}

#[tokio::test]
async fn test_reports_are_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let writer = CsvReportWriter::new(dir.path().join("data_generated"));

    writer.write_all(&to_rows(&fixture())).await.unwrap();
    let first = std::fs::read_to_string(writer.dir().join(TRACKS_FILE)).unwrap();
    assert_eq!(
        first,
        "country,track,artist,popularity\nES,Canción,Primera,66\nUS,Song A,Artist A,80\nUS,Song B,Artist B,70\n"
    );

    let empty = AggregatedResult::empty(&ResourceKind::ALL, &[Country::new("US")]);
    let paths = writer.write_all(&to_rows(&empty)).await.unwrap();
    assert_eq!(paths.len(), 3);

    let second = std::fs::read_to_string(writer.dir().join(TRACKS_FILE)).unwrap();
    assert_eq!(second, "country,track,artist,popularity\n");
    assert_eq!(
        std::fs::read_to_string(writer.dir().join(ARTISTS_FILE)).unwrap(),
        "country,artist,popularity\n"
    );
    assert_eq!(
        std::fs::read_to_string(writer.dir().join(GENRES_FILE)).unwrap(),
        "country,genre,popularity\n"
    );
}

#[test]
fn test_gauges_are_labelled_by_country_and_name() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    metrics::with_local_recorder(&recorder, || {
        telemetry::record_observations(&to_metric_observations(&fixture()));
    });

    let rendered = handle.render();
    let line = rendered
        .lines()
        .find(|l| l.starts_with("top_tracks_by_country{") && l.contains("track=\"Song A\""))
        .unwrap_or_else(|| panic!("gauge missing in:\n{}", rendered));
    assert!(line.contains("country=\"US\""));
    let value: f64 = line.rsplit(' ').next().unwrap().parse().unwrap();
    assert_eq!(value, 80.0);
    assert!(rendered.contains("top_genres_by_country{"));
    assert!(!rendered.contains("overflow"));
}
