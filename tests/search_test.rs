mod common;

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use sportop::{
    spotify::{
        FetchFailure, FetchOutcome, ResourceFetcher, SpotifySearch,
        auth::{AuthError, authorize_url, exchange_code},
    },
    types::{Country, ResourceKind},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

#[tokio::test]
async fn test_search_returns_items_in_upstream_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer token-abc"))
        .and(query_param("q", "top hits"))
        .and(query_param("type", "track"))
        .and(query_param("market", "US"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": { "items": [
                { "name": "First", "artist": "A", "popularity": 90 },
                { "name": "Second", "artist": "B", "popularity": 40 }
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let search = SpotifySearch::new(format!("{}/", server.uri()));
    let outcome = search
        .fetch(ResourceKind::Track, &Country::new("us"), "token-abc")
        .await;

    let FetchOutcome::Items(items) = outcome else {
        panic!("expected items, got {:?}", outcome);
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "First");
    assert_eq!(items[1]["name"], "Second");
}

#[tokio::test]
async fn test_missing_items_path_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "genre"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "artists": { "items": [] } })))
        .mount(&server)
        .await;

    let outcome = SpotifySearch::new(server.uri())
        .fetch(ResourceKind::Genre, &Country::new("FR"), "t")
        .await;

    assert_eq!(outcome, FetchOutcome::Items(Vec::new()));
}

#[tokio::test]
async fn test_malformed_body_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let outcome = SpotifySearch::new(server.uri())
        .fetch(ResourceKind::Artist, &Country::new("ES"), "t")
        .await;

    assert_eq!(outcome, FetchOutcome::Items(Vec::new()));
}

#[tokio::test]
async fn test_429_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
        .mount(&server)
        .await;

    let outcome = SpotifySearch::new(server.uri())
        .fetch(ResourceKind::Artist, &Country::new("GB"), "t")
        .await;

    assert_eq!(
        outcome,
        FetchOutcome::RateLimited {
            retry_after: Some(Duration::from_secs(3))
        }
    );
}

#[tokio::test]
async fn test_other_status_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let outcome = SpotifySearch::new(server.uri())
        .fetch(ResourceKind::Track, &Country::new("AU"), "t")
        .await;

    assert_eq!(outcome, FetchOutcome::Failed(FetchFailure::Status(403)));
}

#[tokio::test]
async fn test_empty_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = SpotifySearch::new(server.uri())
        .fetch(ResourceKind::Track, &Country::new("US"), "")
        .await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failed(FetchFailure::InvalidInput(_))
    ));
}

#[test]
fn test_authorize_url_has_all_params() {
    let settings = common::test_settings(std::path::Path::new("unused"), "http://unused");

    let url = authorize_url(&settings.oauth, "xyz").unwrap();

    assert_eq!(url.host_str(), Some("accounts.example.test"));
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("response_type".to_string(), "code".to_string()),
            ("client_id".to_string(), "client-123".to_string()),
            ("redirect_uri".to_string(), "http://localhost:5000/callback".to_string()),
            ("scope".to_string(), "user-read-private".to_string()),
            ("state".to_string(), "xyz".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_exchange_code_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .and(body_string_contains("client_secret=secret-456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "token_type": "Bearer",
            "scope": "user-read-private",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = common::test_settings(
        std::path::Path::new("unused"),
        &format!("{}/api/token", server.uri()),
    );
    let token = exchange_code(&Client::new(), &settings.oauth, "auth-code")
        .await
        .unwrap();

    assert_eq!(token.access_token, "fresh-token");
    assert_eq!(token.expires_in, 3600);
}

#[tokio::test]
async fn test_exchange_code_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let settings = common::test_settings(std::path::Path::new("unused"), &server.uri());
    let err = exchange_code(&Client::new(), &settings.oauth, "stale")
        .await
        .unwrap_err();

    match err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "invalid_grant");
        }
        other => panic!("expected rejection, got {}", other),
    }
}

#[tokio::test]
async fn test_exchange_code_without_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })))
        .mount(&server)
        .await;

    let settings = common::test_settings(std::path::Path::new("unused"), &server.uri());
    let err = exchange_code(&Client::new(), &settings.oauth, "code")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MissingToken));
}
