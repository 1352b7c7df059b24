#![allow(clippy::unwrap_used)]
// Integration tests for `FeedClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use waterline_api::{Error, FeedClient, Payload, PayloadShape};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, FeedClient) {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}/feed", server.uri())).unwrap();
    let client = FeedClient::with_client(reqwest::Client::new(), endpoint);
    (server, client)
}

fn has_numeric_nocache(req: &Request) -> bool {
    req.url
        .query_pairs()
        .any(|(k, v)| k == "nocache" && !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
}

// ── Request shape ───────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_sends_cache_buster() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(has_numeric_nocache)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client.fetch().await.unwrap();
    assert_eq!(payload, Payload::Array(vec![]));
}

#[tokio::test]
async fn test_fetch_preserves_endpoint_query() {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}/macros/exec?id=sheet", server.uri())).unwrap();
    let client = FeedClient::with_client(reqwest::Client::new(), endpoint);

    Mock::given(method("GET"))
        .and(path("/macros/exec"))
        .and(query_param("id", "sheet"))
        .and(has_numeric_nocache)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client.fetch().await.unwrap();
    assert_eq!(payload.shape(), PayloadShape::Wrapped);
}

#[tokio::test]
async fn test_bare_endpoint_has_no_cache_buster_before_request() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param_is_missing("nocache"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    client.fetch().await.unwrap();
    assert!(client.endpoint().query().is_none());
}

// ── Payload shapes ──────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_single_record() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timestamp": "2024-05-01T10:00:00Z",
            "waterLevel": 14.5
        })))
        .mount(&server)
        .await;

    let records = client.fetch().await.unwrap().into_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["waterLevel"], json!(14.5));
}

#[tokio::test]
async fn test_fetch_notice_yields_no_records() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Sheet is empty" })),
        )
        .mount(&server)
        .await;

    let payload = client.fetch().await.unwrap();
    assert_eq!(payload.shape(), PayloadShape::Notice);
    assert!(payload.into_records().is_empty());
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let result = client.fetch().await;
    match result {
        Err(Error::Http { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "Bad Gateway");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.fetch().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body == "<html>oops</html>"),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let endpoint = Url::parse("http://127.0.0.1:9/feed").unwrap();
    let client = FeedClient::with_client(reqwest::Client::new(), endpoint);

    let result = client.fetch().await;
    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}
