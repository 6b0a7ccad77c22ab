use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use newsdesk_avatar::{StreamingApiConfig, StreamingTokenIssuer};
use newsdesk_server::api::AppState;
use newsdesk_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state(base_url: &str, api_key: &str) -> AppState {
    AppState {
        issuer: StreamingTokenIssuer::new(StreamingApiConfig::new(base_url, api_key)).unwrap(),
    }
}

fn token_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/get-access-token")
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let response = app(state("http://127.0.0.1:9", ""))
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn access_token_is_returned_as_plain_text() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/streaming.create_token"))
        .and(header_matcher("x-api-key", "vendor-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "token": "session-abc" } })),
        )
        .expect(1)
        .mount(&vendor)
        .await;

    let response = app(state(&vendor.uri(), "vendor-key"))
        .oneshot(token_request())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body_bytes(response).await, b"session-abc");
}

#[tokio::test]
async fn missing_api_key_is_service_unavailable() {
    let response = app(state("http://127.0.0.1:9", ""))
        .oneshot(token_request())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("API key"));
}

#[tokio::test]
async fn vendor_rejection_is_bad_gateway_without_leaking_body() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/streaming.create_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key vendor-key"))
        .mount(&vendor)
        .await;

    let response = app(state(&vendor.uri(), "vendor-key"))
        .oneshot(token_request())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("401"));
    assert!(!body.contains("vendor-key"));
}

#[tokio::test]
async fn token_endpoint_rejects_get() {
    let response = app(state("http://127.0.0.1:9", "vendor-key"))
        .oneshot(
            Request::builder()
                .uri("/api/get-access-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
