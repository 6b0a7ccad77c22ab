use newsdesk_avatar::{
    AccessTokenSource, HttpAccessTokenSource, StreamingApiConfig, StreamingTokenIssuer,
};
use newsdesk_server::api::AppState;
use newsdesk_server::app;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn client_token_source_reads_from_local_server() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/streaming.create_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "token": "session-xyz" } })),
        )
        .mount(&vendor)
        .await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(AppState {
        issuer: StreamingTokenIssuer::new(StreamingApiConfig::new(vendor.uri(), "vendor-key"))
            .unwrap(),
    });
    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let source = HttpAccessTokenSource::new(
        format!("http://{addr}/api/get-access-token"),
        Duration::from_secs(5),
    )
    .unwrap();
    let token = source.fetch().await.unwrap();

    assert_eq!(token, "session-xyz");
    server.abort();
}
