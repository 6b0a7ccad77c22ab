use newsdesk_avatar::{
    AccessTokenSource, AvatarBackend, AvatarError, HttpAccessTokenSource, SessionRequest,
    StreamingApiBackend, StreamingApiConfig, StreamingTokenIssuer,
};
use newsdesk_types::{AvatarQuality, Utterance, VoiceEmotion, VoiceSettings};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn request() -> SessionRequest {
    SessionRequest {
        avatar_name: "anchor-01".to_string(),
        quality: AvatarQuality::High,
        voice: VoiceSettings {
            voice_id: "voice-9".to_string(),
            rate: 1.0,
            emotion: VoiceEmotion::Serious,
        },
    }
}

#[tokio::test]
async fn test_create_session_sends_avatar_and_voice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/streaming.new"))
        .and(header("authorization", "Bearer access-1"))
        .and(body_json(json!({
            "quality": "high",
            "avatar_name": "anchor-01",
            "voice": { "voice_id": "voice-9", "rate": 1.0, "emotion": "serious" },
            "version": "v2",
            "video_encoding": "H264"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "session_id": "sess-42",
                "url": "wss://rtc.example.com",
                "access_token": "rtc-token"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = StreamingApiBackend::new(server.uri(), TIMEOUT).expect("http client");
    let session = backend
        .create_session("access-1", &request())
        .await
        .expect("should create session");

    assert_eq!(session.session_id, "sess-42");
    assert_eq!(session.access_token, "access-1");
    assert_eq!(session.stream.url, "wss://rtc.example.com");
    assert_eq!(session.stream.access_token, "rtc-token");
}

#[tokio::test]
async fn test_speak_posts_task_for_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/streaming.new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "session_id": "sess-1", "url": "wss://x", "access_token": "y" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/streaming.task"))
        .and(header("authorization", "Bearer access-1"))
        .and(body_json(json!({
            "session_id": "sess-1",
            "text": "Good morning.",
            "task_type": "repeat"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = StreamingApiBackend::new(format!("{}/", server.uri()), TIMEOUT).expect("http client");
    let session = backend
        .create_session("access-1", &request())
        .await
        .expect("create");
    backend
        .speak(&session, &Utterance::repeat("Good morning."))
        .await
        .expect("speak");
}

#[tokio::test]
async fn test_vendor_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/streaming.new"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let backend = StreamingApiBackend::new(server.uri(), TIMEOUT).expect("http client");
    let err = backend
        .create_session("access-1", &request())
        .await
        .expect_err("should fail");

    match err {
        AvatarError::Vendor { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("expected vendor error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_access_token_source_reads_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/get-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tok-abc\n"))
        .mount(&server)
        .await;

    let source =
        HttpAccessTokenSource::new(format!("{}/api/get-access-token", server.uri()), TIMEOUT)
            .expect("http client");
    assert_eq!(source.fetch().await.expect("fetch"), "tok-abc");
}

#[tokio::test]
async fn test_access_token_source_rejects_empty_and_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  "))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let empty = HttpAccessTokenSource::new(format!("{}/empty", server.uri()), TIMEOUT)
        .expect("http client");
    assert!(matches!(
        empty.fetch().await,
        Err(AvatarError::AccessToken(_))
    ));

    let broken = HttpAccessTokenSource::new(format!("{}/broken", server.uri()), TIMEOUT)
        .expect("http client");
    assert!(matches!(
        broken.fetch().await,
        Err(AvatarError::AccessToken(_))
    ));
}

#[tokio::test]
async fn test_issuer_exchanges_api_key_for_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/streaming.create_token"))
        .and(header("x-api-key", "sk-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "token": "minted" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let issuer = StreamingTokenIssuer::new(StreamingApiConfig::new(server.uri(), "sk-test"))
        .expect("http client");
    assert_eq!(issuer.create_token().await.expect("issue"), "minted");
}

#[tokio::test]
async fn test_issuer_without_api_key_is_config_error() {
    let issuer = StreamingTokenIssuer::new(StreamingApiConfig::default()).expect("http client");
    assert!(!issuer.is_enabled());
    assert!(matches!(
        issuer.create_token().await,
        Err(AvatarError::Config(_))
    ));
}
