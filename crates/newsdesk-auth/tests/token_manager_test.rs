use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use newsdesk_auth::{
    AuthConfig, AuthError, Credentials, FixedClock, MemoryTokenStore, Token, TokenManager,
    TokenStore,
};
use serde::Serialize;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: i64,
}

fn mint_jwt(exp: i64) -> String {
    let claims = Claims {
        sub: "analyst".to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("should encode JWT")
}

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_800_000_000, 0).unwrap()
}

async fn mount_authenticate(server: &MockServer, jwt: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v5/authenticate"))
        .and(body_json(serde_json::json!({
            "email": "analyst@example.com",
            "password": "hunter2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": jwt })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn manager(server: &MockServer, store: Arc<dyn TokenStore>, clock: Arc<FixedClock>) -> TokenManager {
    TokenManager::new(
        AuthConfig::new(format!("{}/v5/authenticate", server.uri())),
        store,
    )
    .expect("http client")
    .with_clock(clock)
    .with_credentials(Credentials::new("analyst@example.com", "hunter2"))
}

#[tokio::test]
async fn test_fetches_and_persists_token_when_store_empty() {
    let server = MockServer::start().await;
    let exp = fixed_now().timestamp() + 3600;
    let jwt = mint_jwt(exp);
    mount_authenticate(&server, &jwt, 1).await;

    let store = Arc::new(MemoryTokenStore::new());
    let clock = Arc::new(FixedClock::new(fixed_now()));
    let manager = manager(&server, store.clone(), clock);

    let token = manager.get_token().await.expect("should authenticate");
    assert_eq!(token.value(), jwt);
    assert_eq!(token.expires_at().timestamp(), exp);

    let stored = store.load().expect("load").expect("token should be stored");
    assert_eq!(stored, token);
}

#[tokio::test]
async fn test_reuses_unexpired_token_without_network() {
    let server = MockServer::start().await;
    mount_authenticate(&server, &mint_jwt(0), 0).await;

    let cached = Token::new("cached", fixed_now() + Duration::minutes(5));
    let store = Arc::new(MemoryTokenStore::with_token(cached.clone()));
    let clock = Arc::new(FixedClock::new(fixed_now()));
    let manager = manager(&server, store, clock);

    let token = manager.get_token().await.expect("should use cache");
    assert_eq!(token, cached);
}

#[tokio::test]
async fn test_expired_token_triggers_fresh_authentication() {
    let server = MockServer::start().await;
    let jwt = mint_jwt(fixed_now().timestamp() + 3600);
    mount_authenticate(&server, &jwt, 1).await;

    let stale = Token::new("stale", fixed_now() - Duration::seconds(1));
    let store = Arc::new(MemoryTokenStore::with_token(stale));
    let clock = Arc::new(FixedClock::new(fixed_now()));
    let manager = manager(&server, store, clock);

    let token = manager.get_token().await.expect("should refresh");
    assert_eq!(token.value(), jwt);
}

#[tokio::test]
async fn test_token_expiring_exactly_now_is_refreshed() {
    let server = MockServer::start().await;
    let jwt = mint_jwt(fixed_now().timestamp() + 60);
    mount_authenticate(&server, &jwt, 1).await;

    let boundary = Token::new("boundary", fixed_now());
    let store = Arc::new(MemoryTokenStore::with_token(boundary));
    let clock = Arc::new(FixedClock::new(fixed_now()));

    let token = manager(&server, store, clock)
        .get_token()
        .await
        .expect("should refresh");
    assert_eq!(token.value(), jwt);
}

#[tokio::test]
async fn test_clock_advance_past_expiry_refreshes() {
    let server = MockServer::start().await;
    let first = mint_jwt(fixed_now().timestamp() + 60);
    mount_authenticate(&server, &first, 2).await;

    let store = Arc::new(MemoryTokenStore::new());
    let clock = Arc::new(FixedClock::new(fixed_now()));
    let manager = manager(&server, store, clock.clone());

    manager.get_token().await.expect("first call");
    manager.get_token().await.expect("cached call");
    clock.advance(Duration::seconds(61));
    manager.get_token().await.expect("refresh after expiry");
}

#[tokio::test]
async fn test_missing_credentials_requires_authentication() {
    let server = MockServer::start().await;
    let manager = TokenManager::new(
        AuthConfig::new(format!("{}/v5/authenticate", server.uri())),
        Arc::new(MemoryTokenStore::new()),
    )
    .expect("http client");

    let err = manager.get_token().await.expect_err("should need credentials");
    assert!(matches!(err, AuthError::CredentialsRequired));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_rejected_credentials_surface_status_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v5/authenticate"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let clock = Arc::new(FixedClock::new(fixed_now()));
    let manager = manager(&server, store.clone(), clock);

    let err = manager.get_token().await.expect_err("should be rejected");
    assert!(matches!(err, AuthError::Rejected { status: 401 }));
    assert!(store.load().expect("load").is_none());
}

#[tokio::test]
async fn test_token_without_exp_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v5/authenticate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "opaque" })),
        )
        .mount(&server)
        .await;

    let clock = Arc::new(FixedClock::new(fixed_now()));
    let err = manager(&server, Arc::new(MemoryTokenStore::new()), clock)
        .get_token()
        .await
        .expect_err("should fail");
    assert!(matches!(err, AuthError::MalformedToken(_)));
}

#[tokio::test]
async fn test_invalidate_forces_reauthentication() {
    let server = MockServer::start().await;
    let jwt = mint_jwt(fixed_now().timestamp() + 3600);
    mount_authenticate(&server, &jwt, 2).await;

    let clock = Arc::new(FixedClock::new(fixed_now()));
    let manager = manager(&server, Arc::new(MemoryTokenStore::new()), clock);

    manager.get_token().await.expect("first");
    manager.invalidate().expect("invalidate");
    manager.get_token().await.expect("second");
}
