use crate::clock::{Clock, SystemClock};
use crate::config::{AuthConfig, Credentials};
use crate::error::AuthError;
use crate::store::TokenStore;
use crate::token::Token;
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Deserialize)]
struct AuthenticateResponse {
    token: String,
}

/// Hands out a valid bearer token for the chat backend, authenticating
/// again whenever the stored one is missing or expired.
pub struct TokenManager {
    http: reqwest::Client,
    config: AuthConfig,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    credentials: RwLock<Option<Credentials>>,
    /// Serializes refreshes so concurrent callers share one authentication.
    refresh: tokio::sync::Mutex<()>,
}

impl TokenManager {
    pub fn new(config: AuthConfig, store: Arc<dyn TokenStore>) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config,
            store,
            clock: Arc::new(SystemClock),
            credentials: RwLock::new(None),
            refresh: tokio::sync::Mutex::new(()),
        })
    }

    /// Replaces the time source. Used by tests to control expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_credentials(self, credentials: Credentials) -> Self {
        self.set_credentials(credentials);
        self
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        *self.credentials.write().unwrap_or_else(|e| e.into_inner()) = Some(credentials);
    }

    pub fn clear_credentials(&self) {
        self.credentials
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Drops the stored token so the next [`get_token`](Self::get_token)
    /// authenticates again.
    pub fn invalidate(&self) -> Result<(), AuthError> {
        self.store.clear()
    }

    /// Returns the stored token if it is still valid, otherwise
    /// authenticates with the configured credentials and stores the result.
    ///
    /// # Errors
    ///
    /// [`AuthError::CredentialsRequired`] when a fresh token is needed but no
    /// credentials are set; the caller should prompt for them. Any failure of
    /// the authentication call is returned as-is, without retrying.
    pub async fn get_token(&self) -> Result<Token, AuthError> {
        let _guard = self.refresh.lock().await;

        let now = self.clock.now();
        match self.store.load() {
            Ok(Some(token)) if token.is_usable_at(now) => return Ok(token),
            Ok(Some(token)) => {
                debug!(expires_at = %token.expires_at(), "stored token expired");
            }
            Ok(None) => {}
            Err(e) => warn!("could not read stored token, re-authenticating: {}", e),
        }

        let credentials = self
            .credentials
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(AuthError::CredentialsRequired)?;

        let token = self.authenticate(&credentials).await?;
        self.store.save(&token)?;
        Ok(token)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Token, AuthError> {
        info!(email = %credentials.email, "authenticating against chat backend");

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "authentication rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: AuthenticateResponse = response
            .json()
            .await
            .map_err(|e| AuthError::MalformedToken(format!("unexpected response body: {e}")))?;

        let token = Token::from_jwt(&body.token)?;
        debug!(expires_at = %token.expires_at(), "obtained chat token");
        Ok(token)
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("config", &self.config)
            .field("has_credentials", &self.has_credentials())
            .finish()
    }
}
