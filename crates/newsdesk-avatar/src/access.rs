//! Client side of the local access-token endpoint.

use crate::error::AvatarError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Supplies short-lived access tokens for new avatar sessions.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn fetch(&self) -> Result<String, AvatarError>;
}

/// Fetches tokens with a body-less `POST` to the local token endpoint,
/// which answers with the token as plain text.
#[derive(Debug, Clone)]
pub struct HttpAccessTokenSource {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpAccessTokenSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AvatarError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AccessTokenSource for HttpAccessTokenSource {
    async fn fetch(&self) -> Result<String, AvatarError> {
        let response = self
            .http
            .post(&self.endpoint)
            .send()
            .await
            .map_err(|e| AvatarError::AccessToken(format!("token endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AvatarError::AccessToken(format!(
                "token endpoint returned status {}",
                status.as_u16()
            )));
        }

        let token = response
            .text()
            .await
            .map_err(|e| AvatarError::AccessToken(format!("unreadable token body: {e}")))?
            .trim()
            .to_string();

        if token.is_empty() {
            return Err(AvatarError::AccessToken(
                "token endpoint returned an empty token".to_string(),
            ));
        }

        debug!(len = token.len(), "fetched avatar access token");
        Ok(token)
    }
}
