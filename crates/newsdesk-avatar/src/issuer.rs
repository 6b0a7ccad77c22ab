//! Server side of session access tokens.
//!
//! The vendor API key must never reach the client, so a local endpoint
//! exchanges it for a short-lived token on the client's behalf.

use crate::config::StreamingApiConfig;
use crate::error::AvatarError;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

#[derive(Deserialize)]
struct CreateTokenResponse {
    data: CreateTokenData,
}

#[derive(Deserialize)]
struct CreateTokenData {
    token: String,
}

#[derive(Debug, Clone)]
pub struct StreamingTokenIssuer {
    http: reqwest::Client,
    config: StreamingApiConfig,
}

impl StreamingTokenIssuer {
    pub fn new(config: StreamingApiConfig) -> Result<Self, AvatarError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Mints a new session access token with the configured API key.
    pub async fn create_token(&self) -> Result<String, AvatarError> {
        if !self.is_enabled() {
            return Err(AvatarError::Config(
                "streaming API key is not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/v1/streaming.create_token",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AvatarError::Vendor {
                status: status.as_u16(),
                message,
            });
        }

        let body: CreateTokenResponse = response
            .json()
            .await
            .map_err(|e| AvatarError::MalformedResponse(e.to_string()))?;

        info!("issued streaming access token");
        Ok(body.data.token)
    }
}
