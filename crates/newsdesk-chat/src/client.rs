//! HTTP client for the remote chat endpoint.

use crate::error::ChatError;
use crate::reply::extract_reply;
use newsdesk_auth::Token;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Request body: the new message plus ordered prior turns.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub history: &'a [HistoryEntry],
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Sends one message and returns the raw reply text, before any
    /// post-processing.
    pub async fn send(
        &self,
        token: &Token,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<String, ChatError> {
        debug!(chars = message.len(), history = history.len(), "sending chat request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token.value())
            .json(&ChatRequest { message, history })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "chat endpoint returned an error");
            return Err(ChatError::Remote {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedReply(format!("body is not JSON: {e}")))?;

        extract_reply(&body).ok_or_else(|| {
            let preview: String = body.to_string().chars().take(200).collect();
            ChatError::MalformedReply(preview)
        })
    }
}
