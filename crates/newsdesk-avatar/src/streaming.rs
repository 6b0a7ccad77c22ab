//! [`AvatarBackend`] over the vendor's streaming REST API.

use crate::backend::{AvatarBackend, SessionInfo, SessionRequest, StreamEndpoint};
use crate::error::AvatarError;
use async_trait::async_trait;
use newsdesk_types::Utterance;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Serialize)]
struct NewSessionBody<'a> {
    quality: &'a str,
    avatar_name: &'a str,
    voice: VoiceBody<'a>,
    version: &'static str,
    video_encoding: &'static str,
}

#[derive(Serialize)]
struct VoiceBody<'a> {
    voice_id: &'a str,
    rate: f32,
    emotion: newsdesk_types::VoiceEmotion,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct NewSessionData {
    session_id: String,
    url: String,
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct StreamingApiBackend {
    http: reqwest::Client,
    base_url: String,
}

impl StreamingApiBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AvatarError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        bearer: &str,
        body: &Value,
    ) -> Result<T, AvatarError> {
        let url = format!("{}/v1/{}", self.base_url, endpoint);
        debug!(%url, "streaming API request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(bearer)
            .json(body)
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

        response
            .json()
            .await
            .map_err(|e| AvatarError::MalformedResponse(format!("{endpoint}: {e}")))
    }

    async fn session_call(&self, endpoint: &str, session: &SessionInfo) -> Result<(), AvatarError> {
        self.call::<Value>(
            endpoint,
            &session.access_token,
            &json!({ "session_id": session.session_id }),
        )
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl AvatarBackend for StreamingApiBackend {
    async fn create_session(
        &self,
        access_token: &str,
        request: &SessionRequest,
    ) -> Result<SessionInfo, AvatarError> {
        let body = NewSessionBody {
            quality: request.quality.as_str(),
            avatar_name: &request.avatar_name,
            voice: VoiceBody {
                voice_id: &request.voice.voice_id,
                rate: request.voice.rate,
                emotion: request.voice.emotion,
            },
            version: "v2",
            video_encoding: "H264",
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| AvatarError::MalformedResponse(format!("encoding request: {e}")))?;

        let envelope: Envelope<NewSessionData> =
            self.call("streaming.new", access_token, &body).await?;
        let data = envelope.data;

        info!(session_id = %data.session_id, "created avatar session");
        Ok(SessionInfo {
            session_id: data.session_id,
            access_token: access_token.to_string(),
            stream: StreamEndpoint {
                url: data.url,
                access_token: data.access_token,
            },
        })
    }

    async fn start_session(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.session_call("streaming.start", session).await
    }

    async fn speak(
        &self,
        session: &SessionInfo,
        utterance: &Utterance,
    ) -> Result<(), AvatarError> {
        self.call::<Value>(
            "streaming.task",
            &session.access_token,
            &json!({
                "session_id": session.session_id,
                "text": utterance.text,
                "task_type": utterance.task_type.as_str(),
            }),
        )
        .await
        .map(|_| ())
    }

    async fn interrupt(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.session_call("streaming.interrupt", session).await
    }

    async fn stop(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.session_call("streaming.stop", session).await
    }

    async fn start_listening(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.session_call("streaming.start_listening", session).await
    }

    async fn stop_listening(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.session_call("streaming.stop_listening", session).await
    }
}
