use crate::config::TranscriptionConfig;
use crate::error::VoiceError;
use crate::recording::{Recording, MAX_WAV_BYTES};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Speech-to-text over an OpenAI-compatible `audio/transcriptions` endpoint.
#[derive(Debug, Clone)]
pub struct TranscriptionClient {
    http: reqwest::Client,
    config: TranscriptionConfig,
}

impl TranscriptionClient {
    pub fn new(config: TranscriptionConfig) -> Result<Self, VoiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VoiceError::Transcription(format!("HTTP client error: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    /// Transcribes a recording and returns the trimmed text.
    pub async fn transcribe(&self, recording: &Recording) -> Result<String, VoiceError> {
        if recording.is_empty() {
            return Err(VoiceError::Transcription("recording is empty".to_string()));
        }
        let wav = recording.to_wav()?;
        self.transcribe_wav(wav).await
    }

    /// Transcribes an already encoded WAV file.
    pub async fn transcribe_wav(&self, wav: Vec<u8>) -> Result<String, VoiceError> {
        if !self.is_configured() {
            return Err(VoiceError::Transcription(
                "no transcription API key configured".to_string(),
            ));
        }
        if wav.len() > MAX_WAV_BYTES {
            return Err(VoiceError::Transcription(format!(
                "audio is {} bytes, limit is {} bytes",
                wav.len(),
                MAX_WAV_BYTES
            )));
        }

        debug!(bytes = wav.len(), model = %self.config.model, "uploading recording");

        let file = Part::bytes(wav)
            .file_name("recording.wav")
            .mime_str("audio/wav")
            .map_err(|e| VoiceError::Transcription(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.config.model.clone());

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Transcription(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "transcription request failed");
            return Err(VoiceError::Transcription(format!(
                "endpoint returned {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Transcription(format!("undecodable response: {e}")))?;

        let text = parsed.text.trim().to_string();
        debug!(chars = text.len(), "transcription received");
        Ok(text)
    }
}
