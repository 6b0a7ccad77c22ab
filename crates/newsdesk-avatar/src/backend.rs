//! The seam between session control and the avatar vendor.

use crate::error::AvatarError;
use async_trait::async_trait;
use newsdesk_types::{AvatarQuality, Utterance, VoiceSettings};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters for opening a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRequest {
    pub avatar_name: String,
    pub quality: AvatarQuality,
    pub voice: VoiceSettings,
}

/// Where the playback surface connects to receive audio/video.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEndpoint {
    pub url: String,
    pub access_token: String,
}

impl fmt::Debug for StreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamEndpoint")
            .field("url", &self.url)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// A vendor session, bound to the access token it was created with.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    /// Bearer token for follow-up calls on this session.
    pub access_token: String,
    pub stream: StreamEndpoint,
}

impl fmt::Debug for SessionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionInfo")
            .field("session_id", &self.session_id)
            .field("access_token", &"[REDACTED]")
            .field("stream", &self.stream)
            .finish()
    }
}

/// Operations a streaming avatar vendor provides.
#[async_trait]
pub trait AvatarBackend: Send + Sync {
    /// Allocates a session for the given avatar and voice.
    async fn create_session(
        &self,
        access_token: &str,
        request: &SessionRequest,
    ) -> Result<SessionInfo, AvatarError>;

    /// Starts streaming on a created session. Returns once the stream is ready.
    async fn start_session(&self, session: &SessionInfo) -> Result<(), AvatarError>;

    async fn speak(&self, session: &SessionInfo, utterance: &Utterance)
        -> Result<(), AvatarError>;

    async fn interrupt(&self, session: &SessionInfo) -> Result<(), AvatarError>;

    async fn stop(&self, session: &SessionInfo) -> Result<(), AvatarError>;

    async fn start_listening(&self, session: &SessionInfo) -> Result<(), AvatarError>;

    async fn stop_listening(&self, session: &SessionInfo) -> Result<(), AvatarError>;
}
