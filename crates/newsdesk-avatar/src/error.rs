use crate::state::{SessionEvent, SessionState};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvatarError {
    /// An operation needed a live session and there was none.
    #[error("avatar session not initialized")]
    NotInitialized,

    #[error("invalid session transition: {event:?} in state {state:?}")]
    InvalidTransition {
        state: SessionState,
        event: SessionEvent,
    },

    #[error("access token error: {0}")]
    AccessToken(String),

    #[error("streaming API returned status {status}: {message}")]
    Vendor { status: u16, message: String },

    #[error("streaming API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected streaming API response: {0}")]
    MalformedResponse(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AvatarError {
    /// Whether the vendor no longer knows the session (closed on its side,
    /// for example after an idle timeout).
    pub fn is_session_gone(&self) -> bool {
        match self {
            AvatarError::Vendor { status: 404 | 410, .. } => true,
            AvatarError::Vendor {
                status: 400,
                message,
            } => message.to_ascii_lowercase().contains("session"),
            _ => false,
        }
    }
}
