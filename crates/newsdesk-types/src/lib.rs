//! Shared types for the newsdesk workspace.
//!
//! This crate holds the vocabulary every other crate speaks: what an
//! utterance is, how the avatar should sound and look, and the events a
//! streaming avatar session reports back. It has no I/O of its own.

pub mod voice;

use serde::{Deserialize, Serialize};

pub use voice::{AvatarQuality, InvalidVoiceSettings, VoiceEmotion, VoiceSettings};

/// How the avatar service should treat submitted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Speak the text verbatim.
    #[default]
    Repeat,
    /// Treat the text as a conversational prompt and let the vendor answer.
    Talk,
}

impl TaskType {
    /// Wire label used by the streaming API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repeat => "repeat",
            Self::Talk => "talk",
        }
    }
}

/// A unit of text submitted for speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub task_type: TaskType,
}

impl Utterance {
    pub fn repeat(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            task_type: TaskType::Repeat,
        }
    }

    pub fn talk(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            task_type: TaskType::Talk,
        }
    }
}

/// Playback events reported by a live avatar session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AvatarEvent {
    /// The media stream is up and can be attached to a playback surface.
    StreamReady,
    /// The vendor closed the stream. Terminal for the session.
    StreamDisconnected,
    AvatarStartTalking,
    AvatarStopTalking,
    /// Vendor-side voice activity detection heard the user start speaking.
    UserStartTalking,
    UserStopTalking,
}

impl AvatarEvent {
    /// Vendor event name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StreamReady => "stream_ready",
            Self::StreamDisconnected => "stream_disconnected",
            Self::AvatarStartTalking => "avatar_start_talking",
            Self::AvatarStopTalking => "avatar_stop_talking",
            Self::UserStartTalking => "user_start_talking",
            Self::UserStopTalking => "user_stop_talking",
        }
    }
}
