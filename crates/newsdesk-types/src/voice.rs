//! Avatar appearance and voice settings.
//!
//! These map one-to-one onto the session creation parameters of the
//! streaming avatar API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest speaking rate the vendor accepts.
pub const MIN_VOICE_RATE: f32 = 0.5;
/// Highest speaking rate the vendor accepts.
pub const MAX_VOICE_RATE: f32 = 1.5;

/// Rendering quality of the avatar video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarQuality {
    Low,
    Medium,
    #[default]
    High,
}

impl AvatarQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Emotional colouring applied to the synthesized voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceEmotion {
    Excited,
    #[default]
    Serious,
    Friendly,
    Soothing,
    Broadcaster,
}

/// Voice parameters for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Vendor voice identifier.
    pub voice_id: String,
    /// Speaking rate multiplier, `0.5..=1.5`.
    pub rate: f32,
    pub emotion: VoiceEmotion,
}

/// Returned when voice settings fall outside what the vendor accepts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidVoiceSettings {
    #[error("voice rate {0} is outside 0.5..=1.5")]
    Rate(f32),
    #[error("voice id must not be empty")]
    MissingVoiceId,
}

impl VoiceSettings {
    pub fn validate(&self) -> Result<(), InvalidVoiceSettings> {
        if self.voice_id.trim().is_empty() {
            return Err(InvalidVoiceSettings::MissingVoiceId);
        }
        if !(MIN_VOICE_RATE..=MAX_VOICE_RATE).contains(&self.rate) {
            return Err(InvalidVoiceSettings::Rate(self.rate));
        }
        Ok(())
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice_id: "45980606751346deaf6415a2ba6cdfde".to_string(),
            rate: 1.05,
            emotion: VoiceEmotion::Serious,
        }
    }
}
