use newsdesk_types::{AvatarQuality, VoiceSettings};
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_base_url() -> String {
    "https://api.heygen.com".to_string()
}

fn default_token_endpoint() -> String {
    "http://127.0.0.1:3000/api/get-access-token".to_string()
}

fn default_avatar_name() -> String {
    "37f4d912aa564663a1cf8d63acd0e1ab".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Client-side avatar session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// Base URL of the vendor streaming API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Local endpoint that issues short-lived session access tokens.
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,

    /// Vendor avatar identity.
    #[serde(default = "default_avatar_name")]
    pub avatar_name: String,

    #[serde(default)]
    pub quality: AvatarQuality,

    #[serde(default)]
    pub voice: VoiceSettings,

    /// Spoken once when a new stream becomes ready.
    #[serde(default)]
    pub greeting: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_endpoint: default_token_endpoint(),
            avatar_name: default_avatar_name(),
            quality: AvatarQuality::default(),
            voice: VoiceSettings::default(),
            greeting: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Server-side credentials for minting session access tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct StreamingApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StreamingApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for StreamingApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StreamingApiConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}
