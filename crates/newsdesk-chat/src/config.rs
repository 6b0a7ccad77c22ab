use serde::{Deserialize, Serialize};

fn default_endpoint() -> String {
    "https://llm.playground.yukkalab.com/api/v2/chat".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_markers() -> Vec<String> {
    vec!["Summary".to_string(), "Conclusion".to_string()]
}

fn default_brand() -> Option<BrandRename> {
    Some(BrandRename {
        pattern: "yukka".to_string(),
        replacement: "YUUKA".to_string(),
    })
}

/// Whether previous turns are sent along with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// Every request carries an empty history.
    #[default]
    Stateless,
    /// Completed turns are replayed as `{role, content}` pairs.
    Accumulate,
}

/// Case-insensitive literal replacement applied to every reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRename {
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Section markers, tried in order. The reply is cut to what follows the
    /// first marker found.
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,

    #[serde(default = "default_brand")]
    pub brand: Option<BrandRename>,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            markers: default_markers(),
            brand: default_brand(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub reply: ReplyConfig,

    /// Filler phrases; one is spoken at random while the reply is pending.
    /// Empty disables acknowledgements.
    #[serde(default)]
    pub acknowledgements: Vec<String>,

    #[serde(default)]
    pub history: HistoryMode,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            reply: ReplyConfig::default(),
            acknowledgements: Vec::new(),
            history: HistoryMode::default(),
        }
    }
}

impl ChatConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}
