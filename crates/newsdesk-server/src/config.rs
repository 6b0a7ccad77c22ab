//! Configuration loading from file and environment variables.

use newsdesk_auth::{AuthConfig, Credentials};
use newsdesk_avatar::{AvatarConfig, StreamingApiConfig};
use newsdesk_chat::ChatConfig;
use newsdesk_voice::TranscriptionConfig;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level configuration shared by the server and the console.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Chat backend login and token persistence.
    #[serde(default)]
    pub auth: AuthSection,

    /// Avatar session settings plus the server-side vendor API key.
    #[serde(default)]
    pub avatar: AvatarSection,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// What the presenter says on its own.
    #[serde(default)]
    pub persona: PersonaConfig,
}

/// Network configuration for the access-token server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "newsdesk_chat=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Where the chat token is kept between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStoreKind {
    Memory,
    #[default]
    File,
    /// OS credential storage. Requires the `keyring` feature.
    Keyring,
}

#[derive(Clone, Deserialize)]
pub struct AuthSection {
    #[serde(flatten)]
    pub client: AuthConfig,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub token_store: TokenStoreKind,

    #[serde(default = "default_token_path")]
    pub token_path: String,
}

#[derive(Clone, Deserialize)]
pub struct AvatarSection {
    #[serde(flatten)]
    pub client: AvatarConfig,

    /// Vendor API key. Only the access-token server needs it.
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonaConfig {
    /// Spoken when a new stream becomes ready. Overrides `avatar.greeting`.
    #[serde(default)]
    pub greeting: Option<String>,

    /// Filler phrases spoken while a reply is pending. Overrides
    /// `chat.acknowledgements` when non-empty.
    #[serde(default)]
    pub acknowledgements: Vec<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_path() -> String {
    "newsdesk-token.json".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            client: AuthConfig::default(),
            email: None,
            password: None,
            token_store: TokenStoreKind::default(),
            token_path: default_token_path(),
        }
    }
}

impl fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSection")
            .field("client", &self.client)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("token_store", &self.token_store)
            .field("token_path", &self.token_path)
            .finish()
    }
}

impl AuthSection {
    /// Configured login, if both halves are present.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(Credentials::new(email.clone(), password.clone()))
            }
            _ => None,
        }
    }
}

impl Default for AvatarSection {
    fn default() -> Self {
        Self {
            client: AvatarConfig::default(),
            api_key: String::new(),
        }
    }
}

impl fmt::Debug for AvatarSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarSection")
            .field("client", &self.client)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AvatarSection {
    pub fn streaming_api(&self) -> StreamingApiConfig {
        StreamingApiConfig {
            base_url: self.client.base_url.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.client.timeout_secs,
        }
    }
}

impl Config {
    /// Avatar settings with the persona applied.
    pub fn avatar_config(&self) -> AvatarConfig {
        let mut avatar = self.avatar.client.clone();
        if let Some(greeting) = &self.persona.greeting {
            avatar.greeting = Some(greeting.clone());
        }
        avatar
    }

    /// Chat settings with the persona applied.
    pub fn chat_config(&self) -> ChatConfig {
        let mut chat = self.chat.clone();
        if !self.persona.acknowledgements.is_empty() {
            chat.acknowledgements = self.persona.acknowledgements.clone();
        }
        chat
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Picks the config file: first CLI argument, then `NEWSDESK_CONFIG_PATH`,
/// then `newsdesk.toml`. Returns the path and where it came from.
pub fn resolve_config_path(cli_arg: Option<String>) -> (String, &'static str) {
    if let Some(path) = cli_arg.filter(|value| !value.trim().is_empty()) {
        return (path, "cli-arg");
    }

    if let Ok(path) = std::env::var("NEWSDESK_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (path, "env-var");
        }
    }

    ("newsdesk.toml".to_string(), "default")
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides.
///
/// Environment variable overrides:
/// - `NEWSDESK_HOST`, `NEWSDESK_PORT` override `server.*`
/// - `NEWSDESK_LOG_LEVEL`, `NEWSDESK_LOG_JSON` override `logging.*`
/// - `NEWSDESK_AVATAR_API_KEY` overrides `avatar.api_key`
/// - `NEWSDESK_TRANSCRIPTION_API_KEY` overrides `transcription.api_key`
/// - `NEWSDESK_AUTH_EMAIL`, `NEWSDESK_AUTH_PASSWORD` override `auth.*`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies `NEWSDESK_*` overrides read through `lookup`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(host) = lookup("NEWSDESK_HOST") {
        match host.parse() {
            Ok(parsed) => config.server.host = parsed,
            Err(_) => tracing::warn!(value = %host, "ignoring invalid NEWSDESK_HOST"),
        }
    }
    if let Some(port) = lookup("NEWSDESK_PORT") {
        match port.parse() {
            Ok(parsed) => config.server.port = parsed,
            Err(_) => tracing::warn!(value = %port, "ignoring invalid NEWSDESK_PORT"),
        }
    }
    if let Some(level) = lookup("NEWSDESK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("NEWSDESK_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(key) = lookup("NEWSDESK_AVATAR_API_KEY") {
        config.avatar.api_key = key;
    }
    if let Some(key) = lookup("NEWSDESK_TRANSCRIPTION_API_KEY") {
        config.transcription.api_key = key;
    }
    if let Some(email) = lookup("NEWSDESK_AUTH_EMAIL") {
        config.auth.email = Some(email);
    }
    if let Some(password) = lookup("NEWSDESK_AUTH_PASSWORD") {
        config.auth.password = Some(password);
    }
}
