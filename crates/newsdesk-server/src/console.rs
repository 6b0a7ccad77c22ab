//! Wiring and command parsing for the interactive console.

use crate::config::{AuthSection, Config, TokenStoreKind};
use newsdesk_auth::{AuthError, FileTokenStore, MemoryTokenStore, TokenManager, TokenStore};
use newsdesk_avatar::{AvatarError, SessionController};
use newsdesk_chat::{ChatError, Orchestrator};
use newsdesk_voice::{Microphone, TranscriptionClient, VoiceError, VoiceTurn};
use std::sync::Arc;
use thiserror::Error;

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text for the presenter.
    Ask(String),
    /// Start recording, or stop and send if already recording.
    Mic,
    Interrupt,
    End,
    Login,
    Logout,
    Reset,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(name) = line.strip_prefix('/') else {
            return Command::Ask(line.to_string());
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "mic" => Command::Mic,
            "interrupt" => Command::Interrupt,
            "end" => Command::End,
            "login" => Command::Login,
            "logout" => Command::Logout,
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

pub const HELP: &str = "\
type a question and press enter, or:
  /mic        start recording; again to stop and send
  /interrupt  stop the presenter mid-sentence
  /end        close the avatar session
  /login      enter chat credentials
  /logout     forget credentials and the stored token
  /reset      forget conversation history
  /quit       leave";

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Avatar(#[from] AvatarError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error("token_store = \"keyring\" requires the keyring feature")]
    KeyringUnavailable,
}

/// Everything a console session talks to.
pub struct Session {
    pub tokens: Arc<TokenManager>,
    pub avatar: Arc<SessionController>,
    pub orchestrator: Arc<Orchestrator>,
    pub voice: Arc<VoiceTurn>,
}

impl Session {
    pub fn from_config(
        config: &Config,
        microphone: Arc<dyn Microphone>,
    ) -> Result<Self, SetupError> {
        let store = token_store(&config.auth)?;
        let mut tokens = TokenManager::new(config.auth.client.clone(), store)?;
        if let Some(credentials) = config.auth.credentials() {
            tokens = tokens.with_credentials(credentials);
        }
        let tokens = Arc::new(tokens);

        let avatar = Arc::new(SessionController::from_config(config.avatar_config())?);
        let orchestrator = Arc::new(Orchestrator::new(
            &config.chat_config(),
            tokens.clone(),
            avatar.clone(),
        )?);
        let voice = Arc::new(VoiceTurn::new(
            microphone,
            TranscriptionClient::new(config.transcription.clone())?,
            orchestrator.clone(),
        ));

        Ok(Self {
            tokens,
            avatar,
            orchestrator,
            voice,
        })
    }
}

/// Builds the configured token store.
pub fn token_store(auth: &AuthSection) -> Result<Arc<dyn TokenStore>, SetupError> {
    match auth.token_store {
        TokenStoreKind::Memory => Ok(Arc::new(MemoryTokenStore::new())),
        TokenStoreKind::File => Ok(Arc::new(FileTokenStore::new(&auth.token_path))),
        #[cfg(feature = "keyring")]
        TokenStoreKind::Keyring => Ok(Arc::new(newsdesk_auth::KeyringTokenStore::new(
            "newsdesk",
        ))),
        #[cfg(not(feature = "keyring"))]
        TokenStoreKind::Keyring => Err(SetupError::KeyringUnavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsdesk_voice::NullMicrophone;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  "), Command::Empty);
        assert_eq!(
            Command::parse(" What about DAX? "),
            Command::Ask("What about DAX?".to_string())
        );
        assert_eq!(Command::parse("/mic"), Command::Mic);
        assert_eq!(Command::parse("/QUIT"), Command::Quit);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/?"), Command::Help);
        assert_eq!(
            Command::parse("/dance"),
            Command::Unknown("dance".to_string())
        );
    }

    #[test]
    fn test_session_from_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.auth.token_path = dir.path().join("token.json").display().to_string();
        config.auth.email = Some("anchor@example.com".to_string());
        config.auth.password = Some("secret".to_string());

        let session = Session::from_config(&config, Arc::new(NullMicrophone)).unwrap();

        assert!(session.tokens.has_credentials());
        assert!(!session.avatar.is_active());
        assert!(!session.voice.is_recording());
    }

    #[test]
    fn test_memory_store_starts_empty() {
        let auth = AuthSection {
            token_store: TokenStoreKind::Memory,
            ..AuthSection::default()
        };
        let store = token_store(&auth).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(not(feature = "keyring"))]
    #[test]
    fn test_keyring_store_requires_feature() {
        let auth = AuthSection {
            token_store: TokenStoreKind::Keyring,
            ..AuthSection::default()
        };
        assert!(matches!(
            token_store(&auth),
            Err(SetupError::KeyringUnavailable)
        ));
    }
}
