//! Token persistence.
//!
//! A store holds at most one token. `save` replaces whatever was there.

use crate::error::AuthError;
use crate::token::Token;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<Token>, AuthError>;
    fn save(&self, token: &Token) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Token>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`.
    pub fn with_token(token: Token) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Token>, AuthError> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, token: &Token) -> Result<(), AuthError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).take();
        Ok(())
    }
}

/// On-disk layout of [`FileTokenStore`]: two keys, mirroring the two
/// local-storage entries the browser client kept.
#[derive(Serialize, Deserialize)]
struct PersistedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Persists the token as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Token>, AuthError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AuthError::Store(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        match serde_json::from_str::<PersistedToken>(&contents) {
            Ok(persisted) => Ok(Some(Token::new(persisted.token, persisted.expires_at))),
            Err(e) => {
                // A corrupt file is treated as "no token" so the next call re-authenticates.
                tracing::warn!(path = %self.path.display(), "discarding unreadable token file: {}", e);
                Ok(None)
            }
        }
    }

    fn save(&self, token: &Token) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuthError::Store(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let persisted = PersistedToken {
            token: token.value().to_string(),
            expires_at: token.expires_at(),
        };
        let json = serde_json::to_string_pretty(&persisted)
            .map_err(|e| AuthError::Store(format!("failed to encode token: {e}")))?;

        write_private(&self.path, json.as_bytes()).map_err(|e| {
            AuthError::Store(format!("failed to write {}: {e}", self.path.display()))
        })
    }

    fn clear(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Store(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// Writes `contents` readable by the owner only.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // The mode only applies on creation; tighten files left by older versions.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)
}

// ── OS credential storage (keyring) ──

#[cfg(feature = "keyring")]
const KEYRING_TOKEN: &str = "chat-token";
#[cfg(feature = "keyring")]
const KEYRING_TOKEN_EXPIRY: &str = "chat-token-expiry";

/// Stores the token and its expiry as two entries in the OS keyring.
#[cfg(feature = "keyring")]
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
}

#[cfg(feature = "keyring")]
impl KeyringTokenStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, AuthError> {
        keyring::Entry::new(&self.service, key)
            .map_err(|e| AuthError::Store(format!("keyring entry creation failed: {e}")))
    }

    fn read(&self, key: &str) -> Result<Option<String>, AuthError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(keyring::Error::NoStorageAccess(ref msg)) => {
                tracing::warn!("OS keyring not accessible: {msg}");
                Ok(None)
            }
            Err(e) => Err(AuthError::Store(format!("keyring read failed: {e}"))),
        }
    }

    fn delete(&self, key: &str) -> Result<(), AuthError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AuthError::Store(format!("keyring delete failed: {e}"))),
        }
    }
}

#[cfg(feature = "keyring")]
impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<Token>, AuthError> {
        let (Some(value), Some(expiry)) = (self.read(KEYRING_TOKEN)?, self.read(KEYRING_TOKEN_EXPIRY)?)
        else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(&expiry) {
            Ok(expires_at) => Ok(Some(Token::new(value, expires_at.with_timezone(&Utc)))),
            Err(e) => {
                tracing::warn!("discarding keyring token with unreadable expiry: {e}");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &Token) -> Result<(), AuthError> {
        self.entry(KEYRING_TOKEN)?
            .set_password(token.value())
            .map_err(|e| AuthError::Store(format!("keyring store failed: {e}")))?;
        self.entry(KEYRING_TOKEN_EXPIRY)?
            .set_password(&token.expires_at().to_rfc3339())
            .map_err(|e| AuthError::Store(format!("keyring store failed: {e}")))
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.delete(KEYRING_TOKEN)?;
        self.delete(KEYRING_TOKEN_EXPIRY)
    }
}
