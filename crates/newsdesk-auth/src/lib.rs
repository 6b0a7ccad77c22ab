//! Credential and bearer-token management for the chat backend.
//!
//! The chat endpoint is protected by a short-lived JWT obtained from a
//! customer authentication endpoint with an email/password pair.
//! [`TokenManager`] hands out the cached token while it is still valid and
//! re-authenticates once it expires. Persistence goes through the
//! [`TokenStore`] trait so callers choose where the token lives:
//!
//! - [`MemoryTokenStore`] keeps it for the lifetime of the process.
//! - [`FileTokenStore`] persists it as a small JSON document.
//! - `KeyringTokenStore` (feature `keyring`) uses the OS credential store.
//!
//! A token is usable only while the current time is strictly before its
//! expiry. Stored tokens are replaced wholesale, never edited.

pub mod clock;
pub mod config;
pub mod error;
pub mod manager;
pub mod store;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AuthConfig, Credentials};
pub use error::AuthError;
pub use manager::TokenManager;
#[cfg(feature = "keyring")]
pub use store::KeyringTokenStore;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::Token;
