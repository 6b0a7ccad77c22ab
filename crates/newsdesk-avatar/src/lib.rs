//! Streaming avatar session control.
//!
//! A [`SessionController`] owns at most one live avatar session. Starting a
//! session fetches a short-lived access token from the local token endpoint,
//! asks the vendor to create and start a stream for the configured avatar
//! and voice, and publishes the resulting [`MediaStream`] to whoever renders
//! it. Text is then pushed to the session with [`SessionController::speak`]
//! until the session is ended or the vendor disconnects.
//!
//! Session lifecycle is an explicit state machine ([`SessionState`]):
//!
//! ```text
//! Idle -> Starting -> Ready <-> Speaking
//!                       \         /
//!                        -> Ended <-   (also from any state on disconnect)
//! ```
//!
//! Disconnection is terminal. There is no automatic reconnect; callers start
//! a new session.
//!
//! The vendor itself sits behind [`AvatarBackend`]. [`StreamingApiBackend`]
//! speaks the vendor's streaming REST API; tests substitute in-memory fakes.

pub mod access;
pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod issuer;
pub mod media;
pub mod state;
pub mod streaming;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use access::{AccessTokenSource, HttpAccessTokenSource};
pub use backend::{AvatarBackend, SessionInfo, SessionRequest, StreamEndpoint};
pub use config::{AvatarConfig, StreamingApiConfig};
pub use controller::SessionController;
pub use error::AvatarError;
pub use issuer::StreamingTokenIssuer;
pub use media::MediaStream;
pub use state::{SessionEvent, SessionState};
pub use streaming::StreamingApiBackend;
