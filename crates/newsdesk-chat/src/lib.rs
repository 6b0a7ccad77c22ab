//! Chat turn orchestration.
//!
//! A turn takes user text (typed, or transcribed upstream), sends it to the
//! remote chat endpoint with the user's bearer token, trims the answer down
//! to something worth saying out loud, and hands it to the avatar.
//!
//! - [`ChatClient`] speaks the endpoint's JSON contract, tolerating both
//!   reply shapes the backend is known to produce.
//! - [`ReplyPolicy`] applies the fixed post-processing rules.
//! - [`Orchestrator`] runs whole turns and drops replies that arrive after a
//!   newer turn has started.

pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod reply;

pub use client::{ChatClient, ChatRequest, HistoryEntry, Role};
pub use config::{BrandRename, ChatConfig, HistoryMode, ReplyConfig};
pub use error::ChatError;
pub use orchestrator::Orchestrator;
pub use reply::{extract_reply, ReplyPolicy};
