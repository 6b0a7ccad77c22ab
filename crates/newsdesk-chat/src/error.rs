use newsdesk_auth::AuthError;
use newsdesk_avatar::AvatarError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// Input was empty after trimming. Nothing was sent.
    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("chat endpoint returned status {status}")]
    Remote { status: u16 },

    #[error("chat response has neither summary text nor messages: {0}")]
    MalformedReply(String),

    #[error("chat reply was empty after post-processing")]
    EmptyReply,

    /// A newer turn started while this one was waiting for its reply.
    #[error("turn {turn} was superseded by a newer turn")]
    Superseded { turn: u64 },

    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Avatar(#[from] AvatarError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
