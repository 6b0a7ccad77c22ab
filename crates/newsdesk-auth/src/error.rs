use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No valid token is cached and no credentials are available.
    #[error("authentication required: no valid token and no credentials set")]
    CredentialsRequired,

    #[error("authentication rejected with status {status}")]
    Rejected { status: u16 },

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("authentication request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token store error: {0}")]
    Store(String),
}
