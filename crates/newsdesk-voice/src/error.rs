use newsdesk_chat::ChatError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    /// The microphone could not be opened (missing device or permission denied).
    #[error("microphone unavailable: {0}")]
    MediaAccess(String),

    #[error("recording error: {0}")]
    Recording(String),

    #[error("transcription error: {0}")]
    Transcription(String),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl From<hound::Error> for VoiceError {
    fn from(e: hound::Error) -> Self {
        VoiceError::Recording(e.to_string())
    }
}
