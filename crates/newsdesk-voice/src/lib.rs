//! Voice input for chat turns.
//!
//! A voice turn records the microphone until the user stops, uploads the
//! recording to a speech-to-text endpoint, and feeds the transcript to the
//! chat [`Orchestrator`](newsdesk_chat::Orchestrator) exactly as if it had
//! been typed. Any failure aborts the turn; nothing is retried.
//!
//! The microphone is a scoped resource: it is held only between
//! [`VoiceTurn::begin`] and [`VoiceTurn::complete`] (or
//! [`VoiceTurn::cancel`]), and dropping a turn mid-recording releases it.
//!
//! Real capture needs the `cpal` feature. Without it, [`NullMicrophone`]
//! stands in and every recording attempt fails with
//! [`VoiceError::MediaAccess`].

pub mod config;
#[cfg(feature = "cpal")]
pub mod cpal_backend;
pub mod error;
pub mod microphone;
pub mod recording;
pub mod transcription;
pub mod turn;

pub use config::TranscriptionConfig;
#[cfg(feature = "cpal")]
pub use cpal_backend::CpalMicrophone;
pub use error::VoiceError;
pub use microphone::{Microphone, MicrophoneStream, NullMicrophone};
pub use recording::{Recording, MAX_WAV_BYTES};
pub use transcription::TranscriptionClient;
pub use turn::VoiceTurn;

/// The microphone this build can use.
pub fn default_microphone() -> std::sync::Arc<dyn Microphone> {
    #[cfg(feature = "cpal")]
    {
        std::sync::Arc::new(CpalMicrophone::new())
    }
    #[cfg(not(feature = "cpal"))]
    {
        std::sync::Arc::new(NullMicrophone)
    }
}
