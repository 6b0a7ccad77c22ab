use crate::error::VoiceError;
use crate::microphone::{Microphone, MicrophoneStream};
use crate::transcription::TranscriptionClient;
use newsdesk_chat::Orchestrator;
use newsdesk_types::Utterance;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Push-to-talk glue: record, transcribe, then ask.
pub struct VoiceTurn {
    microphone: Arc<dyn Microphone>,
    transcriber: TranscriptionClient,
    orchestrator: Arc<Orchestrator>,
    active: Mutex<Option<Box<dyn MicrophoneStream>>>,
}

impl VoiceTurn {
    pub fn new(
        microphone: Arc<dyn Microphone>,
        transcriber: TranscriptionClient,
        orchestrator: Arc<Orchestrator>,
    ) -> Self {
        Self {
            microphone,
            transcriber,
            orchestrator,
            active: Mutex::new(None),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Acquires the microphone and starts recording. Calling it while a
    /// recording is in progress keeps the current one.
    pub fn begin(&self) -> Result<(), VoiceError> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if active.is_some() {
            return Ok(());
        }
        let stream = self.microphone.open().inspect_err(|e| {
            warn!("failed to open microphone: {}", e);
        })?;
        *active = Some(stream);
        info!("recording started");
        Ok(())
    }

    /// Stops recording and discards the audio.
    pub fn cancel(&self) {
        let stream = self.active.lock().unwrap_or_else(|e| e.into_inner()).take();
        if stream.is_some() {
            info!("recording cancelled");
        }
    }

    /// Stops recording, transcribes the audio and asks the transcript.
    pub async fn complete(&self) -> Result<Utterance, VoiceError> {
        let stream = self
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| VoiceError::Recording("no recording in progress".to_string()))?;

        let result = self.transcribe_and_ask(stream).await;
        if let Err(e) = &result {
            warn!("voice turn aborted: {}", e);
        }
        result
    }

    async fn transcribe_and_ask(
        &self,
        stream: Box<dyn MicrophoneStream>,
    ) -> Result<Utterance, VoiceError> {
        // Finishing joins the capture thread.
        let recording = tokio::task::spawn_blocking(move || stream.finish())
            .await
            .map_err(|e| VoiceError::Recording(format!("capture task failed: {e}")))??;
        info!(
            duration_ms = recording.duration().as_millis() as u64,
            "recording stopped"
        );

        let transcript = self.transcriber.transcribe(&recording).await?;
        info!(chars = transcript.len(), "transcribed");

        Ok(self.orchestrator.ask(&transcript).await?)
    }
}

impl std::fmt::Debug for VoiceTurn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceTurn")
            .field("transcriber", &self.transcriber)
            .field("recording", &self.is_recording())
            .finish()
    }
}
