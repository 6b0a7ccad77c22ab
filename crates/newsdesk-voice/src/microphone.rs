use crate::error::VoiceError;
use crate::recording::Recording;

/// An audio input device.
pub trait Microphone: Send + Sync {
    /// Starts capturing. The device is held until the returned stream is
    /// finished or dropped.
    fn open(&self) -> Result<Box<dyn MicrophoneStream>, VoiceError>;
}

/// A live capture. Dropping it without calling `finish` discards the audio
/// and releases the device.
pub trait MicrophoneStream: Send {
    /// Stops capturing and returns everything recorded so far.
    fn finish(self: Box<Self>) -> Result<Recording, VoiceError>;
}

/// Stand-in for builds without audio capture.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMicrophone;

impl Microphone for NullMicrophone {
    fn open(&self) -> Result<Box<dyn MicrophoneStream>, VoiceError> {
        Err(VoiceError::MediaAccess(
            "audio capture is not available in this build".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_microphone_denies_access() {
        let result = NullMicrophone.open();
        assert!(matches!(result, Err(VoiceError::MediaAccess(_))));
    }
}
