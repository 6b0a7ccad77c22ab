use crate::error::VoiceError;
use std::io::Cursor;
use std::time::Duration;

/// Largest WAV file the transcription endpoint accepts (25 MiB).
pub const MAX_WAV_BYTES: usize = 25 * 1024 * 1024;

/// Header size of a plain 16-bit PCM WAV file.
const WAV_HEADER_BYTES: usize = 44;

/// Mono samples that fit in [`MAX_WAV_BYTES`].
pub const MAX_MONO_SAMPLES: usize = (MAX_WAV_BYTES - WAV_HEADER_BYTES) / 2;

/// Captured microphone audio: mono, signed 16-bit PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl Recording {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Builds a mono recording from interleaved multi-channel `f32` frames,
    /// averaging the channels of each frame.
    pub fn from_interleaved_f32(data: &[f32], channels: u16, sample_rate: u32) -> Self {
        let channels = usize::from(channels.max(1));
        let samples = data
            .chunks(channels)
            .map(|frame| {
                let mean = frame.iter().sum::<f32>() / frame.len() as f32;
                f32_to_i16(mean)
            })
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    /// Encodes the recording as a WAV file.
    pub fn to_wav(&self) -> Result<Vec<u8>, VoiceError> {
        if self.sample_rate == 0 {
            return Err(VoiceError::Recording("sample rate is zero".to_string()));
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in &self.samples {
                writer.write_sample(*sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

/// Appends capture data until `buffer` holds `limit` samples; the rest is
/// dropped. Returns `false` once the buffer is full.
pub(crate) fn append_capped(
    buffer: &mut Vec<f32>,
    samples: impl IntoIterator<Item = f32>,
    limit: usize,
) -> bool {
    let room = limit.saturating_sub(buffer.len());
    buffer.extend(samples.into_iter().take(room));
    buffer.len() < limit
}

pub(crate) fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_header_and_samples() {
        let recording = Recording::new(vec![0, 1000, -1000, i16::MAX], 16_000);
        let wav = recording.to_wav().unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, recording.samples());
    }

    #[test]
    fn test_stereo_frames_are_downmixed() {
        let recording = Recording::from_interleaved_f32(&[0.5, 0.5, 1.0, -1.0, 2.0, 2.0], 2, 48_000);
        assert_eq!(recording.samples().len(), 3);
        assert_eq!(recording.samples()[0], f32_to_i16(0.5));
        assert_eq!(recording.samples()[1], 0);
        assert_eq!(recording.samples()[2], i16::MAX);
    }

    #[test]
    fn test_capture_stops_at_limit() {
        let mut buffer = Vec::new();
        assert!(append_capped(&mut buffer, [0.1; 3], 5));
        assert!(!append_capped(&mut buffer, [0.2; 3], 5));
        assert!(!append_capped(&mut buffer, [0.3; 3], 5));
        assert_eq!(buffer, vec![0.1, 0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn test_longest_recording_fits_upload_limit() {
        let wav = Recording::new(vec![0; 1_000], 16_000).to_wav().unwrap();
        assert_eq!(wav.len(), WAV_HEADER_BYTES + 2 * 1_000);
        assert!(WAV_HEADER_BYTES + 2 * MAX_MONO_SAMPLES <= MAX_WAV_BYTES);
    }

    #[test]
    fn test_duration() {
        let recording = Recording::new(vec![0; 8_000], 16_000);
        assert_eq!(recording.duration(), Duration::from_millis(500));
        assert_eq!(Recording::new(vec![], 0).duration(), Duration::ZERO);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let err = Recording::new(vec![1, 2], 0).to_wav().unwrap_err();
        assert!(matches!(err, VoiceError::Recording(_)));
    }
}
