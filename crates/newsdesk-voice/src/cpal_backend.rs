use crate::error::VoiceError;
use crate::microphone::{Microphone, MicrophoneStream};
use crate::recording::{append_capped, Recording, MAX_MONO_SAMPLES};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// The host's default input device.
///
/// `cpal::Stream` is not `Send` on every platform, so each capture owns a
/// dedicated thread that builds, plays and drops the stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalMicrophone;

impl CpalMicrophone {
    pub fn new() -> Self {
        Self
    }
}

impl Microphone for CpalMicrophone {
    fn open(&self) -> Result<Box<dyn MicrophoneStream>, VoiceError> {
        let samples = Arc::new(Mutex::new(Vec::<f32>::new()));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(u16, u32), VoiceError>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let buffer = Arc::clone(&samples);
        let worker = std::thread::Builder::new()
            .name("newsdesk-mic".to_string())
            .spawn(move || capture(buffer, ready_tx, stop_rx))
            .map_err(|e| VoiceError::Recording(format!("failed to spawn capture thread: {e}")))?;

        let (channels, sample_rate) = match ready_rx.recv() {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(VoiceError::Recording(
                    "capture thread exited before starting".to_string(),
                ));
            }
        };

        debug!(channels, sample_rate, "microphone opened");
        Ok(Box::new(CpalStream {
            samples,
            channels,
            sample_rate,
            stop: Some(stop_tx),
            worker: Some(worker),
        }))
    }
}

fn capture(
    buffer: Arc<Mutex<Vec<f32>>>,
    ready: mpsc::Sender<Result<(u16, u32), VoiceError>>,
    stop: mpsc::Receiver<()>,
) {
    let stream = match build_stream(buffer) {
        Ok((stream, format)) => {
            let _ = ready.send(Ok(format));
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    // Blocks until the owner stops or drops the handle.
    let _ = stop.recv();
    drop(stream);
    debug!("microphone released");
}

fn build_stream(buffer: Arc<Mutex<Vec<f32>>>) -> Result<(cpal::Stream, (u16, u32)), VoiceError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| VoiceError::MediaAccess("no input device available".to_string()))?;
    let supported = device
        .default_input_config()
        .map_err(|e| VoiceError::MediaAccess(e.to_string()))?;

    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();
    let format = (config.channels, config.sample_rate.0);
    // Interleaved samples that still downmix to an uploadable recording.
    let limit = MAX_MONO_SAMPLES * usize::from(config.channels.max(1));
    let on_error = |e: cpal::StreamError| warn!(error = %e, "microphone stream error");

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mut buffer = buffer.lock().unwrap_or_else(|e| e.into_inner());
                append_capped(&mut buffer, data.iter().copied(), limit);
            },
            on_error,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mut buffer = buffer.lock().unwrap_or_else(|e| e.into_inner());
                let samples = data.iter().map(|s| f32::from(*s) / f32::from(i16::MAX));
                append_capped(&mut buffer, samples, limit);
            },
            on_error,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            &config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                let mut buffer = buffer.lock().unwrap_or_else(|e| e.into_inner());
                let samples = data.iter().map(|s| (f32::from(*s) - 32768.0) / 32768.0);
                append_capped(&mut buffer, samples, limit);
            },
            on_error,
            None,
        ),
        other => {
            return Err(VoiceError::MediaAccess(format!(
                "unsupported sample format {other:?}"
            )))
        }
    }
    .map_err(|e| VoiceError::MediaAccess(e.to_string()))?;

    stream
        .play()
        .map_err(|e| VoiceError::MediaAccess(e.to_string()))?;

    Ok((stream, format))
}

struct CpalStream {
    samples: Arc<Mutex<Vec<f32>>>,
    channels: u16,
    sample_rate: u32,
    stop: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl CpalStream {
    fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("capture thread panicked");
            }
        }
    }
}

impl MicrophoneStream for CpalStream {
    fn finish(mut self: Box<Self>) -> Result<Recording, VoiceError> {
        self.stop();
        let data = std::mem::take(&mut *self.samples.lock().unwrap_or_else(|e| e.into_inner()));
        let recording = Recording::from_interleaved_f32(&data, self.channels, self.sample_rate);
        if recording.samples().len() >= MAX_MONO_SAMPLES {
            warn!("recording reached the upload limit and was cut short");
        }
        debug!(duration_ms = recording.duration().as_millis() as u64, "recording finished");
        Ok(recording)
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop();
    }
}
