//! Default input device capture via cpal
//!
//! cpal streams are not `Send`, so the stream lives on a dedicated thread for
//! the duration of the recording. Samples are converted to 16-bit PCM and the
//! whole take is pushed to the sink as one WAV file when capture stops.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use error_common::{Result, SkribeError};
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use tracing::{info, warn};

use crate::recording::{AudioCapture, ChunkSink};

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<Result<()>>,
}

/// Records from the host's default input device
#[derive(Default)]
pub struct MicrophoneCapture {
    worker: Option<Worker>,
    device_name: Option<String>,
}

impl MicrophoneCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the available input devices
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| SkribeError::RecordingError(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();
        Ok(devices)
    }
}

impl AudioCapture for MicrophoneCapture {
    fn start(&mut self, sink: ChunkSink) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        let (ready_tx, ready_rx) = mpsc::channel::<Result<String>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = std::thread::Builder::new()
            .name("skribe-microphone".to_string())
            .spawn(move || -> Result<()> {
                let (stream, spec, samples, name) = match open_default_input() {
                    Ok(opened) => opened,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return Ok(());
                    }
                };
                let _ = ready_tx.send(Ok(name));

                // Either an explicit stop or the capture being dropped ends the take
                let _ = stop_rx.recv();
                drop(stream);

                let pcm = std::mem::take(&mut *samples.lock());
                sink.push(encode_wav(spec, &pcm)?);
                Ok(())
            })
            .map_err(|e| SkribeError::RecordingError(format!("Failed to spawn capture thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(name)) => {
                info!(device = %name, "Microphone capture started");
                self.device_name = Some(name);
                self.worker = Some(Worker { stop_tx, handle });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => Err(SkribeError::RecordingError("capture thread exited during start".to_string())),
        }
    }

    fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let _ = worker.stop_tx.send(());
        worker
            .handle
            .join()
            .map_err(|_| SkribeError::RecordingError("capture thread panicked".to_string()))?
    }

    fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    fn name(&self) -> String {
        self.device_name.clone().unwrap_or_else(|| "default microphone".to_string())
    }
}

impl Drop for MicrophoneCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "Microphone capture did not shut down cleanly");
        }
    }
}

type OpenedInput = (Stream, hound::WavSpec, Arc<Mutex<Vec<i16>>>, String);

fn open_default_input() -> Result<OpenedInput> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| SkribeError::RecordingError("No default input device found".to_string()))?;
    let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

    let supported = device
        .default_input_config()
        .map_err(|e| SkribeError::RecordingError(format!("Failed to get default config: {}", e)))?;
    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.config();

    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate.0,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let samples = Arc::new(Mutex::new(Vec::new()));
    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, samples.clone())?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, samples.clone())?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, samples.clone())?,
        other => {
            return Err(SkribeError::RecordingError(format!("Unsupported sample format: {:?}", other)));
        }
    };
    stream
        .play()
        .map_err(|e| SkribeError::RecordingError(format!("Failed to start stream: {}", e)))?;

    Ok((stream, spec, samples, name))
}

fn build_stream<T>(device: &Device, config: &StreamConfig, samples: Arc<Mutex<Vec<i16>>>) -> Result<Stream>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                samples.lock().extend(data.iter().map(|sample| i16::from_sample_(*sample)));
            },
            |err| warn!("Audio input stream error: {}", err),
            None,
        )
        .map_err(|e| SkribeError::RecordingError(format!("Failed to build stream: {}", e)))
}

fn encode_wav(spec: hound::WavSpec, samples: &[i16]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| SkribeError::RecordingError(format!("Failed to start WAV: {}", e)))?;
        for sample in samples {
            writer
                .write_sample(*sample)
                .map_err(|e| SkribeError::RecordingError(format!("Failed to write WAV: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| SkribeError::RecordingError(format!("Failed to finish WAV: {}", e)))?;
    }
    Ok(cursor.into_inner())
}
