//! Audio recording for dictation
//!
//! Nothing is streamed while recording: chunks accumulate in a [`ChunkSink`]
//! and are concatenated into a single payload when the recorder stops.

use error_common::{Result, SkribeError};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default chunk size used by [`FileCapture`]
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Shared buffer a capture device pushes chunks into
#[derive(Debug, Clone, Default)]
pub struct ChunkSink {
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ChunkSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a chunk; empty chunks are ignored
    pub fn push(&self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.chunks.lock().push(chunk);
    }

    pub fn len(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate and clear everything buffered so far
    pub fn drain_concat(&self) -> Vec<u8> {
        std::mem::take(&mut *self.chunks.lock()).concat()
    }
}

/// A capture device. `start` acquires it, `stop` releases it; devices that
/// buffer internally must flush into the sink before `stop` returns.
pub trait AudioCapture: Send {
    fn start(&mut self, sink: ChunkSink) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn is_active(&self) -> bool;

    /// Human readable device name for logs
    fn name(&self) -> String;
}

/// Replays an existing recording in fixed-size chunks
#[derive(Debug)]
pub struct FileCapture {
    path: PathBuf,
    chunk_size: usize,
    active: bool,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            active: false,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl AudioCapture for FileCapture {
    fn start(&mut self, sink: ChunkSink) -> Result<()> {
        let audio = std::fs::read(&self.path).map_err(|e| {
            SkribeError::RecordingError(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        for chunk in audio.chunks(self.chunk_size) {
            sink.push(chunk.to_vec());
        }
        debug!(path = %self.path.display(), bytes = audio.len(), chunks = sink.len(), "Audio file buffered");
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Stand-in for sessions opened only to generate or edit documents
#[derive(Debug, Default)]
pub struct NoCapture;

impl AudioCapture for NoCapture {
    fn start(&mut self, _sink: ChunkSink) -> Result<()> {
        Err(SkribeError::RecordingError("no capture device configured".to_string()))
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_active(&self) -> bool {
        false
    }

    fn name(&self) -> String {
        "none".to_string()
    }
}

/// Idle / recording state machine around one capture device
pub struct Recorder {
    capture: Box<dyn AudioCapture>,
    sink: ChunkSink,
    recording: bool,
}

impl Recorder {
    pub fn new(capture: Box<dyn AudioCapture>) -> Self {
        Self {
            capture,
            sink: ChunkSink::new(),
            recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Chunks buffered in the current recording
    pub fn buffered_chunks(&self) -> usize {
        self.sink.len()
    }

    /// Begin capturing. Returns `false` when already recording.
    pub fn start(&mut self) -> Result<bool> {
        if self.recording {
            return Ok(false);
        }
        self.sink.drain_concat();
        self.capture.start(self.sink.clone())?;
        self.recording = true;
        info!(device = %self.capture.name(), "Recording started");
        Ok(true)
    }

    /// Stop capturing and return the whole recording, or `None` when idle.
    /// A device that fails to stop cleanly still yields what it buffered.
    pub fn stop(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.recording {
            return Ok(None);
        }
        self.recording = false;
        if let Err(e) = self.capture.stop() {
            warn!(device = %self.capture.name(), error = %e, "Capture device did not stop cleanly");
        }
        let chunks = self.sink.len();
        let payload = self.sink.drain_concat();
        info!(device = %self.capture.name(), chunks, bytes = payload.len(), "Recording stopped");
        Ok(Some(payload))
    }
}
