//! In-memory stand-ins for the backend, the socket and the capture device

#![allow(dead_code)]

use async_trait::async_trait;
use error_common::{Result, SkribeError};
use parking_lot::Mutex;
use serde_json::json;
use skribe_client::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn session_detail() -> SessionDetail {
    serde_json::from_value(json!({
        "session_id": "s-1",
        "doctor_name": "Gregory House",
        "patient_name": "Jane Doe",
        "transcript": "",
        "soap_note": null,
        "patient_summary": "Take fluids and rest.",
        "compliance_report": null,
        "qr_code_url": null,
        "created_at": "2025-01-05T10:30:00.123456",
        "updated_at": null
    }))
    .unwrap()
}

/// Recorded REST calls
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create { doctor: String, patient: String },
    Get(String),
    List(ListQuery),
    UpdateTranscript { session_id: String, transcript: String },
    EditSummary { session_id: String, prompt: String },
    GenerateQr(String),
}

#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<ApiCall>>,
    pub detail: Mutex<Option<SessionDetail>>,
    pub sessions: Mutex<Vec<SessionSummary>>,
    pub fail: AtomicBool,
    /// Latency added to transcript persistence, in milliseconds
    pub transcript_delay_ms: AtomicU64,
}

impl FakeApi {
    pub fn with_detail(detail: SessionDetail) -> Arc<Self> {
        let api = Self::default();
        *api.detail.lock() = Some(detail);
        Arc::new(api)
    }

    pub fn failing() -> Arc<Self> {
        let api = Self::default();
        api.fail.store(true, Ordering::SeqCst);
        Arc::new(api)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: ApiCall) -> Result<()> {
        self.calls.lock().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SkribeError::HttpError { status: 500, detail: "backend unavailable".into() });
        }
        Ok(())
    }
}

#[async_trait]
impl SessionApi for FakeApi {
    async fn create_session(&self, doctor_name: &str, patient_name: &str) -> Result<CreatedSession> {
        self.record(ApiCall::Create { doctor: doctor_name.into(), patient: patient_name.into() })?;
        Ok(CreatedSession {
            session_id: "new-1".into(),
            doctor_name: doctor_name.into(),
            patient_name: patient_name.into(),
            created_at: None,
        })
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionDetail> {
        self.record(ApiCall::Get(session_id.into()))?;
        self.detail
            .lock()
            .clone()
            .ok_or_else(|| SkribeError::NotFound(format!("Session: {}", session_id)))
    }

    async fn list_sessions(&self, query: ListQuery) -> Result<Vec<SessionSummary>> {
        self.record(ApiCall::List(query))?;
        Ok(self.sessions.lock().clone())
    }

    async fn update_transcript(&self, session_id: &str, transcript: &str) -> Result<()> {
        let delay = self.transcript_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        self.record(ApiCall::UpdateTranscript { session_id: session_id.into(), transcript: transcript.into() })
    }

    async fn edit_summary(&self, session_id: &str, edit_prompt: &str) -> Result<EditSummaryResponse> {
        self.record(ApiCall::EditSummary { session_id: session_id.into(), prompt: edit_prompt.into() })?;
        Ok(EditSummaryResponse {
            message: "Summary edited successfully".into(),
            updated_summary: format!("Edited: {}", edit_prompt),
        })
    }

    async fn generate_qr_code(&self, session_id: &str) -> Result<QrCode> {
        self.record(ApiCall::GenerateQr(session_id.into()))?;
        Ok(QrCode {
            qr_code_url: format!("http://localhost:3000/patient/{}", session_id),
            qr_code_image: None,
            session_id: session_id.into(),
        })
    }
}

/// Handles kept by the test after the transport moves into the session
#[derive(Clone)]
pub struct TransportProbe {
    pub sent: Arc<Mutex<Vec<ClientMessage>>>,
    pub open: Arc<AtomicBool>,
    pub push: mpsc::UnboundedSender<ServerMessage>,
}

impl TransportProbe {
    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().clone()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn push(&self, message: ServerMessage) {
        self.push.send(message).unwrap();
    }
}

pub struct FakeTransport {
    sent: Arc<Mutex<Vec<ClientMessage>>>,
    open: Arc<AtomicBool>,
    inbound: mpsc::UnboundedReceiver<ServerMessage>,
}

impl FakeTransport {
    pub fn new() -> (Box<dyn MessageTransport>, TransportProbe) {
        let (push, inbound) = mpsc::unbounded_channel();
        let probe = TransportProbe {
            sent: Arc::new(Mutex::new(Vec::new())),
            open: Arc::new(AtomicBool::new(true)),
            push,
        };
        let transport = FakeTransport {
            sent: probe.sent.clone(),
            open: probe.open.clone(),
            inbound,
        };
        (Box::new(transport), probe)
    }
}

#[async_trait]
impl MessageTransport for FakeTransport {
    async fn send(&self, message: &ClientMessage) -> Result<()> {
        if !self.is_open() {
            return Err(SkribeError::WebSocketError("connection is closed".into()));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Option<ServerMessage> {
        if !self.is_open() {
            return None;
        }
        self.inbound.recv().await
    }

    async fn close(&mut self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Capture device that emits a fixed list of chunks when stopped
pub struct FakeCapture {
    chunks: Vec<Vec<u8>>,
    sink: Option<ChunkSink>,
    active: Arc<AtomicBool>,
    fail_on_stop: bool,
}

impl FakeCapture {
    pub fn new(chunks: Vec<Vec<u8>>) -> (Box<dyn AudioCapture>, Arc<AtomicBool>) {
        let active = Arc::new(AtomicBool::new(false));
        let capture = FakeCapture { chunks, sink: None, active: active.clone(), fail_on_stop: false };
        (Box::new(capture), active)
    }

    /// Buffers its chunks like `new`, then reports a device error on stop
    pub fn failing_on_stop(chunks: Vec<Vec<u8>>) -> Box<dyn AudioCapture> {
        let active = Arc::new(AtomicBool::new(false));
        Box::new(FakeCapture { chunks, sink: None, active, fail_on_stop: true })
    }

    pub fn silent() -> Box<dyn AudioCapture> {
        Self::new(Vec::new()).0
    }
}

impl AudioCapture for FakeCapture {
    fn start(&mut self, sink: ChunkSink) -> Result<()> {
        self.sink = Some(sink);
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            for chunk in self.chunks.drain(..) {
                sink.push(chunk);
            }
        }
        self.active.store(false, Ordering::SeqCst);
        if self.fail_on_stop {
            return Err(SkribeError::RecordingError("device disconnected".into()));
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn name(&self) -> String {
        "fake".into()
    }
}
