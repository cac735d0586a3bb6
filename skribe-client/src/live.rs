//! Live session view
//!
//! Owns the recorder, the WebSocket connection and the in-memory session
//! record. Results pushed by the backend are merged field by field; REST
//! calls made from here follow catch, log, continue: a failure is reported,
//! remembered as [`LiveSession::last_error`] and leaves state unchanged.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use error_common::{report_error, ErrorContext, Result, SkribeError};
use logger_redacted::{redacted_warn, PiiRedactor, RedactionConfig};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::SessionApi;
use crate::config::ClientConfig;
use crate::models::{QrCode, SessionDetail, SessionUpdate};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::recording::{AudioCapture, Recorder};
use crate::transport::{MessageTransport, WsTransport};

/// Content tabs of the live session; exactly one is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Transcript,
    Soap,
    Summary,
    Compliance,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Transcript, Tab::Soap, Tab::Summary, Tab::Compliance];

    pub fn id(&self) -> &'static str {
        match self {
            Tab::Transcript => "transcript",
            Tab::Soap => "soap",
            Tab::Summary => "summary",
            Tab::Compliance => "compliance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Transcript => "Transcript",
            Tab::Soap => "SOAP Note",
            Tab::Summary => "Patient Summary",
            Tab::Compliance => "Compliance",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tab {
    type Err = SkribeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SkribeError::ValidationError(format!("unknown tab '{}'", s)))
    }
}

pub struct LiveSession {
    session_id: String,
    api: Arc<dyn SessionApi>,
    transport: Option<Box<dyn MessageTransport>>,
    recorder: Recorder,
    redactor: PiiRedactor,
    detail: SessionDetail,
    current_transcript: String,
    active_tab: Tab,
    is_processing: bool,
    is_generating_summary: bool,
    is_generating_qr: bool,
    qr_code: Option<QrCode>,
    editing_summary: bool,
    summary_edit_prompt: String,
    last_error: Option<String>,
    closed: bool,
}

impl LiveSession {
    /// Fetch the session, then open the transcription socket. A socket that
    /// cannot be opened is logged; the session still opens and sends are dropped.
    pub async fn connect(
        config: &ClientConfig,
        session_id: &str,
        api: Arc<dyn SessionApi>,
        capture: Box<dyn AudioCapture>,
    ) -> Result<Self> {
        let detail = api.get_session(session_id).await?;

        let transport: Option<Box<dyn MessageTransport>> =
            match WsTransport::connect(&config.transcription_ws_url()).await {
                Ok(transport) => Some(Box::new(transport)),
                Err(e) => {
                    report_error(&ErrorContext::new("connect_websocket").with_session_id(session_id), &e);
                    None
                }
            };

        Ok(Self::new(detail, api, transport, capture, config.redact_logs))
    }

    /// Fetch the session and mount it over an already established transport
    pub async fn open(
        session_id: &str,
        api: Arc<dyn SessionApi>,
        transport: Option<Box<dyn MessageTransport>>,
        capture: Box<dyn AudioCapture>,
        redact_logs: bool,
    ) -> Result<Self> {
        let detail = api.get_session(session_id).await?;
        Ok(Self::new(detail, api, transport, capture, redact_logs))
    }

    pub fn new(
        detail: SessionDetail,
        api: Arc<dyn SessionApi>,
        transport: Option<Box<dyn MessageTransport>>,
        capture: Box<dyn AudioCapture>,
        redact_logs: bool,
    ) -> Self {
        let redactor = if redact_logs {
            PiiRedactor::default().with_names([detail.doctor_name.as_str(), detail.patient_name.as_str()])
        } else {
            PiiRedactor::new(RedactionConfig::disabled())
        };
        info!(
            session_id = %detail.session_id,
            connected = transport.as_ref().is_some_and(|t| t.is_open()),
            "Live session opened"
        );

        Self {
            session_id: detail.session_id.clone(),
            current_transcript: detail.transcript.clone().unwrap_or_default(),
            api,
            transport,
            recorder: Recorder::new(capture),
            redactor,
            detail,
            active_tab: Tab::default(),
            is_processing: false,
            is_generating_summary: false,
            is_generating_qr: false,
            qr_code: None,
            editing_summary: false,
            summary_edit_prompt: String::new(),
            last_error: None,
            closed: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn detail(&self) -> &SessionDetail {
        &self.detail
    }

    pub fn current_transcript(&self) -> &str {
        &self.current_transcript
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_open())
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Audio is being transcribed or a SOAP note generated
    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn is_generating_summary(&self) -> bool {
        self.is_generating_summary
    }

    pub fn is_generating_qr(&self) -> bool {
        self.is_generating_qr
    }

    pub fn qr_code(&self) -> Option<&QrCode> {
        self.qr_code.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn take_last_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn redactor(&self) -> &PiiRedactor {
        &self.redactor
    }

    fn context(&self, operation: &str) -> ErrorContext {
        ErrorContext::new(operation).with_session_id(&self.session_id)
    }

    fn fail(&mut self, operation: &str, error: SkribeError) {
        report_error(&self.context(operation), &error);
        self.last_error = Some(error.to_string());
    }

    /// Send over the socket if it is open; otherwise log and drop
    async fn send(&mut self, message: ClientMessage) -> bool {
        let Some(transport) = self.transport.as_ref().filter(|t| t.is_open()) else {
            warn!(session_id = %self.session_id, kind = message.kind(), "WebSocket not open, message dropped");
            return false;
        };
        match transport.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                self.fail(message.kind(), e);
                false
            }
        }
    }

    // Recording

    /// Acquire the capture device. No-op while already recording.
    pub fn start_recording(&mut self) -> bool {
        match self.recorder.start() {
            Ok(started) => started,
            Err(e) => {
                self.fail("start_recording", e);
                false
            }
        }
    }

    /// Release the device and send the whole take for transcription.
    /// No-op while idle. Returns whether a request went out.
    pub async fn stop_recording(&mut self) -> bool {
        match self.recorder.stop() {
            Ok(Some(audio)) => {
                self.is_processing = true;
                debug!(session_id = %self.session_id, bytes = audio.len(), "Sending recording");
                let message = ClientMessage::TranscribeCompleteAudio {
                    data: STANDARD.encode(&audio),
                    session_id: self.session_id.clone(),
                };
                self.send(message).await
            }
            Ok(None) => false,
            Err(e) => {
                self.fail("stop_recording", e);
                false
            }
        }
    }

    // Generation requests

    pub fn can_generate_soap(&self) -> bool {
        !self.current_transcript.trim().is_empty() && !self.is_processing
    }

    pub async fn generate_soap(&mut self) -> bool {
        if !self.can_generate_soap() {
            return false;
        }
        self.is_processing = true;
        let message = ClientMessage::GenerateSoap {
            transcript: self.current_transcript.clone(),
            session_id: self.session_id.clone(),
        };
        self.send(message).await
    }

    pub fn can_generate_summary(&self) -> bool {
        self.detail.soap_note.is_some() && !self.is_generating_summary
    }

    pub async fn generate_summary(&mut self) -> bool {
        if !self.can_generate_summary() {
            return false;
        }
        self.is_generating_summary = true;
        let message = ClientMessage::GenerateSummary {
            transcript: self.current_transcript.clone(),
            session_id: self.session_id.clone(),
        };
        self.send(message).await
    }

    /// Only sent when a SOAP note exists
    pub async fn run_compliance_check(&mut self) -> bool {
        let Some(soap_note) = self.detail.soap_note.clone() else {
            return false;
        };
        self.send(ClientMessage::ComplianceCheck { soap_note }).await
    }

    // REST actions

    /// Issue a QR code for the patient summary. On failure the previous code
    /// (if any) is kept.
    pub async fn generate_qr_code(&mut self) -> bool {
        if self.is_generating_qr {
            return false;
        }
        self.is_generating_qr = true;
        let result = self.api.generate_qr_code(&self.session_id).await;
        self.is_generating_qr = false;

        match result {
            Ok(qr_code) => {
                info!(session_id = %self.session_id, "QR code generated");
                self.detail.apply(SessionUpdate::QrCodeUrl(qr_code.qr_code_url.clone()));
                self.qr_code = Some(qr_code);
                true
            }
            Err(e) => {
                self.fail("generate_qr_code", e);
                false
            }
        }
    }

    pub fn editing_summary(&self) -> bool {
        self.editing_summary
    }

    pub fn toggle_summary_editor(&mut self) {
        self.editing_summary = !self.editing_summary;
    }

    pub fn summary_edit_prompt(&self) -> &str {
        &self.summary_edit_prompt
    }

    pub fn set_summary_edit_prompt(&mut self, prompt: impl Into<String>) {
        self.summary_edit_prompt = prompt.into();
    }

    /// Submit the edit instructions. A blank prompt does nothing; on success
    /// the summary is replaced, the editor closed and the prompt cleared.
    pub async fn edit_summary(&mut self) -> bool {
        if self.summary_edit_prompt.trim().is_empty() {
            return false;
        }
        match self.api.edit_summary(&self.session_id, &self.summary_edit_prompt).await {
            Ok(response) => {
                info!(
                    session_id = %self.session_id,
                    summary = %self.redactor.describe_text(&response.updated_summary),
                    "Summary edited"
                );
                self.detail.apply(SessionUpdate::PatientSummary(response.updated_summary));
                self.editing_summary = false;
                self.summary_edit_prompt.clear();
                true
            }
            Err(e) => {
                self.fail("edit_summary", e);
                false
            }
        }
    }

    /// Re-fetch the session record
    pub async fn refresh(&mut self) -> bool {
        match self.api.get_session(&self.session_id).await {
            Ok(detail) => {
                self.current_transcript = detail.transcript.clone().unwrap_or_default();
                self.detail = detail;
                true
            }
            Err(e) => {
                self.fail("get_session", e);
                false
            }
        }
    }

    // Inbound dispatch

    /// Apply one message pushed by the backend
    pub async fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::TranscriptComplete { data } => {
                info!(
                    session_id = %self.session_id,
                    transcript = %self.redactor.describe_text(&data),
                    "Transcript received"
                );
                self.current_transcript = data.clone();
                self.detail.apply(SessionUpdate::Transcript(data));
                self.is_processing = false;

                // The socket handler does not persist transcripts
                if let Err(e) = self.api.update_transcript(&self.session_id, &self.current_transcript).await {
                    self.fail("update_transcript", e);
                }
            }
            ServerMessage::SoapGenerated { data } => {
                if let Some(failure) = data.failure() {
                    redacted_warn!(self.redactor, "SOAP generation degraded for {}: {}", self.session_id, failure);
                } else {
                    info!(session_id = %self.session_id, "SOAP note received");
                }
                self.detail.apply(SessionUpdate::SoapNote(data));
                self.is_processing = false;
            }
            ServerMessage::SummaryGenerated { data } => {
                info!(
                    session_id = %self.session_id,
                    summary = %self.redactor.describe_text(&data),
                    "Patient summary received"
                );
                self.detail.apply(SessionUpdate::PatientSummary(data));
                self.is_generating_summary = false;
            }
            ServerMessage::ComplianceReport { data } => {
                info!(session_id = %self.session_id, score = data.compliance_score, "Compliance report received");
                self.detail.apply(SessionUpdate::ComplianceReport(data));
            }
            ServerMessage::Error { message } => {
                redacted_warn!(self.redactor, "Backend error for session {}: {}", self.session_id, message);
                self.is_processing = false;
                self.is_generating_summary = false;
                self.last_error = Some(message);
            }
            ServerMessage::Unknown => {
                debug!(session_id = %self.session_id, "Ignoring message with unknown type");
            }
        }
    }

    /// Receive and apply the next pushed message; `None` without a live socket
    pub async fn next_message(&mut self) -> Option<ServerMessage> {
        let message = self.recv().await?;
        self.handle_message(message.clone()).await;
        Some(message)
    }

    async fn recv(&mut self) -> Option<ServerMessage> {
        self.transport.as_mut()?.recv().await
    }

    /// Apply pushed messages until `done` accepts one. A backend `error`
    /// message, a closed socket or the timeout end the wait with an error.
    /// The deadline bounds only the wait for the next message; one that has
    /// arrived is always applied in full, including transcript persistence.
    pub async fn wait_for<F>(&mut self, timeout: Duration, mut done: F) -> Result<ServerMessage>
    where
        F: FnMut(&ServerMessage) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let message = match tokio::time::timeout_at(deadline, self.recv()).await {
                Err(_) => {
                    return Err(SkribeError::WebSocketError(format!(
                        "no response within {}s",
                        timeout.as_secs()
                    )))
                }
                Ok(None) => {
                    return Err(SkribeError::WebSocketError(
                        "connection closed before a response arrived".to_string(),
                    ))
                }
                Ok(Some(message)) => message,
            };
            self.handle_message(message.clone()).await;
            match message {
                ServerMessage::Error { message } => {
                    return Err(SkribeError::WebSocketError(format!("backend error: {}", message)))
                }
                message if done(&message) => return Ok(message),
                _ => {}
            }
        }
    }

    /// Unmount: close the socket and release the capture device if it is
    /// still recording. Audio captured so far is discarded.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                report_error(&self.context("close_websocket"), &e);
            }
        }
        if self.recorder.is_recording() {
            if let Err(e) = self.recorder.stop() {
                report_error(&self.context("stop_recording"), &e);
            }
        }
        info!(session_id = %self.session_id, "Live session closed");
    }
}
