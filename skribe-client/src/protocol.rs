//! JSON frames exchanged over `/ws/transcription`, tagged by `type`

use error_common::Result;
use serde::{Deserialize, Serialize};

use crate::models::{ComplianceReport, SessionUpdate, SoapNote};

/// Requests sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Whole recording, base64 encoded
    TranscribeCompleteAudio { data: String, session_id: String },
    GenerateSoap { transcript: String, session_id: String },
    GenerateSummary { transcript: String, session_id: String },
    ComplianceCheck { soap_note: SoapNote },
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::TranscribeCompleteAudio { .. } => "transcribe_complete_audio",
            ClientMessage::GenerateSoap { .. } => "generate_soap",
            ClientMessage::GenerateSummary { .. } => "generate_summary",
            ClientMessage::ComplianceCheck { .. } => "compliance_check",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Results pushed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    TranscriptComplete { data: String },
    SoapGenerated { data: SoapNote },
    SummaryGenerated { data: String },
    ComplianceReport { data: ComplianceReport },
    /// The backend's handler failed; the socket is usually unusable afterwards
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::TranscriptComplete { .. } => "transcript_complete",
            ServerMessage::SoapGenerated { .. } => "soap_generated",
            ServerMessage::SummaryGenerated { .. } => "summary_generated",
            ServerMessage::ComplianceReport { .. } => "compliance_report",
            ServerMessage::Error { .. } => "error",
            ServerMessage::Unknown => "unknown",
        }
    }

    /// The session field this message updates, if any
    pub fn session_update(&self) -> Option<SessionUpdate> {
        match self {
            ServerMessage::TranscriptComplete { data } => Some(SessionUpdate::Transcript(data.clone())),
            ServerMessage::SoapGenerated { data } => Some(SessionUpdate::SoapNote(data.clone())),
            ServerMessage::SummaryGenerated { data } => Some(SessionUpdate::PatientSummary(data.clone())),
            ServerMessage::ComplianceReport { data } => Some(SessionUpdate::ComplianceReport(data.clone())),
            ServerMessage::Error { .. } | ServerMessage::Unknown => None,
        }
    }
}
