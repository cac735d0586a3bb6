use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::compliance::ComplianceReport;
use super::soap::SoapNote;
use super::timestamp;

/// Row of the session list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub doctor_name: String,
    pub patient_name: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub has_transcript: bool,
    #[serde(default)]
    pub has_soap_note: bool,
    #[serde(default)]
    pub has_summary: bool,
}

/// Full session record; everything past the names is filled in as the
/// session progresses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session_id: String,
    pub doctor_name: String,
    pub patient_name: String,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub soap_note: Option<SoapNote>,
    #[serde(default)]
    pub patient_summary: Option<String>,
    #[serde(default)]
    pub compliance_report: Option<ComplianceReport>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A single-field change pushed by the backend or returned by a REST call
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Transcript(String),
    SoapNote(SoapNote),
    PatientSummary(String),
    ComplianceReport(ComplianceReport),
    QrCodeUrl(String),
}

impl SessionUpdate {
    pub fn field(&self) -> &'static str {
        match self {
            SessionUpdate::Transcript(_) => "transcript",
            SessionUpdate::SoapNote(_) => "soap_note",
            SessionUpdate::PatientSummary(_) => "patient_summary",
            SessionUpdate::ComplianceReport(_) => "compliance_report",
            SessionUpdate::QrCodeUrl(_) => "qr_code_url",
        }
    }
}

impl SessionDetail {
    /// Shallow merge: only the named field changes
    pub fn apply(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::Transcript(text) => self.transcript = Some(text),
            SessionUpdate::SoapNote(note) => self.soap_note = Some(note),
            SessionUpdate::PatientSummary(summary) => self.patient_summary = Some(summary),
            SessionUpdate::ComplianceReport(report) => self.compliance_report = Some(report),
            SessionUpdate::QrCodeUrl(url) => self.qr_code_url = Some(url),
        }
    }

    pub fn has_transcript(&self) -> bool {
        self.transcript.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Response of `POST /api/v1/sessions/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: String,
    pub doctor_name: String,
    pub patient_name: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditSummaryResponse {
    #[serde(default)]
    pub message: String,
    pub updated_summary: String,
}

/// Public projection served behind the QR code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummaryView {
    pub session_id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub summary: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `{"message": ...}` acknowledgement returned by mutating endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::soap::{Plan, Subjective};
    use serde_json::json;

    fn detail() -> SessionDetail {
        serde_json::from_value(json!({
            "session_id": "s-1",
            "doctor_name": "Dr. Lee",
            "patient_name": "Ana Ruiz",
            "transcript": "Patient reports cough for three days.",
            "soap_note": null,
            "patient_summary": "You have a mild cough.",
            "compliance_report": null,
            "qr_code_url": null,
            "created_at": "2025-01-05T10:30:00.123456",
            "updated_at": null
        }))
        .unwrap()
    }

    #[test]
    fn test_detail_tolerates_nulls() {
        let detail = detail();
        assert!(detail.soap_note.is_none());
        assert!(detail.updated_at.is_none());
        assert!(detail.created_at.is_some());
        assert!(detail.has_transcript());
    }

    #[test]
    fn test_soap_update_leaves_other_fields_alone() {
        let mut detail = detail();
        let before = detail.clone();
        let note = SoapNote {
            subjective: Some(Subjective { chief_complaint: Some("Cough".into()), ..Default::default() }),
            plan: Some(Plan { follow_up: Some("1 week".into()), ..Default::default() }),
            ..Default::default()
        };

        detail.apply(SessionUpdate::SoapNote(note.clone()));

        assert_eq!(detail.soap_note, Some(note));
        assert_eq!(detail.transcript, before.transcript);
        assert_eq!(detail.patient_summary, before.patient_summary);
        assert_eq!(detail.compliance_report, before.compliance_report);
    }

    #[test]
    fn test_detail_with_list_shaped_plan_field_decodes() {
        let detail: SessionDetail = serde_json::from_value(json!({
            "session_id": "s-1",
            "doctor_name": "Dr. Lee",
            "patient_name": "Ana Ruiz",
            "transcript": "Cough.",
            "soap_note": { "plan": { "additional_testing": ["CXR"] } },
            "created_at": "2025-01-05T10:30:00"
        }))
        .unwrap();

        let plan = detail.soap_note.and_then(|note| note.plan).unwrap();
        assert_eq!(plan.additional_testing.unwrap().joined(), "CXR");
        assert_eq!(detail.transcript.as_deref(), Some("Cough."));
    }

    #[test]
    fn test_summary_row_flags_default_to_false() {
        let row: SessionSummary = serde_json::from_value(json!({
            "session_id": "s-2",
            "doctor_name": "Dr. Lee",
            "patient_name": "Bo Chen",
            "created_at": "2025-01-05T09:00:00"
        }))
        .unwrap();
        assert!(!row.has_transcript && !row.has_soap_note && !row.has_summary);
    }
}
