//! Records exchanged with the Skribe backend

pub mod compliance;
pub mod qr;
pub mod session;
pub mod soap;
pub mod timestamp;

pub use compliance::{ComplianceReport, MissingItem, ScoreBand, Severity};
pub use qr::QrCode;
pub use session::{
    CreatedSession, EditSummaryResponse, HealthStatus, MessageResponse, PatientSummaryView, SessionDetail,
    SessionSummary, SessionUpdate,
};
pub use soap::{Assessment, Objective, Plan, SoapNote, Subjective, TextOrList, VitalSigns};
