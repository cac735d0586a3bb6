use error_common::{report_error, ErrorContext};
use std::sync::Arc;
use tracing::info;

use crate::api::SessionApi;
use crate::routes::Route;

/// Session creation form
#[derive(Debug, Clone, Default)]
pub struct NewSessionForm {
    pub doctor_name: String,
    pub patient_name: String,
}

impl NewSessionForm {
    pub fn new(doctor_name: impl Into<String>, patient_name: impl Into<String>) -> Self {
        Self {
            doctor_name: doctor_name.into(),
            patient_name: patient_name.into(),
        }
    }

    /// Both names are present after trimming
    pub fn is_complete(&self) -> bool {
        !self.doctor_name.trim().is_empty() && !self.patient_name.trim().is_empty()
    }

    /// Create the session and return where to go next. An incomplete form
    /// makes no request; a failed request is logged. Both yield `None`.
    pub async fn submit(&self, api: &Arc<dyn SessionApi>) -> Option<Route> {
        if !self.is_complete() {
            return None;
        }

        match api.create_session(self.doctor_name.trim(), self.patient_name.trim()).await {
            Ok(created) => {
                info!(session_id = %created.session_id, "Session created");
                Some(Route::Session(created.session_id))
            }
            Err(e) => {
                report_error(&ErrorContext::new("create_session"), &e);
                None
            }
        }
    }
}
