use chrono::{Local, NaiveDate, TimeZone};
use error_common::{report_error, ErrorContext};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::api::{ListQuery, SessionApi};
use crate::models::SessionSummary;

/// Counters shown above the session list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_sessions: usize,
    /// Sessions with a SOAP note
    pub completed_notes: usize,
    /// Transcribed but no SOAP note yet
    pub pending_reviews: usize,
    /// Created on the current local day
    pub active_today: usize,
}

impl DashboardStats {
    pub fn compute(sessions: &[SessionSummary]) -> Self {
        Self::compute_on(sessions, Local::now().date_naive(), &Local)
    }

    /// Counters with "today" being `today` in `zone`
    pub fn compute_on<Tz: TimeZone>(sessions: &[SessionSummary], today: NaiveDate, zone: &Tz) -> Self {
        Self {
            total_sessions: sessions.len(),
            completed_notes: sessions.iter().filter(|s| s.has_soap_note).count(),
            pending_reviews: sessions.iter().filter(|s| s.has_transcript && !s.has_soap_note).count(),
            active_today: sessions
                .iter()
                .filter(|s| s.created_at.with_timezone(zone).date_naive() == today)
                .count(),
        }
    }
}

/// Sessions whose patient or doctor name contains `term`, ignoring case.
/// A blank term keeps everything.
pub fn filter_sessions<'a>(sessions: &'a [SessionSummary], term: &str) -> Vec<&'a SessionSummary> {
    let needle = term.to_lowercase();
    sessions
        .iter()
        .filter(|s| s.patient_name.to_lowercase().contains(&needle) || s.doctor_name.to_lowercase().contains(&needle))
        .collect()
}

/// Session list view state
pub struct Dashboard {
    api: Arc<dyn SessionApi>,
    sessions: Vec<SessionSummary>,
    search_term: String,
    loading: bool,
}

impl Dashboard {
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        Self {
            api,
            sessions: Vec::new(),
            search_term: String::new(),
            loading: true,
        }
    }

    /// Fetch the list. Failures are logged and leave the list as it was.
    pub async fn load(&mut self, query: ListQuery) {
        match self.api.list_sessions(query).await {
            Ok(sessions) => {
                info!(count = sessions.len(), "Sessions loaded");
                self.sessions = sessions;
            }
            Err(e) => report_error(&ErrorContext::new("list_sessions"), &e),
        }
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    /// Counters always cover the full list, not the filtered one
    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.sessions)
    }

    pub fn visible_sessions(&self) -> Vec<&SessionSummary> {
        filter_sessions(&self.sessions, &self.search_term)
    }
}
