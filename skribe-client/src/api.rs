//! REST client for the Skribe backend
//!
//! Every call is a single request. GETs may be retried on transient failures
//! when `get_retries` is configured; mutating calls never are.

use async_trait::async_trait;
use error_common::{Result, SkribeError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::models::{
    CreatedSession, EditSummaryResponse, HealthStatus, MessageResponse, PatientSummaryView, QrCode, SessionDetail,
    SessionSummary, SoapNote,
};

/// Paging for the session list; unset values use the backend defaults
/// (50 / 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

/// Operations the dashboard, creation form and live session depend on
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn create_session(&self, doctor_name: &str, patient_name: &str) -> Result<CreatedSession>;

    async fn get_session(&self, session_id: &str) -> Result<SessionDetail>;

    async fn list_sessions(&self, query: ListQuery) -> Result<Vec<SessionSummary>>;

    /// Persist a transcript; the response body is ignored
    async fn update_transcript(&self, session_id: &str, transcript: &str) -> Result<()>;

    async fn edit_summary(&self, session_id: &str, edit_prompt: &str) -> Result<EditSummaryResponse>;

    async fn generate_qr_code(&self, session_id: &str) -> Result<QrCode>;
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// HTTP implementation of [`SessionApi`] plus the maintenance endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    get_retries: u32,
    retry_backoff: Duration,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SkribeError::NetworkError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            get_retries: config.get_retries,
            retry_backoff: config.retry_backoff(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| SkribeError::NetworkError(e.to_string()))?;
        check_status(response, resource).await
    }

    /// GET with the configured retry policy
    async fn get(&self, path: &str, query: &[(&str, String)], resource: &str) -> Result<Response> {
        let url = self.url(path);
        let mut attempt = 0u32;
        loop {
            debug!(method = "GET", path, attempt, "Backend request");
            let request = self.client.get(&url).query(query);
            match self.send(request, resource).await {
                Err(err) if err.is_transient() && attempt < self.get_retries => {
                    let delay = self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt));
                    warn!(path, attempt, error = %err, delay_ms = delay.as_millis() as u64, "Retrying GET");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)], resource: &str) -> Result<T> {
        let response = self.get(path, query, resource).await?;
        decode(response).await
    }

    /// `DELETE /api/v1/sessions/{id}`
    pub async fn delete_session(&self, session_id: &str) -> Result<MessageResponse> {
        let path = format!("/api/v1/sessions/{}", session_id);
        debug!(method = "DELETE", path = %path, "Backend request");
        let response = self.send(self.client.delete(self.url(&path)), "Session").await?;
        decode(response).await
    }

    /// `PUT /api/v1/sessions/{id}/soap` with the note as JSON
    pub async fn update_soap_note(&self, session_id: &str, soap_note: &SoapNote) -> Result<MessageResponse> {
        let path = format!("/api/v1/sessions/{}/soap", session_id);
        debug!(method = "PUT", path = %path, "Backend request");
        let response = self.send(self.client.put(self.url(&path)).json(soap_note), "Session").await?;
        decode(response).await
    }

    /// `PUT /api/v1/sessions/{id}/summary?summary=...`
    pub async fn update_summary(&self, session_id: &str, summary: &str) -> Result<MessageResponse> {
        let path = format!("/api/v1/sessions/{}/summary", session_id);
        debug!(method = "PUT", path = %path, "Backend request");
        let request = self.client.put(self.url(&path)).query(&[("summary", summary)]);
        let response = self.send(request, "Session").await?;
        decode(response).await
    }

    /// PNG of a previously generated QR code
    pub async fn qr_code_image(&self, session_id: &str) -> Result<Vec<u8>> {
        let response = self.get(&format!("/api/v1/qr/image/{}", session_id), &[], "QR code").await?;
        let bytes = response.bytes().await.map_err(|e| SkribeError::NetworkError(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Public patient view behind the QR code
    pub async fn patient_summary(&self, session_id: &str) -> Result<PatientSummaryView> {
        self.get_json(&format!("/api/v1/qr/summary/{}", session_id), &[], "Patient summary").await
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/health", &[], "Health endpoint").await
    }
}

#[async_trait]
impl SessionApi for ApiClient {
    async fn create_session(&self, doctor_name: &str, patient_name: &str) -> Result<CreatedSession> {
        debug!(method = "POST", path = "/api/v1/sessions/", "Backend request");
        let request = self
            .client
            .post(self.url("/api/v1/sessions/"))
            .form(&[("doctor_name", doctor_name), ("patient_name", patient_name)]);
        let response = self.send(request, "Session").await?;
        decode(response).await
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionDetail> {
        self.get_json(&format!("/api/v1/sessions/{}", session_id), &[], "Session").await
    }

    async fn list_sessions(&self, query: ListQuery) -> Result<Vec<SessionSummary>> {
        self.get_json("/api/v1/sessions/", &query.pairs(), "Session list").await
    }

    async fn update_transcript(&self, session_id: &str, transcript: &str) -> Result<()> {
        let path = format!("/api/v1/sessions/{}/transcript", session_id);
        debug!(method = "PUT", path = %path, chars = transcript.chars().count(), "Backend request");
        let request = self.client.put(self.url(&path)).form(&[("transcript", transcript)]);
        self.send(request, "Session").await?;
        Ok(())
    }

    async fn edit_summary(&self, session_id: &str, edit_prompt: &str) -> Result<EditSummaryResponse> {
        let path = format!("/api/v1/sessions/{}/edit-summary", session_id);
        debug!(method = "POST", path = %path, "Backend request");
        let request = self.client.post(self.url(&path)).form(&[("edit_prompt", edit_prompt)]);
        let response = self.send(request, "Session").await?;
        decode(response).await
    }

    async fn generate_qr_code(&self, session_id: &str) -> Result<QrCode> {
        let path = format!("/api/v1/qr/generate/{}", session_id);
        debug!(method = "POST", path = %path, "Backend request");
        let response = self.send(self.client.post(self.url(&path)), "Session").await?;
        decode(response).await
    }
}

async fn check_status(response: Response, resource: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body).unwrap_or_else(|| {
        status.canonical_reason().unwrap_or("request failed").to_string()
    });

    if status == StatusCode::NOT_FOUND {
        return Err(SkribeError::NotFound(format!("{}: {}", resource, detail)));
    }
    Err(SkribeError::HttpError { status: status.as_u16(), detail })
}

/// FastAPI reports failures as `{"detail": "..."}`; validation failures carry
/// a list instead of a string.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(detail) => Some(detail),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| SkribeError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_only_sends_set_values() {
        assert!(ListQuery::default().pairs().is_empty());
        let query = ListQuery { limit: Some(10), offset: None };
        assert_eq!(query.pairs(), vec![("limit", "10".to_string())]);
    }

    #[test]
    fn test_fastapi_detail_extraction() {
        assert_eq!(error_detail(r#"{"detail":"Session not found"}"#).as_deref(), Some("Session not found"));
        assert!(error_detail(r#"{"detail":[{"loc":["body","edit_prompt"]}]}"#).unwrap().contains("edit_prompt"));
        assert_eq!(error_detail("Internal Server Error"), None);
    }
}
