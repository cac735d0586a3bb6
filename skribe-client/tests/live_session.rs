//! Live session behaviour against in-memory fakes
//!
//! Covers the recording flow, WebSocket dispatch, generation guards, summary
//! editing, QR issuance and unmounting.

mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::*;
use skribe_client::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

async fn open_with(
    api: Arc<FakeApi>,
    chunks: Vec<Vec<u8>>,
) -> (LiveSession, TransportProbe, Arc<std::sync::atomic::AtomicBool>) {
    let (transport, probe) = FakeTransport::new();
    let (capture, active) = FakeCapture::new(chunks);
    let session = LiveSession::open("s-1", api, Some(transport), capture, true).await.unwrap();
    (session, probe, active)
}

fn soap_note() -> SoapNote {
    serde_json::from_value(serde_json::json!({
        "subjective": { "chief_complaint": "Cough for three days" },
        "assessment": { "primary_diagnosis": "Viral URI" },
        "plan": { "follow_up": "Return in one week" }
    }))
    .unwrap()
}

// ============================================================================
// Mounting
// ============================================================================

#[tokio::test]
async fn test_open_fetches_session_and_starts_on_transcript_tab() {
    let api = FakeApi::with_detail(session_detail());
    let (session, _probe, _active) = open_with(api.clone(), Vec::new()).await;

    assert_eq!(api.calls(), vec![ApiCall::Get("s-1".into())]);
    assert_eq!(session.active_tab(), Tab::Transcript);
    assert_eq!(session.current_transcript(), "");
    assert!(session.is_connected());
    assert!(!session.is_recording());
}

#[tokio::test]
async fn test_open_fails_when_session_is_missing() {
    let api = Arc::new(FakeApi::default());
    let (transport, _probe) = FakeTransport::new();
    let result = LiveSession::open("missing", api, Some(transport), FakeCapture::silent(), true).await;
    assert!(matches!(result, Err(error_common::SkribeError::NotFound(_))));
}

// ============================================================================
// Recording
// ============================================================================

#[tokio::test]
async fn test_stop_sends_one_message_with_concatenated_audio() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, _active) = open_with(api, vec![b"RIFF".to_vec(), b"data".to_vec()]).await;

    assert!(session.start_recording());
    assert!(session.is_recording());
    assert!(probe.sent().is_empty(), "nothing is streamed while recording");

    assert!(session.stop_recording().await);
    assert!(!session.is_recording());
    assert!(session.is_processing());
    assert_eq!(
        probe.sent(),
        vec![ClientMessage::TranscribeCompleteAudio {
            data: STANDARD.encode(b"RIFFdata"),
            session_id: "s-1".into(),
        }]
    );
}

#[tokio::test]
async fn test_stop_with_zero_chunks_sends_exactly_one_empty_payload() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, _active) = open_with(api, Vec::new()).await;

    session.start_recording();
    session.stop_recording().await;

    assert_eq!(
        probe.sent(),
        vec![ClientMessage::TranscribeCompleteAudio { data: String::new(), session_id: "s-1".into() }]
    );
}

#[tokio::test]
async fn test_device_error_on_stop_still_sends_the_take() {
    let api = FakeApi::with_detail(session_detail());
    let (transport, probe) = FakeTransport::new();
    let capture = FakeCapture::failing_on_stop(vec![b"abc".to_vec()]);
    let mut session = LiveSession::open("s-1", api, Some(transport), capture, true).await.unwrap();

    session.start_recording();
    assert!(session.stop_recording().await);

    assert!(!session.is_recording());
    assert!(session.is_processing());
    assert_eq!(
        probe.sent(),
        vec![ClientMessage::TranscribeCompleteAudio { data: STANDARD.encode(b"abc"), session_id: "s-1".into() }]
    );
}

#[tokio::test]
async fn test_redundant_start_and_stop_do_nothing() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, _active) = open_with(api, vec![b"x".to_vec()]).await;

    assert!(!session.stop_recording().await);
    assert!(session.start_recording());
    assert!(!session.start_recording());
    session.stop_recording().await;
    assert!(!session.stop_recording().await);

    assert_eq!(probe.sent().len(), 1);
}

#[tokio::test]
async fn test_closed_socket_drops_send_but_keeps_flag() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, _active) = open_with(api, Vec::new()).await;
    probe.open.store(false, Ordering::SeqCst);

    session.start_recording();
    assert!(!session.stop_recording().await);

    assert!(probe.sent().is_empty());
    assert!(session.is_processing());
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_transcript_replaces_text_and_is_persisted() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, _active) = open_with(api.clone(), Vec::new()).await;
    session.start_recording();
    session.stop_recording().await;

    probe.push(ServerMessage::TranscriptComplete { data: "Patient reports a dry cough.".into() });
    let message = session.next_message().await.unwrap();

    assert_eq!(message.kind(), "transcript_complete");
    assert_eq!(session.current_transcript(), "Patient reports a dry cough.");
    assert_eq!(session.detail().transcript.as_deref(), Some("Patient reports a dry cough."));
    assert!(!session.is_processing());
    assert_eq!(
        api.calls().last(),
        Some(&ApiCall::UpdateTranscript {
            session_id: "s-1".into(),
            transcript: "Patient reports a dry cough.".into(),
        })
    );
}

#[tokio::test]
async fn test_failed_transcript_persistence_is_logged_and_kept_locally() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api.clone(), Vec::new()).await;
    api.set_failing(true);

    session
        .handle_message(ServerMessage::TranscriptComplete { data: "Dry cough.".into() })
        .await;

    assert_eq!(session.current_transcript(), "Dry cough.");
    assert!(session.last_error().unwrap().contains("500"));
}

#[tokio::test]
async fn test_soap_result_leaves_transcript_and_summary_untouched() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api, Vec::new()).await;
    session
        .handle_message(ServerMessage::TranscriptComplete { data: "Dry cough.".into() })
        .await;
    let before = session.detail().clone();

    session.handle_message(ServerMessage::SoapGenerated { data: soap_note() }).await;

    let after = session.detail();
    assert_eq!(after.soap_note, Some(soap_note()));
    assert_eq!(after.transcript, before.transcript);
    assert_eq!(after.patient_summary, before.patient_summary);
    assert_eq!(after.compliance_report, before.compliance_report);
    assert_eq!(session.current_transcript(), "Dry cough.");
}

#[tokio::test]
async fn test_summary_and_compliance_results_merge() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api, Vec::new()).await;
    session.handle_message(ServerMessage::SoapGenerated { data: soap_note() }).await;

    assert!(session.generate_summary().await);
    assert!(session.is_generating_summary());
    session
        .handle_message(ServerMessage::SummaryGenerated { data: "Rest and drink fluids.".into() })
        .await;
    assert!(!session.is_generating_summary());
    assert_eq!(session.detail().patient_summary.as_deref(), Some("Rest and drink fluids."));

    let report: ComplianceReport = serde_json::from_value(serde_json::json!({
        "compliance_score": 82,
        "overall_assessment": "Good documentation",
        "missing_items": [],
        "recommendations": []
    }))
    .unwrap();
    session.handle_message(ServerMessage::ComplianceReport { data: report.clone() }).await;
    assert_eq!(session.detail().compliance_report, Some(report));
    assert_eq!(session.detail().soap_note, Some(soap_note()));
}

#[tokio::test]
async fn test_backend_error_clears_flags_and_is_remembered() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api, Vec::new()).await;
    session.start_recording();
    session.stop_recording().await;
    assert!(session.is_processing());

    session.handle_message(ServerMessage::Error { message: "Whisper failed".into() }).await;

    assert!(!session.is_processing());
    assert_eq!(session.last_error(), Some("Whisper failed"));
}

#[tokio::test]
async fn test_unknown_messages_change_nothing() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api, Vec::new()).await;
    let before = session.detail().clone();

    session.handle_message(ServerMessage::Unknown).await;

    assert_eq!(session.detail(), &before);
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn test_wait_for_skips_other_messages() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, _active) = open_with(api, Vec::new()).await;

    probe.push(ServerMessage::Unknown);
    probe.push(ServerMessage::SoapGenerated { data: soap_note() });

    let message = session
        .wait_for(Duration::from_secs(5), |m| matches!(m, ServerMessage::SoapGenerated { .. }))
        .await
        .unwrap();
    assert_eq!(message.kind(), "soap_generated");
    assert!(session.detail().soap_note.is_some());
}

#[tokio::test]
async fn test_wait_for_surfaces_backend_errors_and_timeouts() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, _active) = open_with(api, Vec::new()).await;

    probe.push(ServerMessage::Error { message: "boom".into() });
    let err = session.wait_for(Duration::from_secs(5), |_| true).await.unwrap_err();
    assert!(err.to_string().contains("boom"));

    let err = session.wait_for(Duration::from_millis(20), |_| true).await.unwrap_err();
    assert!(err.to_string().contains("no response"));
}

#[tokio::test]
async fn test_wait_for_deadline_does_not_cancel_transcript_persistence() {
    let api = FakeApi::with_detail(session_detail());
    api.transcript_delay_ms.store(200, Ordering::SeqCst);
    let (mut session, probe, _active) = open_with(api.clone(), Vec::new()).await;

    probe.push(ServerMessage::TranscriptComplete { data: "cough".into() });
    let message = session
        .wait_for(Duration::from_millis(50), |m| matches!(m, ServerMessage::TranscriptComplete { .. }))
        .await
        .unwrap();

    assert_eq!(message.kind(), "transcript_complete");
    assert_eq!(session.current_transcript(), "cough");
    assert!(api
        .calls()
        .contains(&ApiCall::UpdateTranscript { session_id: "s-1".into(), transcript: "cough".into() }));
}

// ============================================================================
// Generation guards
// ============================================================================

#[tokio::test]
async fn test_soap_needs_a_transcript_and_no_request_in_flight() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, _active) = open_with(api, Vec::new()).await;

    assert!(!session.generate_soap().await, "blank transcript");
    session
        .handle_message(ServerMessage::TranscriptComplete { data: "Dry cough.".into() })
        .await;

    assert!(session.generate_soap().await);
    assert!(!session.generate_soap().await, "already processing");
    assert_eq!(
        probe.sent(),
        vec![ClientMessage::GenerateSoap { transcript: "Dry cough.".into(), session_id: "s-1".into() }]
    );
}

#[tokio::test]
async fn test_summary_and_compliance_need_a_soap_note() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, _active) = open_with(api, Vec::new()).await;

    assert!(!session.generate_summary().await);
    assert!(!session.run_compliance_check().await);
    assert!(probe.sent().is_empty());

    session.handle_message(ServerMessage::SoapGenerated { data: soap_note() }).await;
    assert!(session.run_compliance_check().await);
    assert_eq!(probe.sent(), vec![ClientMessage::ComplianceCheck { soap_note: soap_note() }]);
}

// ============================================================================
// Summary editing and QR codes
// ============================================================================

#[tokio::test]
async fn test_blank_edit_prompt_makes_no_request() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api.clone(), Vec::new()).await;

    session.set_summary_edit_prompt("   ");
    assert!(!session.edit_summary().await);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn test_edit_replaces_summary_and_resets_editor() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api.clone(), Vec::new()).await;

    session.toggle_summary_editor();
    session.set_summary_edit_prompt("Use simpler words");
    assert!(session.edit_summary().await);

    assert_eq!(session.detail().patient_summary.as_deref(), Some("Edited: Use simpler words"));
    assert!(!session.editing_summary());
    assert_eq!(session.summary_edit_prompt(), "");
    assert_eq!(
        api.calls().last(),
        Some(&ApiCall::EditSummary { session_id: "s-1".into(), prompt: "Use simpler words".into() })
    );
}

#[tokio::test]
async fn test_failed_edit_keeps_summary_and_prompt() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api.clone(), Vec::new()).await;
    api.set_failing(true);

    session.toggle_summary_editor();
    session.set_summary_edit_prompt("Shorter");
    assert!(!session.edit_summary().await);

    assert_eq!(session.detail().patient_summary.as_deref(), Some("Take fluids and rest."));
    assert!(session.editing_summary());
    assert_eq!(session.summary_edit_prompt(), "Shorter");
}

#[tokio::test]
async fn test_qr_code_failure_keeps_previous_code() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api.clone(), Vec::new()).await;

    assert!(session.generate_qr_code().await);
    let issued = session.qr_code().cloned().unwrap();
    assert_eq!(issued.qr_code_url, "http://localhost:3000/patient/s-1");
    assert_eq!(session.detail().qr_code_url.as_deref(), Some("http://localhost:3000/patient/s-1"));

    api.set_failing(true);
    assert!(!session.generate_qr_code().await);
    assert_eq!(session.qr_code(), Some(&issued));
    assert!(!session.is_generating_qr());
}

// ============================================================================
// Tabs and unmounting
// ============================================================================

#[tokio::test]
async fn test_exactly_one_tab_is_active() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, _probe, _active) = open_with(api, Vec::new()).await;

    session.select_tab(Tab::Compliance);
    assert_eq!(session.active_tab(), Tab::Compliance);
    session.select_tab(Tab::Soap);
    assert_eq!(session.active_tab(), Tab::Soap);
}

#[tokio::test]
async fn test_close_releases_socket_and_capture_device() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, active) = open_with(api, vec![b"audio".to_vec()]).await;

    session.start_recording();
    assert!(active.load(Ordering::SeqCst));

    session.close().await;

    assert!(!probe.is_open());
    assert!(!active.load(Ordering::SeqCst));
    assert!(!session.is_recording());
    assert!(!session.is_connected());
    assert!(session.is_closed());
    assert!(probe.sent().is_empty(), "audio captured before unmount is discarded");
}

#[tokio::test]
async fn test_close_while_idle_only_closes_socket() {
    let api = FakeApi::with_detail(session_detail());
    let (mut session, probe, active) = open_with(api, Vec::new()).await;

    session.close().await;
    session.close().await;

    assert!(!probe.is_open());
    assert!(!active.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_session_without_socket_still_works_over_rest() {
    let api = FakeApi::with_detail(session_detail());
    let mut session = LiveSession::open("s-1", api.clone(), None, FakeCapture::silent(), false).await.unwrap();

    assert!(!session.is_connected());
    session.start_recording();
    assert!(!session.stop_recording().await);
    assert!(session.next_message().await.is_none());
    assert!(session.generate_qr_code().await);
}
