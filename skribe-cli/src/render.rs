//! Terminal rendering of sessions, dashboards and QR codes
//!
//! Every function returns a `String` so commands decide where it goes.
//! Fields the backend left out are hidden rather than printed empty.

use chrono::Local;
use colored::*;
use qrcode::render::unicode::Dense1x2;
use skribe_client::{
    format_date, format_timestamp, ComplianceReport, DashboardStats, PatientSummaryView, ScoreBand, SessionDetail,
    SessionSummary, Severity, SoapNote, Tab, TextOrList,
};

fn heading(title: &str) -> String {
    format!("── {} ──", title).bold().to_string()
}

fn placeholder(text: &str) -> String {
    text.dimmed().italic().to_string()
}

/// Push `label: value` unless the value is missing or blank
fn field(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        lines.push(format!("  {} {}", format!("{}:", label).cyan(), value));
    }
}

fn list_field(lines: &mut Vec<String>, label: &str, value: Option<&TextOrList>) {
    if let Some(value) = value.filter(|v| !v.is_blank()) {
        field(lines, label, Some(&value.joined()));
    }
}

/// Header plus either one tab or all four
pub fn session(detail: &SessionDetail, only: Option<Tab>) -> String {
    let mut out = vec![format!(
        "{} {} {}",
        detail.patient_name.bold(),
        "with".dimmed(),
        detail.doctor_name
    )];
    let mut meta = vec![format!("session {}", detail.session_id)];
    if let Some(created) = detail.created_at {
        let local = created.with_timezone(&Local);
        meta.push(format!("created {} {}", format_date(&local), format_timestamp(&local)));
    }
    if let Some(url) = &detail.qr_code_url {
        meta.push(format!("patient link {}", url));
    }
    out.push(meta.join(" · ").dimmed().to_string());

    let tabs: Vec<Tab> = match only {
        Some(tab) => vec![tab],
        None => Tab::ALL.to_vec(),
    };
    for tab in tabs {
        out.push(String::new());
        out.push(tab_view(detail, tab));
    }
    out.join("\n")
}

pub fn tab_view(detail: &SessionDetail, tab: Tab) -> String {
    let body = match tab {
        Tab::Transcript => transcript(detail.transcript.as_deref()),
        Tab::Soap => match &detail.soap_note {
            Some(note) => soap_note(note),
            None => placeholder("No SOAP note yet. Generate one from the transcript."),
        },
        Tab::Summary => summary(detail.patient_summary.as_deref()),
        Tab::Compliance => match &detail.compliance_report {
            Some(report) => compliance_report(report),
            None => placeholder("No compliance check yet."),
        },
    };
    format!("{}\n{}", heading(tab.label()), body)
}

pub fn transcript(text: Option<&str>) -> String {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => text.to_string(),
        None => placeholder("No transcript yet. Record the consultation to create one."),
    }
}

pub fn summary(text: Option<&str>) -> String {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => text.to_string(),
        None => placeholder("No patient summary yet."),
    }
}

pub fn soap_note(note: &SoapNote) -> String {
    let mut lines = Vec::new();

    if let Some(failure) = note.failure() {
        lines.push(format!("{} {}", "SOAP note could not be structured:".yellow(), failure));
    }

    if let Some(s) = &note.subjective {
        lines.push("Subjective".bold().to_string());
        list_field(&mut lines, "Chief complaint", s.chief_complaint.as_ref());
        list_field(&mut lines, "History of present illness", s.history_present_illness.as_ref());
        list_field(&mut lines, "Review of systems", s.review_of_systems.as_ref());
        list_field(&mut lines, "Past medical history", s.past_medical_history.as_ref());
        list_field(&mut lines, "Medications", s.medications.as_ref());
        list_field(&mut lines, "Allergies", s.allergies.as_ref());
        list_field(&mut lines, "Social history", s.social_history.as_ref());
    }

    if let Some(o) = &note.objective {
        lines.push("Objective".bold().to_string());
        if let Some(vitals) = &o.vital_signs {
            let recorded = vitals.recorded();
            if !recorded.is_empty() {
                lines.push(format!("  {}", "Vital signs:".cyan()));
                for (label, value) in recorded {
                    lines.push(format!("    {}: {}", label, value));
                }
            }
        }
        list_field(&mut lines, "Physical exam", o.physical_exam.as_ref());
        list_field(&mut lines, "Diagnostic tests", o.diagnostic_tests.as_ref());
    }

    if let Some(a) = &note.assessment {
        lines.push("Assessment".bold().to_string());
        list_field(&mut lines, "Primary diagnosis", a.primary_diagnosis.as_ref());
        list_field(&mut lines, "Differential diagnoses", a.differential_diagnoses.as_ref());
        list_field(&mut lines, "Clinical impression", a.clinical_impression.as_ref());
    }

    if let Some(p) = &note.plan {
        lines.push("Plan".bold().to_string());
        list_field(&mut lines, "Treatment", p.treatment.as_ref());
        list_field(&mut lines, "Medications", p.medications.as_ref());
        list_field(&mut lines, "Follow-up", p.follow_up.as_ref());
        list_field(&mut lines, "Patient education", p.patient_education.as_ref());
        list_field(&mut lines, "Additional testing", p.additional_testing.as_ref());
    }

    if note.is_empty() {
        if let Some(raw) = note.raw_response.as_deref().filter(|r| !r.trim().is_empty()) {
            lines.push(raw.dimmed().to_string());
        } else if note.failure().is_none() {
            lines.push(placeholder("The SOAP note is empty."));
        }
    }

    lines.join("\n")
}

fn score_label(report: &ComplianceReport) -> ColoredString {
    let text = format!("{:.0}/100", report.compliance_score);
    match report.band() {
        ScoreBand::Good => text.green().bold(),
        ScoreBand::Fair => text.yellow().bold(),
        ScoreBand::Poor => text.red().bold(),
    }
}

fn severity_label(severity: Severity) -> ColoredString {
    let text = format!("[{}]", severity);
    match severity {
        Severity::High => text.red(),
        Severity::Medium => text.yellow(),
        Severity::Low => text.blue(),
        Severity::Unknown => text.dimmed(),
    }
}

pub fn compliance_report(report: &ComplianceReport) -> String {
    let mut lines = Vec::new();

    if let Some(error) = &report.error {
        lines.push(format!("{} {}", "Compliance check failed:".yellow(), error));
        if let Some(raw) = &report.raw_response {
            lines.push(raw.dimmed().to_string());
        }
        return lines.join("\n");
    }

    lines.push(format!("Score: {}", score_label(report)));
    field(&mut lines, "Overall", report.overall_assessment.as_deref());

    if !report.missing_items.is_empty() {
        lines.push("Missing items".bold().to_string());
        for item in &report.missing_items {
            let mut line = format!("  {} {}: {}", severity_label(item.severity), item.category, item.item);
            if let Some(suggestion) = item.suggestion.as_deref().filter(|s| !s.trim().is_empty()) {
                line.push_str(&format!(" → {}", suggestion.italic()));
            }
            lines.push(line);
        }
    }

    if !report.recommendations.is_empty() {
        lines.push("Recommendations".bold().to_string());
        for (index, recommendation) in report.recommendations.iter().enumerate() {
            lines.push(format!("  {}. {}", index + 1, recommendation));
        }
    }

    lines.join("\n")
}

pub fn stats(stats: &DashboardStats) -> String {
    [
        ("Total sessions", stats.total_sessions),
        ("Completed notes", stats.completed_notes),
        ("Pending reviews", stats.pending_reviews),
        ("Active today", stats.active_today),
    ]
    .iter()
    .map(|(label, value)| format!("{} {}", value.to_string().bold(), label.dimmed()))
    .collect::<Vec<_>>()
    .join("   ")
}

fn status(session: &SessionSummary) -> ColoredString {
    if session.has_soap_note {
        "SOAP ready".green()
    } else if session.has_transcript {
        "Transcribed".yellow()
    } else {
        "New".dimmed()
    }
}

pub fn session_rows(sessions: &[&SessionSummary]) -> String {
    if sessions.is_empty() {
        return placeholder("No sessions found.");
    }
    let width = sessions.iter().map(|s| s.patient_name.chars().count()).max().unwrap_or(0);
    sessions
        .iter()
        .map(|session| {
            let local = session.created_at.with_timezone(&Local);
            let mut row = format!(
                "{:<width$}  {:<20}  {} {}  {}",
                session.patient_name,
                session.doctor_name,
                format_date(&local),
                format_timestamp(&local),
                status(session),
                width = width,
            );
            if session.has_summary {
                row.push_str(&format!(" {}", "+summary".blue()));
            }
            format!("{}\n  {}", row, session.session_id.dimmed())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn patient_summary(view: &PatientSummaryView) -> String {
    let mut out = vec![heading("Your visit summary")];
    let mut meta = format!("{} · {}", view.patient_name, view.doctor_name);
    if let Some(created) = view.created_at {
        meta.push_str(&format!(" · {}", format_date(&created.with_timezone(&Local))));
    }
    out.push(meta.dimmed().to_string());
    out.push(String::new());
    out.push(summary(Some(&view.summary)));
    out.join("\n")
}

/// Scannable QR code drawn with half-block characters
pub fn terminal_qr(data: &str) -> Result<String, qrcode::types::QrError> {
    let code = qrcode::QrCode::new(data.as_bytes())?;
    Ok(code
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .quiet_zone(true)
        .build())
}
