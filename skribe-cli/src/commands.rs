//! Command handlers

use anyhow::{anyhow, bail, Context as _, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use colored::*;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use skribe_client::{
    ApiClient, AudioCapture, ClientConfig, Dashboard, FileCapture, ListQuery, LiveSession, NewSessionForm, NoCapture,
    ServerMessage, SessionApi, Tab,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::cli::{Cli, Command};
use crate::render;

/// Results requested over the WebSocket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Soap,
    Summary,
    Compliance,
}

impl Generation {
    pub fn tab(self) -> Tab {
        match self {
            Generation::Soap => Tab::Soap,
            Generation::Summary => Tab::Summary,
            Generation::Compliance => Tab::Compliance,
        }
    }

    fn progress(self) -> &'static str {
        match self {
            Generation::Soap => "Generating SOAP note",
            Generation::Summary => "Generating patient summary",
            Generation::Compliance => "Checking compliance",
        }
    }

    /// Whether `message` is the result of this request
    pub fn is_result(self, message: &ServerMessage) -> bool {
        matches!(
            (self, message),
            (Generation::Soap, ServerMessage::SoapGenerated { .. })
                | (Generation::Summary, ServerMessage::SummaryGenerated { .. })
                | (Generation::Compliance, ServerMessage::ComplianceReport { .. })
        )
    }
}

pub fn print_completions(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// The session's remembered error, or `fallback`
fn failure(session: &mut LiveSession, fallback: &str) -> anyhow::Error {
    anyhow!(session.take_last_error().unwrap_or_else(|| fallback.to_string()))
}

fn capture_device(file: Option<PathBuf>, mic: bool, chunk_size: usize) -> Result<Box<dyn AudioCapture>> {
    if mic {
        return microphone();
    }
    let path = file.ok_or_else(|| anyhow!("either --file or --mic is required"))?;
    Ok(Box::new(FileCapture::new(path).with_chunk_size(chunk_size)))
}

#[cfg(feature = "microphone")]
fn microphone() -> Result<Box<dyn AudioCapture>> {
    Ok(Box::new(skribe_client::MicrophoneCapture::new()))
}

#[cfg(not(feature = "microphone"))]
fn microphone() -> Result<Box<dyn AudioCapture>> {
    bail!("this build has no microphone support; rebuild with `--features microphone` or pass --file")
}

pub struct App {
    config: ClientConfig,
    api: Arc<ApiClient>,
    wait: Duration,
}

impl App {
    pub fn new(config: ClientConfig, wait: Duration) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);
        Ok(Self { config, api, wait })
    }

    fn session_api(&self) -> Arc<dyn SessionApi> {
        self.api.clone()
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Dashboard { search, limit, offset } => self.dashboard(search, ListQuery { limit, offset }).await,
            Command::New { doctor, patient } => self.new_session(doctor, patient).await,
            Command::Show { session_id, tab } => self.show(&session_id, tab).await,
            Command::Record { session_id, file, mic, duration, chunk_size } => {
                let capture = capture_device(file, mic, chunk_size)?;
                self.record(&session_id, capture, mic.then_some(duration)).await
            }
            Command::Soap { session_id } => self.generate(&session_id, Generation::Soap).await,
            Command::Summary { session_id } => self.generate(&session_id, Generation::Summary).await,
            Command::Compliance { session_id } => self.generate(&session_id, Generation::Compliance).await,
            Command::EditSummary { session_id, prompt } => self.edit_summary(&session_id, &prompt).await,
            Command::Qr { session_id, png } => self.qr(&session_id, png.as_deref()).await,
            Command::PatientSummary { session_id } => self.patient_summary(&session_id).await,
            Command::Delete { session_id, yes } => self.delete(&session_id, yes).await,
            Command::Health => self.health().await,
            Command::Completions { shell } => {
                print_completions(shell);
                Ok(())
            }
        }
    }

    async fn dashboard(&self, search: Option<String>, query: ListQuery) -> Result<()> {
        let mut dashboard = Dashboard::new(self.session_api());
        dashboard.load(query).await;
        if let Some(term) = search {
            dashboard.set_search_term(term);
        }

        println!("{}", render::stats(&dashboard.stats()));
        println!();
        println!("{}", render::session_rows(&dashboard.visible_sessions()));
        Ok(())
    }

    async fn new_session(&self, doctor: Option<String>, patient: Option<String>) -> Result<()> {
        let doctor = match doctor {
            Some(name) => name,
            None => Input::<String>::new().with_prompt("Doctor name").interact_text()?,
        };
        let patient = match patient {
            Some(name) => name,
            None => Input::<String>::new().with_prompt("Patient name").interact_text()?,
        };

        let form = NewSessionForm::new(doctor, patient);
        if !form.is_complete() {
            bail!("doctor and patient names are both required");
        }
        let route = form
            .submit(&self.session_api())
            .await
            .ok_or_else(|| anyhow!("the session was not created"))?;

        println!("{} {}", "Created".green().bold(), route.path());
        Ok(())
    }

    async fn show(&self, session_id: &str, tab: Option<Tab>) -> Result<()> {
        let detail = self.api.get_session(session_id).await?;
        println!("{}", render::session(&detail, tab));
        Ok(())
    }

    /// Mount a live session; generation commands are useless without a socket
    async fn live(&self, session_id: &str, capture: Box<dyn AudioCapture>) -> Result<LiveSession> {
        let session = LiveSession::connect(&self.config, session_id, self.session_api(), capture).await?;
        if !session.is_connected() {
            bail!("could not connect to {}", self.config.transcription_ws_url());
        }
        Ok(session)
    }

    async fn await_result<F>(&self, session: &mut LiveSession, progress: &str, done: F) -> Result<ServerMessage>
    where
        F: FnMut(&ServerMessage) -> bool,
    {
        let bar = spinner(progress);
        let result = session.wait_for(self.wait, done).await;
        bar.finish_and_clear();
        Ok(result?)
    }

    /// `listen_for`: `None` replays immediately, `Some(None)` records until
    /// Ctrl-C, `Some(Some(secs))` records for a fixed time
    async fn record(
        &self,
        session_id: &str,
        capture: Box<dyn AudioCapture>,
        listen_for: Option<Option<u64>>,
    ) -> Result<()> {
        let mut session = self.live(session_id, capture).await?;
        let outcome = self.record_take(&mut session, listen_for).await;
        session.close().await;
        outcome
    }

    async fn record_take(&self, session: &mut LiveSession, listen_for: Option<Option<u64>>) -> Result<()> {
        if !session.start_recording() {
            return Err(failure(session, "recording did not start"));
        }

        match listen_for {
            None => {}
            Some(Some(secs)) => {
                eprintln!("{} for {}s", "Recording".red().bold(), secs);
                tokio::time::sleep(Duration::from_secs(secs)).await;
            }
            Some(None) => {
                eprintln!("{} press Ctrl-C to stop", "Recording,".red().bold());
                tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
            }
        }

        if !session.stop_recording().await {
            return Err(failure(session, "the recording could not be sent"));
        }
        self.await_result(session, "Transcribing", |m| matches!(m, ServerMessage::TranscriptComplete { .. }))
            .await?;

        if let Some(error) = session.take_last_error() {
            eprintln!("{} transcript was not saved: {}", "warning:".yellow().bold(), error);
        }
        println!("{}", render::tab_view(session.detail(), Tab::Transcript));
        Ok(())
    }

    async fn generate(&self, session_id: &str, what: Generation) -> Result<()> {
        let mut session = self.live(session_id, Box::new(NoCapture)).await?;
        let outcome = self.generate_in(&mut session, what).await;
        session.close().await;
        outcome
    }

    async fn generate_in(&self, session: &mut LiveSession, what: Generation) -> Result<()> {
        let sent = match what {
            Generation::Soap => {
                if !session.can_generate_soap() {
                    bail!("session {} has no transcript yet; run `skribe record` first", session.session_id());
                }
                session.generate_soap().await
            }
            Generation::Summary => {
                if !session.can_generate_summary() {
                    bail!("session {} has no SOAP note yet; run `skribe soap` first", session.session_id());
                }
                session.generate_summary().await
            }
            Generation::Compliance => {
                if session.detail().soap_note.is_none() {
                    bail!("session {} has no SOAP note yet; run `skribe soap` first", session.session_id());
                }
                session.run_compliance_check().await
            }
        };
        if !sent {
            return Err(failure(session, "the request could not be sent"));
        }
        debug!(session_id = %session.session_id(), ?what, "Waiting for result");

        self.await_result(session, what.progress(), |m| what.is_result(m)).await?;
        println!("{}", render::tab_view(session.detail(), what.tab()));
        Ok(())
    }

    async fn edit_summary(&self, session_id: &str, prompt: &str) -> Result<()> {
        if prompt.trim().is_empty() {
            bail!("the edit prompt is empty");
        }
        let mut session =
            LiveSession::open(session_id, self.session_api(), None, Box::new(NoCapture), self.config.redact_logs)
                .await?;

        session.toggle_summary_editor();
        session.set_summary_edit_prompt(prompt);
        let bar = spinner("Editing patient summary");
        let edited = session.edit_summary().await;
        bar.finish_and_clear();
        if !edited {
            return Err(failure(&mut session, "the summary was not edited"));
        }

        println!("{}", render::tab_view(session.detail(), Tab::Summary));
        Ok(())
    }

    async fn qr(&self, session_id: &str, png: Option<&Path>) -> Result<()> {
        let mut session =
            LiveSession::open(session_id, self.session_api(), None, Box::new(NoCapture), self.config.redact_logs)
                .await?;
        if !session.generate_qr_code().await {
            return Err(failure(&mut session, "no QR code was issued"));
        }
        let qr = session.qr_code().cloned().ok_or_else(|| anyhow!("no QR code was issued"))?;

        println!("{}", render::terminal_qr(&qr.qr_code_url).context("the QR code could not be drawn")?);
        println!("{} {}", "Patient link:".bold(), qr.qr_code_url);

        if let Some(path) = png {
            let image = match qr.png_bytes()? {
                Some(image) => image,
                None => self.api.qr_code_image(session_id).await?,
            };
            std::fs::write(path, &image).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = image.len(), "QR code saved");
            println!("Saved {}", path.display());
        }
        Ok(())
    }

    async fn patient_summary(&self, session_id: &str) -> Result<()> {
        let view = self.api.patient_summary(session_id).await?;
        println!("{}", render::patient_summary(&view));
        Ok(())
    }

    async fn delete(&self, session_id: &str, yes: bool) -> Result<()> {
        if !yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete session {}?", session_id))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }
        let response = self.api.delete_session(session_id).await?;
        println!("{}", response.message);
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        let health = self.api.health().await?;
        if !health.is_healthy() {
            bail!("backend at {} reports status '{}'", self.api.base_url(), health.status);
        }
        println!(
            "{} {} is {} at {}",
            "✓".green().bold(),
            health.service.as_deref().unwrap_or("backend"),
            health.status,
            self.api.base_url()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skribe_client::SoapNote;

    #[test]
    fn test_generation_matches_only_its_result() {
        let soap = ServerMessage::SoapGenerated { data: SoapNote::default() };
        let summary = ServerMessage::SummaryGenerated { data: "Rest.".into() };

        assert!(Generation::Soap.is_result(&soap));
        assert!(!Generation::Soap.is_result(&summary));
        assert!(Generation::Summary.is_result(&summary));
        assert!(!Generation::Compliance.is_result(&soap));
        assert_eq!(Generation::Compliance.tab(), Tab::Compliance);
    }

    #[test]
    fn test_file_capture_needs_a_path() {
        assert!(capture_device(None, false, 1024).is_err());
        assert!(capture_device(Some(PathBuf::from("visit.webm")), false, 1024).is_ok());
    }

    #[cfg(not(feature = "microphone"))]
    #[test]
    fn test_microphone_needs_the_feature() {
        assert!(capture_device(None, true, 1024).is_err());
    }
}
