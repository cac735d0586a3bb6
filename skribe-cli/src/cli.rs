//! Command-line definition

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use skribe_client::{ConfigOverrides, Tab};
use std::path::PathBuf;
use std::time::Duration;

/// Skribe clinical documentation client
#[derive(Parser, Debug)]
#[command(name = "skribe", version)]
#[command(about = "Record consultations and manage SOAP notes, patient summaries and compliance reports")]
pub struct Cli {
    /// Configuration file (YAML or TOML); defaults to ./skribe.yaml when present
    #[arg(long, global = true, env = "SKRIBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8000
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// WebSocket base URL, e.g. ws://localhost:8000
    #[arg(long, global = true)]
    pub ws_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Seconds to wait for a pushed result
    #[arg(long, global = true, default_value_t = 120)]
    pub wait: u64,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            ws_url: self.ws_url.clone(),
            log_level: self.verbose.then(|| "debug".to_string()),
            json_logs: self.json_logs.then_some(true),
        }
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Session counters and the session list
    Dashboard {
        /// Only show sessions whose patient or doctor name contains TERM
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Create a session; prompts for missing names
    New {
        #[arg(long)]
        doctor: Option<String>,
        #[arg(long)]
        patient: Option<String>,
    },

    /// Print a session
    Show {
        session_id: String,
        /// transcript, soap, summary or compliance; all tabs when omitted
        #[arg(long, value_parser = parse_tab)]
        tab: Option<Tab>,
    },

    /// Record a consultation and print its transcript
    Record {
        session_id: String,
        /// Send an existing recording
        #[arg(long, conflicts_with = "mic", required_unless_present = "mic")]
        file: Option<PathBuf>,
        /// Record from the default input device
        #[arg(long)]
        mic: bool,
        /// Stop recording after SECS; otherwise Ctrl-C stops
        #[arg(long)]
        duration: Option<u64>,
        /// Chunk size in bytes when replaying a file
        #[arg(long, default_value_t = skribe_client::recording::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },

    /// Generate a SOAP note from the transcript
    Soap { session_id: String },

    /// Generate a patient summary from the SOAP note
    Summary { session_id: String },

    /// Score the SOAP note for documentation completeness
    Compliance { session_id: String },

    /// Rewrite the patient summary following instructions
    EditSummary {
        session_id: String,
        #[arg(long)]
        prompt: String,
    },

    /// Issue the patient QR code
    Qr {
        session_id: String,
        /// Also save the code as PNG
        #[arg(long)]
        png: Option<PathBuf>,
    },

    /// Print the public patient view behind the QR code
    PatientSummary { session_id: String },

    /// Delete a session
    Delete {
        session_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Check that the backend is up
    Health,

    /// Print shell completions
    Completions { shell: Shell },
}

fn parse_tab(value: &str) -> Result<Tab, String> {
    value.parse().map_err(|_| {
        let known: Vec<_> = Tab::ALL.iter().map(|tab| tab.id()).collect();
        format!("expected one of {}", known.join(", "))
    })
}
