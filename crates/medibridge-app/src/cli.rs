//! CLI argument definitions for the MediBridge application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// MediBridge — translated doctor-patient conversations with summaries.
#[derive(Parser, Debug)]
#[command(name = "medibridge", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Data directory for the SQLite database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a new conversation between a doctor and a patient.
    New {
        /// Language the doctor speaks (e.g. EN).
        #[arg(long)]
        doctor_lang: String,
        /// Language the patient speaks (e.g. ES).
        #[arg(long)]
        patient_lang: String,
    },

    /// List all conversations with message counts.
    List,

    /// Show a conversation's full message history.
    Show { conversation_id: Uuid },

    /// Send a message into a conversation, translating it for the other
    /// participant.
    Send {
        conversation_id: Uuid,
        /// Who is speaking: doctor or patient.
        #[arg(long)]
        role: String,
        /// The utterance to translate and record.
        text: String,
    },

    /// Attach an audio recording to a conversation.
    SendAudio {
        conversation_id: Uuid,
        /// Who is speaking: doctor or patient.
        #[arg(long)]
        role: String,
        /// Path to the recording file.
        file: PathBuf,
        /// MIME type of the recording.
        #[arg(long, default_value = "audio/webm")]
        content_type: String,
    },

    /// Translate a one-off phrase without recording it.
    Translate {
        text: String,
        /// Target language code.
        #[arg(long)]
        to: String,
        /// Source language code; detected when omitted.
        #[arg(long)]
        from: Option<String>,
    },

    /// List the languages the translation engine supports.
    Languages,

    /// Search message text across all conversations.
    Search { query: String },

    /// Summarize a conversation into structured clinical fields.
    Summarize { conversation_id: Uuid },

    /// Delete a conversation and all of its messages.
    Delete { conversation_id: Uuid },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MEDIBRIDGE_CONFIG env var > ~/.medibridge/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MEDIBRIDGE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory path.
    ///
    /// Priority: --data-dir flag > config file value.
    /// Returns `None` if not overridden (use config default).
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".medibridge").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".medibridge").join("config.toml");
    }
    PathBuf::from("config.toml")
}
