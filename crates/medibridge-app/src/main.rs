//! MediBridge application binary - composition root.
//!
//! Ties together all MediBridge crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Initialize storage (SQLite)
//! 3. Construct the remote engine adapters that have credentials
//! 4. Wire the pipeline services and dispatch the CLI command

mod backoff;
mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use medibridge_core::config::MediBridgeConfig;
use medibridge_core::types::SenderRole;
use medibridge_engines::{
    BlobStore, BucketClient, CompletionEngine, DeepLClient, MistralClient, TranslationEngine,
};
use medibridge_pipeline::{
    AudioClip, ComposeRequest, ConversationService, MessageComposer, SearchService,
    SummaryService, TranslationService,
};
use medibridge_storage::Database;

use crate::backoff::with_retries;
use crate::cli::{CliArgs, Command};

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

fn parse_role(role: &str) -> Result<SenderRole, Box<dyn std::error::Error>> {
    SenderRole::parse(role)
        .ok_or_else(|| format!("unknown role '{}': expected doctor or patient", role).into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first; the log level default lives there.
    let config_file = args.resolve_config_path();
    let mut config = MediBridgeConfig::load_or_default(&config_file);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.general.log_level.clone())
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting MediBridge v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let db_path = data_dir.join("medibridge.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::debug!(path = %db_path.display(), "SQLite database opened");

    // Remote engines. A missing credential disables the engine rather than
    // failing startup; local commands must keep working offline.
    let translation_engine: Option<Arc<dyn TranslationEngine>> =
        if config.translation.api_key.trim().is_empty() {
            tracing::debug!("translation engine disabled (no api key)");
            None
        } else {
            Some(Arc::new(DeepLClient::new(&config.translation)?))
        };
    let completion_engine: Option<Arc<dyn CompletionEngine>> =
        if config.summarization.api_key.trim().is_empty() {
            tracing::debug!("summarization engine disabled (no api key)");
            None
        } else {
            Some(Arc::new(MistralClient::new(&config.summarization)?))
        };
    let blob_store: Option<Arc<dyn BlobStore>> = if config.blob.api_key.trim().is_empty() {
        tracing::debug!("audio storage disabled (no api key)");
        None
    } else {
        Some(Arc::new(BucketClient::new(&config.blob)?))
    };

    // Pipeline services.
    let translator = Arc::new(TranslationService::new(translation_engine));
    let conversations = ConversationService::new(db.clone());
    let composer = MessageComposer::new(db.clone(), translator.clone(), blob_store);
    let searcher = SearchService::new(db.clone());
    let summarizer = SummaryService::new(db.clone(), completion_engine);
    let retry = &config.retry;

    match args.command {
        Command::New {
            doctor_lang,
            patient_lang,
        } => {
            let conversation = conversations.create(&doctor_lang, &patient_lang)?;
            println!("{}", conversation.id);
        }

        Command::List => {
            for listing in conversations.list()? {
                let c = &listing.conversation;
                println!(
                    "{}  {} <-> {}  {} messages  created {}",
                    c.id,
                    c.doctor_language,
                    c.patient_language,
                    listing.message_count,
                    c.created_at.format("%Y-%m-%d %H:%M"),
                );
            }
        }

        Command::Show { conversation_id } => {
            let (conversation, messages) = conversations.load(conversation_id)?;
            println!(
                "Conversation {} ({} <-> {})",
                conversation.id, conversation.doctor_language, conversation.patient_language
            );
            for message in messages {
                let original = message.original_text.as_deref().unwrap_or("[audio]");
                println!(
                    "[{}] {}: {}",
                    message.created_at.format("%H:%M:%S"),
                    message.sender_role.label(),
                    original
                );
                if let Some(translated) = &message.translated_text {
                    println!("    -> {}", translated);
                }
                if let Some(url) = &message.audio_url {
                    println!("    audio: {}", url);
                }
            }
        }

        Command::Send {
            conversation_id,
            role,
            text,
        } => {
            let sender_role = parse_role(&role)?;
            let (conversation, _) = conversations.load(conversation_id)?;
            // Translate into the other participant's language.
            let (source_lang, target_lang) = match sender_role {
                SenderRole::Doctor => (
                    conversation.doctor_language.clone(),
                    conversation.patient_language.clone(),
                ),
                SenderRole::Patient => (
                    conversation.patient_language.clone(),
                    conversation.doctor_language.clone(),
                ),
            };

            let message = with_retries(retry, "send", || {
                composer.compose(ComposeRequest {
                    conversation_id,
                    sender_role,
                    original_text: Some(text.clone()),
                    target_lang: target_lang.clone(),
                    source_lang: Some(source_lang.clone()),
                    audio: None,
                })
            })
            .await?;

            println!(
                "{}: {}",
                message.sender_role.label(),
                message.original_text.as_deref().unwrap_or("")
            );
            if let Some(translated) = &message.translated_text {
                println!("    -> {}", translated);
            }
        }

        Command::SendAudio {
            conversation_id,
            role,
            file,
            content_type,
        } => {
            let sender_role = parse_role(&role)?;
            let (conversation, _) = conversations.load(conversation_id)?;
            let target_lang = match sender_role {
                SenderRole::Doctor => conversation.patient_language.clone(),
                SenderRole::Patient => conversation.doctor_language.clone(),
            };
            let bytes = std::fs::read(&file)?;

            let message = with_retries(retry, "send-audio", || {
                composer.compose(ComposeRequest {
                    conversation_id,
                    sender_role,
                    original_text: None,
                    target_lang: target_lang.clone(),
                    source_lang: None,
                    audio: Some(AudioClip {
                        bytes: bytes.clone(),
                        content_type: content_type.clone(),
                    }),
                })
            })
            .await?;

            if let Some(url) = &message.audio_url {
                println!("{}", url);
            }
        }

        Command::Translate { text, to, from } => {
            let translation = with_retries(retry, "translate", || {
                translator.translate(&text, &to, from.as_deref())
            })
            .await?;
            if let Some(detected) = &translation.detected_language {
                tracing::info!(detected = %detected, "source language detected");
            }
            println!("{}", translation.translated_text);
        }

        Command::Languages => {
            for language in translator.target_languages().await? {
                println!("{}  {}", language.code, language.name);
            }
        }

        Command::Search { query } => {
            let hits = searcher.search(&query)?;
            if hits.is_empty() {
                println!("no matches");
            }
            for hit in hits {
                println!(
                    "{}  [{}] {}: {}",
                    hit.conversation_id,
                    hit.created_at.format("%Y-%m-%d %H:%M"),
                    hit.sender_role.label(),
                    if hit.context.is_empty() {
                        "(match in translation)"
                    } else {
                        hit.context.as_str()
                    }
                );
            }
        }

        Command::Summarize { conversation_id } => {
            let summary = with_retries(retry, "summarize", || {
                summarizer.summarize(conversation_id)
            })
            .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Delete { conversation_id } => {
            conversations.delete(conversation_id)?;
            println!("deleted {}", conversation_id);
        }
    }

    Ok(())
}
