use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MediBridgeError, Result};

/// Top-level configuration for the MediBridge application.
///
/// Loaded from `~/.medibridge/config.toml` by default. Remote engine
/// credentials live here and are injected into clients at construction;
/// an empty `api_key` means the corresponding engine is simply not
/// configured and operations requiring it fail with a service-unavailable
/// condition instead of falling back to untranslated text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediBridgeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub summarization: SummarizationConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for MediBridgeConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            translation: TranslationConfig::default(),
            summarization: SummarizationConfig::default(),
            blob: BlobConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl MediBridgeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MediBridgeConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MediBridgeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.medibridge/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Translation engine (DeepL-compatible REST API) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// API key. Empty means the translation engine is not configured.
    pub api_key: String,
    /// Base URL of the translation API.
    pub base_url: String,
    /// Request timeout in seconds. Translation calls are short-bounded.
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.deepl.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Summarization engine (chat-completions API) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationConfig {
    /// API key. Empty means the summarization engine is not configured.
    pub api_key: String,
    /// Base URL of the completions API.
    pub base_url: String,
    /// Model identifier passed to the API.
    pub model: String,
    /// Request timeout in seconds. Model calls may legitimately take a
    /// minute, so this bound is longer than the translation one.
    pub timeout_secs: u64,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.mistral.ai".to_string(),
            model: "mistral-large-latest".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Blob store (object storage API) configuration for audio recordings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    /// API key. Empty means the blob store is not configured.
    pub api_key: String,
    /// Base URL of the storage API.
    pub base_url: String,
    /// Bucket that receives audio uploads.
    pub bucket: String,
    /// Request timeout in seconds. Large audio blobs may take a while.
    pub timeout_secs: u64,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            bucket: "audio-recordings".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Caller-side retry policy for transient remote failures.
///
/// The pipeline itself never retries (one attempt, one outcome); the
/// application boundary applies exponential backoff using these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts, including the first.
    pub max_attempts: u32,
    /// Base delay in milliseconds; doubles after each failed attempt.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}
