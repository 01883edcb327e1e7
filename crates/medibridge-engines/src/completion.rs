//! Summarization engine adapter.
//!
//! The `CompletionEngine` trait exposes a single prompt-in, text-out call;
//! `MistralClient` implements it against a chat-completions style API.
//! The returned text is raw and untrusted — parsing it is the pipeline's
//! job, not the adapter's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use medibridge_core::config::SummarizationConfig;

use crate::error::EngineError;

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Contract for a remote text-completion engine.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Run the prompt and return the raw model response text.
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String, EngineError>;
}

// ---------------------------------------------------------------------------
// Chat-completions wire format
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP client for a Mistral-compatible chat-completions API.
pub struct MistralClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl MistralClient {
    /// Build a client from configuration. Fails if the API key is empty.
    pub fn new(config: &SummarizationConfig) -> Result<Self, EngineError> {
        if config.api_key.trim().is_empty() {
            return Err(EngineError::Config("summarization api_key is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionEngine for MistralClient {
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String, EngineError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Calling completion engine");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Decode(e.to_string()))?;

        let first = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Decode("empty choices array".into()))?;

        Ok(first.message.content)
    }
}
