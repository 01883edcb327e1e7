//! Consultation summaries derived from a conversation transcript.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use medibridge_core::types::{ConsultationSummary, Message};
use medibridge_engines::{CompletionEngine, CompletionParams};
use medibridge_storage::db::Database;
use medibridge_storage::repository::{ConversationRepository, MessageRepository};

use crate::error::PipelineError;
use crate::parser::parse_summary;

/// Canonical narrative for a conversation without any messages.
pub const EMPTY_CONVERSATION_TEXT: &str = "No messages in conversation yet.";

// Low temperature keeps the extraction close to the transcript.
const SUMMARY_TEMPERATURE: f32 = 0.3;
const SUMMARY_MAX_TOKENS: u32 = 1000;

pub struct SummaryService {
    engine: Option<Arc<dyn CompletionEngine>>,
    conversations: ConversationRepository,
    messages: MessageRepository,
}

impl SummaryService {
    pub fn new(db: Arc<Database>, engine: Option<Arc<dyn CompletionEngine>>) -> Self {
        Self {
            engine,
            conversations: ConversationRepository::new(db.clone()),
            messages: MessageRepository::new(db),
        }
    }

    /// Summarize the conversation into structured clinical fields.
    ///
    /// An empty conversation yields the canonical empty summary without a
    /// model call. Malformed model output degrades to a narrative-only
    /// summary rather than failing.
    pub async fn summarize(
        &self,
        conversation_id: Uuid,
    ) -> Result<ConsultationSummary, PipelineError> {
        if self.conversations.find_by_id(conversation_id)?.is_none() {
            return Err(PipelineError::NotFound(conversation_id));
        }

        let messages = self.messages.list_for_conversation(conversation_id)?;
        if messages.is_empty() {
            debug!(%conversation_id, "no messages, returning empty summary");
            return Ok(ConsultationSummary::narrative_only(EMPTY_CONVERSATION_TEXT));
        }

        let engine = self
            .engine
            .as_ref()
            .ok_or(PipelineError::ServiceUnavailable("summarization"))?;

        let prompt = build_prompt(&render_transcript(&messages));
        let raw = engine
            .complete(
                &prompt,
                CompletionParams {
                    temperature: SUMMARY_TEMPERATURE,
                    max_tokens: SUMMARY_MAX_TOKENS,
                },
            )
            .await
            .map_err(|e| PipelineError::SummarizationFailed(e.to_string()))?;

        let summary = parse_summary(&raw);
        info!(
            %conversation_id,
            message_count = messages.len(),
            structured = !summary.symptoms.is_empty()
                || !summary.diagnoses.is_empty()
                || !summary.medications.is_empty()
                || !summary.followup_actions.is_empty(),
            "summarized conversation"
        );
        Ok(summary)
    }
}

/// Render messages as a speaker-labelled transcript in display order.
/// Audio-only messages contribute their label with no text.
fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| {
            format!(
                "{}: {}",
                message.sender_role.label(),
                message.original_text.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_prompt(transcript: &str) -> String {
    format!(
        "You are a medical scribe. Summarize the following doctor-patient \
         conversation.\n\nRespond with JSON only, using exactly these fields:\n\
         {{\n  \"symptoms\": [],\n  \"diagnoses\": [],\n  \"medications\": [],\n  \
         \"followup_actions\": [],\n  \"full_text\": \"\"\n}}\n\n\
         List each symptom, diagnosis, medication and follow-up action \
         mentioned, and write a brief narrative of the consultation in \
         full_text.\n\nConversation:\n{}",
        transcript
    )
}
