//! Message composition: translate, upload, commit.
//!
//! A message only reaches storage once every remote step it needs has
//! succeeded. A failed translation or upload leaves no partial record
//! behind.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use medibridge_core::types::{Message, NewMessage, SenderRole};
use medibridge_engines::BlobStore;
use medibridge_storage::db::Database;
use medibridge_storage::repository::{ConversationRepository, MessageRepository};

use crate::error::PipelineError;
use crate::translator::TranslationService;

/// Captured audio accompanying a message.
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Everything needed to compose one message.
pub struct ComposeRequest {
    pub conversation_id: Uuid,
    pub sender_role: SenderRole,
    pub original_text: Option<String>,
    pub target_lang: String,
    pub source_lang: Option<String>,
    pub audio: Option<AudioClip>,
}

pub struct MessageComposer {
    translator: Arc<TranslationService>,
    blobs: Option<Arc<dyn BlobStore>>,
    conversations: ConversationRepository,
    messages: MessageRepository,
}

impl MessageComposer {
    pub fn new(
        db: Arc<Database>,
        translator: Arc<TranslationService>,
        blobs: Option<Arc<dyn BlobStore>>,
    ) -> Self {
        Self {
            translator,
            blobs,
            conversations: ConversationRepository::new(db.clone()),
            messages: MessageRepository::new(db),
        }
    }

    /// Run the full pipeline for one message and return the committed
    /// record.
    pub async fn compose(&self, request: ComposeRequest) -> Result<Message, PipelineError> {
        let text = request
            .original_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if text.is_none() && request.audio.is_none() {
            return Err(PipelineError::InvalidInput(
                "message must carry text or audio".to_string(),
            ));
        }

        if self
            .conversations
            .find_by_id(request.conversation_id)?
            .is_none()
        {
            return Err(PipelineError::NotFound(request.conversation_id));
        }

        let translated_text = match text {
            Some(text) => {
                let translation = self
                    .translator
                    .translate(
                        text,
                        &request.target_lang,
                        request.source_lang.as_deref(),
                    )
                    .await?;
                Some(translation.translated_text)
            }
            None => None,
        };

        let audio_url = match request.audio {
            Some(clip) => Some(self.upload_audio(request.conversation_id, clip).await?),
            None => None,
        };

        let message = self.messages.insert(NewMessage {
            conversation_id: request.conversation_id,
            sender_role: request.sender_role,
            original_text: text.map(|t| t.to_string()),
            translated_text,
            audio_url,
        })?;

        info!(
            message_id = %message.id,
            conversation_id = %message.conversation_id,
            sender_role = %message.sender_role.as_str(),
            has_audio = message.audio_url.is_some(),
            "committed message"
        );
        Ok(message)
    }

    async fn upload_audio(
        &self,
        conversation_id: Uuid,
        clip: AudioClip,
    ) -> Result<String, PipelineError> {
        let blobs = self
            .blobs
            .as_ref()
            .ok_or(PipelineError::ServiceUnavailable("audio storage"))?;

        // Random suffix so two clips recorded in the same millisecond
        // cannot overwrite each other.
        let key = format!(
            "{}/{}-{}.webm",
            conversation_id,
            Utc::now().timestamp_millis(),
            Uuid::new_v4()
        );

        blobs
            .put(&key, clip.bytes, &clip.content_type)
            .await
            .map_err(|e| PipelineError::UploadFailed(e.to_string()))
    }
}
