//! Conversation lifecycle: create, load, list, delete.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use medibridge_core::types::{Conversation, Message};
use medibridge_storage::db::Database;
use medibridge_storage::repository::{
    ConversationListing, ConversationRepository, MessageRepository,
};

use crate::error::PipelineError;

pub struct ConversationService {
    conversations: ConversationRepository,
    messages: MessageRepository,
}

impl ConversationService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            conversations: ConversationRepository::new(db.clone()),
            messages: MessageRepository::new(db),
        }
    }

    /// Start a new conversation between a doctor and a patient speaking
    /// the given languages.
    pub fn create(
        &self,
        doctor_language: &str,
        patient_language: &str,
    ) -> Result<Conversation, PipelineError> {
        if doctor_language.trim().is_empty() || patient_language.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "both participant languages are required".to_string(),
            ));
        }

        let conversation = self
            .conversations
            .create(doctor_language.trim(), patient_language.trim())?;
        info!(
            conversation_id = %conversation.id,
            doctor_language = %conversation.doctor_language,
            patient_language = %conversation.patient_language,
            "created conversation"
        );
        Ok(conversation)
    }

    /// Load a conversation and its full message history in display order.
    pub fn load(&self, id: Uuid) -> Result<(Conversation, Vec<Message>), PipelineError> {
        let conversation = self
            .conversations
            .find_by_id(id)?
            .ok_or(PipelineError::NotFound(id))?;
        let messages = self.messages.list_for_conversation(id)?;
        Ok((conversation, messages))
    }

    /// List all conversations, most recently created first, with message
    /// counts.
    pub fn list(&self) -> Result<Vec<ConversationListing>, PipelineError> {
        Ok(self.conversations.list_with_counts()?)
    }

    /// Delete a conversation and everything hanging off it.
    pub fn delete(&self, id: Uuid) -> Result<(), PipelineError> {
        if !self.conversations.delete(id)? {
            return Err(PipelineError::NotFound(id));
        }
        info!(conversation_id = %id, "deleted conversation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibridge_core::types::{NewMessage, SenderRole};

    fn service() -> (ConversationService, Arc<Database>) {
        let db = Arc::new(Database::in_memory().expect("in-memory database"));
        (ConversationService::new(db.clone()), db)
    }

    #[test]
    fn test_create_and_load() {
        let (service, _db) = service();

        let conversation = service.create("en", "es").expect("create");
        let (loaded, messages) = service.load(conversation.id).expect("load");

        assert_eq!(loaded.id, conversation.id);
        assert_eq!(loaded.doctor_language, "en");
        assert_eq!(loaded.patient_language, "es");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_create_trims_languages() {
        let (service, _db) = service();

        let conversation = service.create("  en ", " fr").expect("create");
        assert_eq!(conversation.doctor_language, "en");
        assert_eq!(conversation.patient_language, "fr");
    }

    #[test]
    fn test_create_rejects_blank_language() {
        let (service, _db) = service();

        let err = service.create("en", "   ").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_load_unknown_conversation() {
        let (service, _db) = service();

        let id = Uuid::new_v4();
        let err = service.load(id).unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(found) if found == id));
    }

    #[test]
    fn test_list_includes_message_counts() {
        let (service, db) = service();
        let messages = MessageRepository::new(db);

        let conversation = service.create("en", "es").expect("create");
        messages
            .insert(NewMessage {
                conversation_id: conversation.id,
                sender_role: SenderRole::Doctor,
                original_text: Some("hello".to_string()),
                translated_text: Some("hola".to_string()),
                audio_url: None,
            })
            .expect("insert");

        let listings = service.list().expect("list");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].message_count, 1);
    }

    #[test]
    fn test_delete_removes_conversation() {
        let (service, _db) = service();

        let conversation = service.create("en", "es").expect("create");
        service.delete(conversation.id).expect("delete");

        assert!(matches!(
            service.load(conversation.id).unwrap_err(),
            PipelineError::NotFound(_)
        ));
    }

    #[test]
    fn test_delete_unknown_conversation() {
        let (service, _db) = service();

        let err = service.delete(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }
}
