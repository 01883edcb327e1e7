//! Repository implementations for SQLite-backed persistence.
//!
//! Provides ConversationRepository and MessageRepository operating on the
//! Database struct using raw SQL. The repositories own identity and commit
//! timestamp assignment: callers hand in a `NewMessage` and get back the
//! persisted record.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use medibridge_core::error::MediBridgeError;
use medibridge_core::types::{Conversation, Message, NewMessage, SenderRole};

use crate::db::Database;

/// A conversation plus its message count, for listing views.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationListing {
    pub conversation: Conversation,
    pub message_count: u64,
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

/// Current time truncated to the stored precision.
///
/// Timestamps are persisted as epoch milliseconds, so the records this
/// module hands back must carry no finer resolution — a returned record
/// and its reloaded counterpart compare equal.
fn now_millis() -> DateTime<Utc> {
    millis_to_datetime(Utc::now().timestamp_millis())
}

fn row_to_conversation(row: &Row<'_>) -> Result<Conversation, MediBridgeError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let doctor_language: String = row
        .get(1)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let patient_language: String = row
        .get(2)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let created_ms: i64 = row
        .get(3)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let updated_ms: i64 = row
        .get(4)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;

    Ok(Conversation {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| MediBridgeError::Storage(format!("Invalid UUID: {}", e)))?,
        doctor_language,
        patient_language,
        created_at: millis_to_datetime(created_ms),
        updated_at: millis_to_datetime(updated_ms),
    })
}

pub(crate) fn row_to_message(row: &Row<'_>) -> Result<Message, MediBridgeError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let conversation_str: String = row
        .get(1)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let role_str: String = row
        .get(2)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let original_text: Option<String> = row
        .get(3)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let translated_text: Option<String> = row
        .get(4)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let audio_url: Option<String> = row
        .get(5)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
    let created_ms: i64 = row
        .get(6)
        .map_err(|e| MediBridgeError::Storage(e.to_string()))?;

    Ok(Message {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| MediBridgeError::Storage(format!("Invalid UUID: {}", e)))?,
        conversation_id: Uuid::parse_str(&conversation_str)
            .map_err(|e| MediBridgeError::Storage(format!("Invalid UUID: {}", e)))?,
        sender_role: SenderRole::parse(&role_str).ok_or_else(|| {
            MediBridgeError::Storage(format!("Unknown sender_role: {}", role_str))
        })?,
        original_text,
        translated_text,
        audio_url,
        created_at: millis_to_datetime(created_ms),
    })
}

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_role, original_text, translated_text, audio_url, created_at";

/// Repository for conversation entities.
pub struct ConversationRepository {
    db: Arc<Database>,
}

impl ConversationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a new conversation with both participant languages.
    ///
    /// Identity and timestamps are assigned here; `updated_at` starts equal
    /// to `created_at`.
    pub fn create(
        &self,
        doctor_language: &str,
        patient_language: &str,
    ) -> Result<Conversation, MediBridgeError> {
        let now = now_millis();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            doctor_language: doctor_language.to_string(),
            patient_language: patient_language.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, doctor_language, patient_language, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                rusqlite::params![
                    conversation.id.to_string(),
                    conversation.doctor_language,
                    conversation.patient_language,
                    conversation.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| MediBridgeError::Storage(format!("Failed to create conversation: {}", e)))?;
            Ok(())
        })?;

        Ok(conversation)
    }

    /// Find a conversation by ID.
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, MediBridgeError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, doctor_language, patient_language, created_at, updated_at
                     FROM conversations WHERE id = ?1",
                )
                .map_err(|e| MediBridgeError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_conversation(row))
                })
                .optional()
                .map_err(|e| MediBridgeError::Storage(e.to_string()))?;

            match result {
                Some(conversation) => Ok(Some(conversation?)),
                None => Ok(None),
            }
        })
    }

    /// List all conversations with their message counts, newest first.
    ///
    /// Conversations without messages report count 0.
    pub fn list_with_counts(&self) -> Result<Vec<ConversationListing>, MediBridgeError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT c.id, c.doctor_language, c.patient_language, c.created_at, c.updated_at,
                            COUNT(m.seq)
                     FROM conversations c
                     LEFT JOIN messages m ON m.conversation_id = c.id
                     GROUP BY c.id
                     ORDER BY c.created_at DESC",
                )
                .map_err(|e| MediBridgeError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| {
                    let count: i64 = row.get(5)?;
                    Ok((row_to_conversation(row), count))
                })
                .map_err(|e| MediBridgeError::Storage(e.to_string()))?;

            let mut listings = Vec::new();
            for row in rows {
                let (conversation, count) =
                    row.map_err(|e| MediBridgeError::Storage(e.to_string()))?;
                listings.push(ConversationListing {
                    conversation: conversation?,
                    message_count: count as u64,
                });
            }
            Ok(listings)
        })
    }

    /// Delete a conversation. Messages cascade at the SQLite level.
    ///
    /// Returns whether a conversation was actually removed.
    pub fn delete(&self, id: Uuid) -> Result<bool, MediBridgeError> {
        self.db.with_conn(|conn| {
            let affected = conn
                .execute(
                    "DELETE FROM conversations WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                )
                .map_err(|e| {
                    MediBridgeError::Storage(format!("Failed to delete conversation: {}", e))
                })?;
            Ok(affected > 0)
        })
    }
}

/// Repository for message entities.
pub struct MessageRepository {
    db: Arc<Database>,
}

impl MessageRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Commit a fully assembled message.
    ///
    /// Assigns identity and the commit timestamp, and refreshes the owning
    /// conversation's `updated_at` in the same transaction. Returns the
    /// persisted record so callers can append it to an in-memory view
    /// without a re-fetch.
    pub fn insert(&self, new: NewMessage) -> Result<Message, MediBridgeError> {
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: new.conversation_id,
            sender_role: new.sender_role,
            original_text: new.original_text,
            translated_text: new.translated_text,
            audio_url: new.audio_url,
            created_at: now_millis(),
        };

        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| MediBridgeError::Storage(e.to_string()))?;

            tx.execute(
                "INSERT INTO messages (id, conversation_id, sender_role, original_text, translated_text, audio_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    message.id.to_string(),
                    message.conversation_id.to_string(),
                    message.sender_role.as_str(),
                    message.original_text,
                    message.translated_text,
                    message.audio_url,
                    message.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| MediBridgeError::Storage(format!("Failed to save message: {}", e)))?;

            tx.execute(
                "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
                rusqlite::params![
                    message.created_at.timestamp_millis(),
                    message.conversation_id.to_string(),
                ],
            )
            .map_err(|e| MediBridgeError::Storage(format!("Failed to touch conversation: {}", e)))?;

            tx.commit()
                .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
            Ok(())
        })?;

        Ok(message)
    }

    /// Load all messages of a conversation in ascending commit order.
    ///
    /// The `(created_at, seq)` sort is a hard contract: the chat display
    /// and transcript rendering both rely on it.
    pub fn list_for_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>, MediBridgeError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE conversation_id = ?1
                     ORDER BY created_at ASC, seq ASC"
                ))
                .map_err(|e| MediBridgeError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![conversation_id.to_string()], |row| {
                    Ok(row_to_message(row))
                })
                .map_err(|e| MediBridgeError::Storage(e.to_string()))?;

            let mut messages = Vec::new();
            for row in rows {
                let message = row.map_err(|e| MediBridgeError::Storage(e.to_string()))??;
                messages.push(message);
            }
            Ok(messages)
        })
    }

    /// Count messages in a conversation.
    pub fn count_for_conversation(&self, conversation_id: Uuid) -> Result<u64, MediBridgeError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                    rusqlite::params![conversation_id.to_string()],
                    |row| row.get(0),
                )
                .map_err(|e| MediBridgeError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}
