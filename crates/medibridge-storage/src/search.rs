//! Substring search over message text.
//!
//! Matches a query case-insensitively against both `original_text` and
//! `translated_text`, so a clinician searching in one language finds
//! utterances recorded in the other. Results come back newest-first.
//!
//! This is a deliberate linear scan, not a ranked index: recency ordering
//! and dual-field substring semantics are user-visible contracts. Case
//! folding happens in Rust — SQLite's `LOWER()` only folds A-Z, which
//! would miss accented text ("MAÑANA" vs "mañana") in exactly the
//! bilingual domain this search serves.

use std::sync::Arc;

use medibridge_core::error::MediBridgeError;
use medibridge_core::types::Message;

use crate::db::Database;
use crate::repository::row_to_message;

fn contains_folded(text: Option<&str>, query_lower: &str) -> bool {
    text.is_some_and(|t| t.to_lowercase().contains(query_lower))
}

/// Dual-column substring search engine over persisted messages.
pub struct MessageSearch {
    db: Arc<Database>,
}

impl MessageSearch {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Find messages whose original or translated text contains `query`
    /// (case-insensitive), newest first, capped at `limit`.
    ///
    /// An empty or whitespace-only query returns no results without
    /// touching the table.
    pub fn find_matches(&self, query: &str, limit: u64) -> Result<Vec<Message>, MediBridgeError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query_lower = query.to_lowercase();

        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, conversation_id, sender_role, original_text, translated_text, audio_url, created_at
                     FROM messages
                     WHERE original_text IS NOT NULL OR translated_text IS NOT NULL
                     ORDER BY created_at DESC, seq DESC",
                )
                .map_err(|e| MediBridgeError::Search(format!("Query prepare failed: {}", e)))?;

            let rows = stmt
                .query_map([], |row| Ok(row_to_message(row)))
                .map_err(|e| MediBridgeError::Search(format!("Query failed: {}", e)))?;

            let mut results = Vec::new();
            for row in rows {
                if results.len() as u64 >= limit {
                    break;
                }
                let message = row.map_err(|e| MediBridgeError::Search(e.to_string()))??;
                if contains_folded(message.original_text.as_deref(), &query_lower)
                    || contains_folded(message.translated_text.as_deref(), &query_lower)
                {
                    results.push(message);
                }
            }
            Ok(results)
        })
    }
}
