//! Cross-conversation message search with context snippets.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use medibridge_core::types::SenderRole;
use medibridge_storage::db::Database;
use medibridge_storage::search::MessageSearch;

use crate::error::PipelineError;

/// Hard cap on results per query.
pub const RESULT_LIMIT: u64 = 50;

/// Characters of surrounding text shown on each side of a match.
pub const CONTEXT_CHARS: usize = 50;

/// One search match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub message_id: Uuid,
    pub conversation_id: Uuid,
    pub sender_role: SenderRole,
    pub created_at: DateTime<Utc>,
    /// Original text of the matched message, when it has any.
    pub text: Option<String>,
    /// Snippet around the first occurrence of the query.
    pub context: String,
}

pub struct SearchService {
    search: MessageSearch,
}

impl SearchService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            search: MessageSearch::new(db),
        }
    }

    /// Find messages whose original or translated text contains `query`,
    /// case-insensitively. Newest first, capped at [`RESULT_LIMIT`].
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, PipelineError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let matches = self.search.find_matches(query, RESULT_LIMIT)?;
        debug!(query, count = matches.len(), "search complete");

        Ok(matches
            .into_iter()
            .map(|message| {
                let source = message
                    .original_text
                    .as_deref()
                    .or(message.translated_text.as_deref())
                    .unwrap_or("");
                let context = context_window(source, query);
                SearchHit {
                    message_id: message.id,
                    conversation_id: message.conversation_id,
                    sender_role: message.sender_role,
                    created_at: message.created_at,
                    text: message.original_text,
                    context,
                }
            })
            .collect())
    }
}

/// Snippet of `text` around the first case-insensitive occurrence of
/// `query`, with up to [`CONTEXT_CHARS`] characters of context on each
/// side.
///
/// The match is located by case-folding `text` char by char while
/// recording which original byte produced each folded byte, so offsets
/// map back correctly even where folding changes byte lengths ('İ' folds
/// to a two-char sequence). Returns an empty string when the query does
/// not occur, which happens when the match was in the other language
/// field.
fn context_window(text: &str, query: &str) -> String {
    let query_lower = query.to_lowercase();
    if query_lower.is_empty() {
        return String::new();
    }

    let mut folded = String::with_capacity(text.len());
    let mut origins = Vec::with_capacity(text.len() + 1);
    for (offset, c) in text.char_indices() {
        for low in c.to_lowercase() {
            for _ in 0..low.len_utf8() {
                origins.push(offset);
            }
            folded.push(low);
        }
    }
    origins.push(text.len());

    let Some(hit) = folded.find(&query_lower) else {
        return String::new();
    };
    let match_start = origins[hit];
    let match_end = origins[hit + query_lower.len()];

    let back: usize = text[..match_start]
        .chars()
        .rev()
        .take(CONTEXT_CHARS)
        .map(|c| c.len_utf8())
        .sum();
    let ahead: usize = text[match_end..]
        .chars()
        .take(CONTEXT_CHARS)
        .map(|c| c.len_utf8())
        .sum();

    text[match_start - back..match_end + ahead].to_string()
}
