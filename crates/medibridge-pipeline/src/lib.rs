//! Conversation pipeline for bilingual consultations.
//!
//! Services here sit between the storage layer and the remote engines:
//! composing messages (translate, upload, commit), searching across
//! conversations, and deriving consultation summaries. Remote engines are
//! optional at construction; a missing engine turns the operations that
//! need it into `ServiceUnavailable` errors while everything local keeps
//! working.

pub mod composer;
pub mod conversations;
pub mod error;
pub mod parser;
pub mod search;
pub mod summarizer;
pub mod translator;

#[cfg(test)]
mod testing;

pub use composer::{AudioClip, ComposeRequest, MessageComposer};
pub use conversations::ConversationService;
pub use error::PipelineError;
pub use search::{SearchHit, SearchService, CONTEXT_CHARS, RESULT_LIMIT};
pub use summarizer::{SummaryService, EMPTY_CONVERSATION_TEXT};
pub use translator::TranslationService;
