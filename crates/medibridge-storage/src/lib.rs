//! MediBridge storage crate - SQLite persistence for conversations and messages.
//!
//! Provides a WAL-mode SQLite database with migrations, repositories for
//! the conversation/message entities (cascade deletes, count aggregates,
//! ordered loads), and dual-column substring search over message text.

pub mod db;
pub mod migrations;
pub mod repository;
pub mod search;

pub use db::Database;
pub use repository::{ConversationListing, ConversationRepository, MessageRepository};
pub use search::MessageSearch;
