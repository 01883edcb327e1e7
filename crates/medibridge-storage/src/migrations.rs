//! Database schema migrations.
//!
//! Applies the initial schema: the conversations and messages tables plus
//! the schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use medibridge_core::error::MediBridgeError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), MediBridgeError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| MediBridgeError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| MediBridgeError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
///
/// Timestamps are stored as epoch milliseconds. `messages.seq` is a
/// monotonic insertion counter that breaks ordering ties between messages
/// committed within the same millisecond.
fn apply_v1(conn: &Connection) -> Result<(), MediBridgeError> {
    conn.execute_batch(
        "
        -- Bilingual consultation sessions.
        CREATE TABLE IF NOT EXISTS conversations (
            id               TEXT PRIMARY KEY NOT NULL,
            doctor_language  TEXT NOT NULL,
            patient_language TEXT NOT NULL,
            created_at       INTEGER NOT NULL,
            updated_at       INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_created
            ON conversations (created_at DESC);

        -- Immutable messages, owned by exactly one conversation.
        CREATE TABLE IF NOT EXISTS messages (
            seq             INTEGER PRIMARY KEY AUTOINCREMENT,
            id              TEXT NOT NULL UNIQUE,
            conversation_id TEXT NOT NULL
                            REFERENCES conversations(id) ON DELETE CASCADE,
            sender_role     TEXT NOT NULL
                            CHECK (sender_role IN ('doctor', 'patient')),
            original_text   TEXT,
            translated_text TEXT,
            audio_url       TEXT,
            created_at      INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages (conversation_id, created_at ASC, seq ASC);

        CREATE INDEX IF NOT EXISTS idx_messages_created
            ON messages (created_at DESC);

        -- Record migration.
        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| MediBridgeError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    #[test]
    fn test_migrations_run_once() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        // Running again should be idempotent.
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_conversations_table_exists() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO conversations (id, doctor_language, patient_language, created_at, updated_at)
             VALUES ('conv-1', 'EN', 'ES', 1700000000000, 1700000000000)",
            [],
        )
        .unwrap();

        let lang: String = conn
            .query_row(
                "SELECT patient_language FROM conversations WHERE id = 'conv-1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(lang, "ES");
    }

    #[test]
    fn test_messages_table_exists() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO conversations (id, doctor_language, patient_language, created_at, updated_at)
             VALUES ('conv-1', 'EN', 'ES', 1700000000000, 1700000000000)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO messages (id, conversation_id, sender_role, original_text, created_at)
             VALUES ('msg-1', 'conv-1', 'doctor', 'How are you feeling?', 1700000001000)",
            [],
        )
        .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_sender_role_check() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO conversations (id, doctor_language, patient_language, created_at, updated_at)
             VALUES ('conv-1', 'EN', 'ES', 0, 0)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO messages (id, conversation_id, sender_role, created_at)
             VALUES ('bad', 'conv-1', 'nurse', 0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_message_requires_conversation() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO messages (id, conversation_id, sender_role, created_at)
             VALUES ('orphan', 'missing-conv', 'doctor', 0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_conversation_cascades() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO conversations (id, doctor_language, patient_language, created_at, updated_at)
             VALUES ('conv-1', 'EN', 'ES', 0, 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO messages (id, conversation_id, sender_role, created_at)
             VALUES ('msg-1', 'conv-1', 'patient', 0)",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM conversations WHERE id = 'conv-1'", [])
            .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_seq_is_monotonic() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO conversations (id, doctor_language, patient_language, created_at, updated_at)
             VALUES ('conv-1', 'EN', 'ES', 0, 0)",
            [],
        )
        .unwrap();
        // Same created_at on purpose.
        for i in 0..3 {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, sender_role, created_at)
                 VALUES (?1, 'conv-1', 'doctor', 1700000000000)",
                [format!("msg-{}", i)],
            )
            .unwrap();
        }

        let ids: Vec<String> = conn
            .prepare("SELECT id FROM messages ORDER BY created_at ASC, seq ASC")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ids, vec!["msg-0", "msg-1", "msg-2"]);
    }
}
