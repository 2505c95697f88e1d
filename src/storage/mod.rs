//! Conversation persistence
//!
//! Stores conversations and their messages in SQLite with cascade delete
//! and transactional multi-row writes. Connections run in WAL mode so
//! concurrent readers never block on the writer and never observe a
//! partial transaction; writers serialize on the database file.

use crate::error::{Result, VaultdeskError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::time::Duration;

pub mod types;
pub use types::{Conversation, Message, NewMessage, Role};

/// Default cap for conversation listings
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Storage backend for conversations and messages
pub struct ConversationStore {
    db_path: PathBuf,
}

impl ConversationStore {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory.
    pub fn new() -> Result<Self> {
        // Allow override of the DB path via environment variable, so the
        // binary can be pointed at a test DB or alternate file without
        // changing the user's application data dir.
        if let Ok(override_path) = std::env::var("VAULTDESK_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "vaultdesk", "vaultdesk")
            .ok_or_else(|| VaultdeskError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        let db_path = data_dir.join("conversations.db");
        Self::new_with_path(db_path)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// This is primarily useful for tests where the default application data
    /// directory is not desirable (for example, using a temporary directory).
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| VaultdeskError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }

    /// Open a connection with the required pragmas applied
    ///
    /// WAL keeps readers off the writer's lock; foreign_keys must be set
    /// per-connection or the cascade on messages silently stops working.
    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        Ok(conn)
    }

    /// Initialize the database schema (idempotent, safe on every startup)
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL
                    REFERENCES conversations(id) ON DELETE CASCADE,
                role TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_conversation
                ON messages(conversation_id, created_at);",
        )
        .context("Failed to create tables")
        .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Create a new conversation
    ///
    /// # Errors
    ///
    /// Returns `VaultdeskError::Integrity` if the id already exists (the
    /// existing row is left untouched), `VaultdeskError::Validation` if id
    /// or title is empty.
    pub fn create_conversation(&self, id: &str, title: &str) -> Result<Conversation> {
        if id.is_empty() {
            return Err(VaultdeskError::Validation("conversation id is required".into()).into());
        }
        if title.is_empty() {
            return Err(VaultdeskError::Validation("conversation title is required".into()).into());
        }

        let conn = self.open()?;
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        conn.execute(
            "INSERT INTO conversations (id, title, created_at, updated_at)
            VALUES (?, ?, ?, ?)",
            params![id, title, now_str, now_str],
        )
        .map_err(|e| map_write_error("Failed to insert conversation", e))?;

        Ok(Conversation {
            id: id.to_string(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// List conversations ordered by most-recently-updated first
    ///
    /// `limit` defaults to [`DEFAULT_LIST_LIMIT`] when `None`.
    pub fn list_conversations(&self, limit: Option<usize>) -> Result<Vec<Conversation>> {
        let conn = self.open()?;
        // A limit beyond i64 would wrap negative, which SQLite reads as
        // "no limit"; clamp instead.
        let limit = i64::try_from(limit.unwrap_or(DEFAULT_LIST_LIMIT)).unwrap_or(i64::MAX);

        let mut stmt = conn
            .prepare(
                "SELECT id, title, created_at, updated_at
                FROM conversations
                ORDER BY updated_at DESC
                LIMIT ?",
            )
            .context("Failed to prepare statement")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], conversation_from_row)
            .context("Failed to query conversations")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        let mut conversations = Vec::new();
        for row in rows {
            conversations
                .push(row.map_err(|e| VaultdeskError::Storage(e.to_string()))?);
        }

        Ok(conversations)
    }

    /// Fetch a conversation by id
    pub fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let conn = self.open()?;

        conn.query_row(
            "SELECT id, title, created_at, updated_at FROM conversations WHERE id = ?",
            params![id],
            conversation_from_row,
        )
        .optional()
        .context("Failed to query conversation")
        .map_err(|e| VaultdeskError::Storage(e.to_string()).into())
    }

    /// Update a conversation's title, bumping its updated_at
    ///
    /// # Errors
    ///
    /// Returns `VaultdeskError::NotFound` if no such conversation exists.
    pub fn update_conversation_title(&self, id: &str, title: &str) -> Result<()> {
        if title.is_empty() {
            return Err(VaultdeskError::Validation("conversation title is required".into()).into());
        }

        let conn = self.open()?;
        let now = Utc::now().to_rfc3339();

        let changed = conn
            .execute(
                "UPDATE conversations SET title = ?, updated_at = ? WHERE id = ?",
                params![title, now, id],
            )
            .context("Failed to update conversation")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        if changed == 0 {
            return Err(VaultdeskError::NotFound(format!("conversation {}", id)).into());
        }

        Ok(())
    }

    /// Delete a conversation and, via the foreign-key cascade, all of its
    /// messages. The cascade runs inside the engine's own delete, so no
    /// orphaned message is ever observable.
    ///
    /// Deleting a nonexistent conversation is a no-op (idempotent).
    pub fn delete_conversation(&self, id: &str) -> Result<()> {
        let conn = self.open()?;

        conn.execute("DELETE FROM conversations WHERE id = ?", params![id])
            .context("Failed to delete conversation")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Append a message and bump the owning conversation's updated_at as a
    /// single atomic unit
    ///
    /// A concurrent reader sees either both effects or neither.
    ///
    /// # Errors
    ///
    /// Returns `VaultdeskError::Integrity` if the conversation does not
    /// exist or the message id is already taken, `VaultdeskError::Validation`
    /// for empty content or id.
    pub fn add_message(&self, conversation_id: &str, message: &NewMessage) -> Result<Message> {
        if message.id.is_empty() {
            return Err(VaultdeskError::Validation("message id is required".into()).into());
        }
        if message.content.is_empty() {
            return Err(VaultdeskError::Validation("message content is required".into()).into());
        }

        let mut conn = self.open()?;
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        tx.execute(
            "INSERT INTO messages (id, conversation_id, role, content, created_at)
            VALUES (?, ?, ?, ?, ?)",
            params![
                message.id,
                conversation_id,
                message.role.as_str(),
                message.content,
                now_str
            ],
        )
        .map_err(|e| map_write_error("Failed to insert message", e))?;

        tx.execute(
            "UPDATE conversations SET updated_at = ? WHERE id = ?",
            params![now_str, conversation_id],
        )
        .context("Failed to touch conversation")
        .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        Ok(Message {
            id: message.id.clone(),
            conversation_id: conversation_id.to_string(),
            role: message.role,
            content: message.content.clone(),
            created_at: now,
        })
    }

    /// Fetch all messages of a conversation in creation order
    ///
    /// Returns an empty vector for an unknown conversation id.
    pub fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, conversation_id, role, content, created_at
                FROM messages
                WHERE conversation_id = ?
                ORDER BY created_at ASC, rowid ASC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![conversation_id], message_from_row)
            .context("Failed to query messages")
            .map_err(|e| VaultdeskError::Storage(e.to_string()))?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row.map_err(|e| VaultdeskError::Storage(e.to_string()))?);
        }

        Ok(messages)
    }
}

/// Map a write failure, surfacing constraint violations as integrity errors
fn map_write_error(context: &str, e: rusqlite::Error) -> anyhow::Error {
    match &e {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            VaultdeskError::Integrity(format!("{}: {}", context, e)).into()
        }
        _ => VaultdeskError::Storage(format!("{}: {}", context, e)).into(),
    }
}

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: parse_timestamp(2, &row.get::<_, String>(2)?)?,
        updated_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let role_str: String = row.get(2)?;
    // The CHECK constraint keeps unknown roles out; seeing one anyway
    // means the database was edited out-of-band, so report it
    let role = Role::parse(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown role '{}'", role_str).into(),
        )
    })?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role,
        content: row.get(3)?,
        created_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
    })
}

/// Parse a stored RFC 3339 timestamp, reporting corruption instead of
/// substituting a value
fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
