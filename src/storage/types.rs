//! Row types for the conversation store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Caller-supplied unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp; advances whenever a message is appended
    pub updated_at: DateTime<Utc>,
}

/// A stored message belonging to a conversation
///
/// Messages are append-only: they are never mutated after insertion and
/// only disappear when their conversation is deleted (cascade).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Caller-supplied unique identifier
    pub id: String,
    /// Owning conversation (foreign key, required)
    pub conversation_id: String,
    /// Author role
    pub role: Role,
    /// Message body (non-empty)
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Message author role: exactly two values are allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse from the wire representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for appending a message to a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    /// Caller-supplied unique identifier
    pub id: String,
    /// Author role
    pub role: Role,
    /// Message body (non-empty)
    pub content: String,
}
