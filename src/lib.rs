//! VaultDesk - personal dashboard backend library
//!
//! This library provides the core functionality behind the VaultDesk
//! dashboard: session authentication, conversation persistence, vault
//! indexing with a wiki-link graph, and workflow dispatch.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: credential verification, signed session tokens, access gate
//! - `storage`: SQLite-backed conversation and message store
//! - `vault`: markdown vault listing, reading, and link graph building
//! - `server`: axum router, shared state, and request handlers
//! - `workflow`: client for the external workflow dispatcher
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;
pub mod vault;
pub mod workflow;

// Re-export commonly used types
pub use auth::SessionTokenService;
pub use config::Config;
pub use error::{Result, VaultdeskError};
pub use storage::ConversationStore;
pub use vault::VaultReader;
