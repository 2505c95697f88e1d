//! Configuration management for VaultDesk
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, VaultdeskError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for VaultDesk
///
/// This structure holds all configuration needed to serve the dashboard
/// backend: HTTP bind settings, authentication secrets, the vault root,
/// conversation storage, and the external workflow dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration (login secret, signing key, webhook secret)
    #[serde(default)]
    pub auth: AuthConfig,

    /// Vault (markdown note directory) configuration
    #[serde(default)]
    pub vault: VaultConfig,

    /// Conversation storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// External workflow dispatcher configuration
    #[serde(default)]
    pub workflows: WorkflowConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the server to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Production mode: marks the session cookie `Secure`
    #[serde(default)]
    pub production: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8420
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            production: false,
        }
    }
}

/// Authentication configuration
///
/// Exactly one login secret is recognized; there is no user table.
/// The session signing key is mandatory for serving: tokens cannot be
/// issued or validated without it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// The single recognized login secret (empty means login always fails)
    #[serde(default)]
    pub password: String,

    /// Symmetric key used to sign session tokens (required to serve)
    #[serde(default)]
    pub session_key: String,

    /// Shared secret expected from the inbound bot webhook
    #[serde(default)]
    pub webhook_secret: String,
}

/// Vault configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Root directory of the markdown note vault
    #[serde(default = "default_vault_root")]
    pub root: PathBuf,
}

fn default_vault_root() -> PathBuf {
    PathBuf::from("vault")
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: default_vault_root(),
        }
    }
}

/// Conversation storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    ///
    /// When unset, the database lives in the platform data directory
    /// (e.g. `~/.local/share/vaultdesk/conversations.db`).
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// External workflow dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Base URL of the workflow dispatcher (webhook receiver)
    #[serde(default = "default_dispatcher_url")]
    pub dispatcher_url: String,
}

fn default_dispatcher_url() -> String {
    "http://localhost:5678".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            dispatcher_url: default_dispatcher_url(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// Precedence (lowest to highest): built-in defaults, config file,
    /// environment variables, CLI flags.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            vault: VaultConfig::default(),
            storage: StorageConfig::default(),
            workflows: WorkflowConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| VaultdeskError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| VaultdeskError::Config(format!("Failed to parse config: {}", e)).into())
    }

    /// Apply environment variable overrides
    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("VAULTDESK_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("VAULTDESK_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid VAULTDESK_PORT: {}", port),
            }
        }

        if let Ok(password) = std::env::var("VAULTDESK_PASSWORD") {
            self.auth.password = password;
        }

        if let Ok(key) = std::env::var("VAULTDESK_SESSION_KEY") {
            self.auth.session_key = key;
        }

        if let Ok(secret) = std::env::var("VAULTDESK_WEBHOOK_SECRET") {
            self.auth.webhook_secret = secret;
        }

        if let Ok(root) = std::env::var("VAULTDESK_VAULT_ROOT") {
            self.vault.root = PathBuf::from(root);
        }

        if let Ok(db_path) = std::env::var("VAULTDESK_DB") {
            self.storage.db_path = Some(PathBuf::from(db_path));
        }

        if let Ok(url) = std::env::var("VAULTDESK_DISPATCHER_URL") {
            self.workflows.dispatcher_url = url;
        }
    }

    /// Apply CLI argument overrides
    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(vault_root) = &cli.vault_root {
            self.vault.root = vault_root.clone();
        }

        if let Some(db_path) = &cli.db_path {
            self.storage.db_path = Some(db_path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// The session signing key is the one setting the process cannot serve
    /// without: a missing key must abort startup, not fail per-request.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.auth.session_key.is_empty() {
            return Err(VaultdeskError::Config(
                "auth.session_key is required (set VAULTDESK_SESSION_KEY or the config file)"
                    .to_string(),
            )
            .into());
        }

        if self.auth.password.is_empty() {
            tracing::warn!("auth.password is empty: login is disabled (fail-closed)");
        }

        if self.server.host.is_empty() {
            return Err(VaultdeskError::Config("server.host cannot be empty".to_string()).into());
        }

        if self.vault.root.as_os_str().is_empty() {
            return Err(VaultdeskError::Config("vault.root cannot be empty".to_string()).into());
        }

        if self.workflows.dispatcher_url.is_empty() {
            return Err(VaultdeskError::Config(
                "workflows.dispatcher_url cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
