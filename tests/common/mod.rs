//! Shared helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vaultdesk::config::Config;

/// Write a vault note, creating parent folders as needed
pub fn write_note(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create note parent dir");
    }
    fs::write(path, content).expect("failed to write note");
}

/// A config wired to temp directories, suitable for building an AppState
pub fn test_config(vault_dir: &TempDir, data_dir: &TempDir) -> Config {
    let yaml = format!(
        r#"
server:
  host: 127.0.0.1
  port: 0
auth:
  password: hunter2
  session_key: integration-test-signing-key
  webhook_secret: bot-shared-secret
vault:
  root: {vault}
storage:
  db_path: {db}
workflows:
  dispatcher_url: http://127.0.0.1:9
"#,
        vault = vault_dir.path().display(),
        db = data_dir.path().join("conversations.db").display(),
    );
    let config: Config = serde_yaml::from_str(&yaml).expect("failed to parse test config");
    config.validate().expect("test config should validate");
    config
}
