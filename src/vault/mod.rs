//! Vault reading: markdown file listing and content access
//!
//! The vault is a plain directory tree of markdown notes. Nothing here is
//! persisted; listings are recomputed from the filesystem on every call.
//! Files may appear, disappear, or change between a listing and a
//! subsequent read, so read failures are reported as not-found rather
//! than treated as fatal.

use crate::error::{Result, VaultdeskError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub mod graph;
pub use graph::{build_graph, EdgeKind, GraphEdge, GraphNode, LinkGraph, NodeKind};

/// One markdown file in the vault listing (read-only view, never persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultFile {
    /// Path relative to the vault root, with `/` separators
    pub path: String,
    /// File name including extension
    pub name: String,
    /// Top-level folder, empty for files directly under the root
    pub folder: String,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

impl VaultFile {
    /// File name with the markdown extension stripped
    pub fn stem(&self) -> &str {
        self.name.strip_suffix(".md").unwrap_or(&self.name)
    }
}

/// Lists and reads markdown files under a configured root directory
pub struct VaultReader {
    root: PathBuf,
}

impl VaultReader {
    /// Create a reader over the given vault root
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The configured vault root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate markdown files, optionally scoped to one top-level folder
    ///
    /// A file whose metadata cannot be read is skipped; an unreadable root
    /// directory is a hard error. The listing is sorted by path so callers
    /// (notably link resolution) see a deterministic order.
    pub fn list_files(&self, folder: Option<&str>) -> Result<Vec<VaultFile>> {
        if !self.root.is_dir() {
            return Err(VaultdeskError::Vault(format!(
                "vault root is not a readable directory: {}",
                self.root.display()
            ))
            .into());
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // Root errors are caught by the is_dir check above;
                    // deeper failures only cost us that subtree.
                    tracing::debug!("skipping unreadable vault entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(".md") {
                continue;
            }

            let rel = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let path = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let top_folder = match path.split_once('/') {
                Some((first, _)) => first.to_string(),
                None => String::new(),
            };

            if let Some(wanted) = folder {
                if top_folder != wanted {
                    continue;
                }
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::debug!("skipping vault file without metadata: {} ({})", path, e);
                    continue;
                }
            };
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            files.push(VaultFile {
                path,
                name,
                folder: top_folder,
                size: metadata.len(),
                modified,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Read the raw content of one vault file by relative path
    ///
    /// # Errors
    ///
    /// Returns `VaultdeskError::Vault` for paths escaping the root and
    /// `VaultdeskError::NotFound` for any read failure (the file may have
    /// vanished since the listing).
    pub fn read_file(&self, path: &str) -> Result<String> {
        let rel = Path::new(path);
        let safe = rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe || rel.as_os_str().is_empty() {
            return Err(
                VaultdeskError::Vault(format!("path escapes the vault root: {}", path)).into(),
            );
        }

        std::fs::read_to_string(self.root.join(rel))
            .map_err(|e| VaultdeskError::NotFound(format!("vault file {} ({})", path, e)).into())
    }
}

/// Split a markdown document into front-matter metadata and body
///
/// Front-matter is a leading block delimited by `---` lines containing
/// flat `key: value` pairs (no nested structures). Documents without a
/// complete front-matter block yield empty metadata and the full input
/// as body.
pub fn split_front_matter(raw: &str) -> (BTreeMap<String, String>, &str) {
    let after_fence = if let Some(rest) = raw.strip_prefix("---\n") {
        rest
    } else if let Some(rest) = raw.strip_prefix("---\r\n") {
        rest
    } else {
        return (BTreeMap::new(), raw);
    };

    let mut offset = 0;
    for line in after_fence.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let mut metadata = BTreeMap::new();
            for meta_line in after_fence[..offset].lines() {
                if let Some((key, value)) = meta_line.split_once(':') {
                    let key = key.trim();
                    if !key.is_empty() {
                        metadata.insert(key.to_string(), value.trim().to_string());
                    }
                }
            }
            return (metadata, &after_fence[offset + line.len()..]);
        }
        offset += line.len();
    }

    // Opening fence without a closing one: treat the whole input as body
    (BTreeMap::new(), raw)
}
