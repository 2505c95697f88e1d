//! Link graph construction over the vault
//!
//! Turns the vault's file listing and contents into a node/edge graph:
//! one node per file, one node per distinct top-level folder, a `folder`
//! membership edge for every file, and a `wiki-link` edge for every
//! resolvable `[[target]]` occurrence. Broken links are expected in
//! user-authored prose and are silently dropped.

use crate::error::{Result, VaultdeskError};
use crate::vault::{VaultFile, VaultReader};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Weight assigned to file nodes
pub const FILE_NODE_WEIGHT: u32 = 1;

/// Weight assigned to folder nodes
pub const FOLDER_NODE_WEIGHT: u32 = 3;

/// Matches `[[target]]` and `[[target|display]]`; display text is discarded
const WIKI_LINK_PATTERN: &str = r"\[\[([^\]|]+)(?:\|[^\]]*)?\]\]";

/// Node kind in the link graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

/// Edge kind in the link graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    #[serde(rename = "folder")]
    Folder,
    #[serde(rename = "wiki-link")]
    WikiLink,
}

/// A graph node: either a vault file or a top-level folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// File path, or `folder:<name>` for folder nodes
    pub id: String,
    /// Display name (file stem, or folder name)
    pub name: String,
    /// Rendering weight (files 1, folders 3)
    pub weight: u32,
    pub kind: NodeKind,
}

/// A directed graph edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

/// The assembled link graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Build the full link graph for a vault
///
/// A file that cannot be read still appears as a node; it just
/// contributes no outgoing wiki-link edges.
pub fn build_graph(reader: &VaultReader) -> Result<LinkGraph> {
    let files = reader.list_files(None)?;
    let wiki_link = Regex::new(WIKI_LINK_PATTERN)
        .map_err(|e| VaultdeskError::Vault(format!("invalid wiki-link pattern: {}", e)))?;

    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    // File nodes, plus folder nodes in first-seen listing order
    let mut folders: Vec<&str> = Vec::new();
    for file in &files {
        nodes.push(GraphNode {
            id: file.path.clone(),
            name: file.stem().to_string(),
            weight: FILE_NODE_WEIGHT,
            kind: NodeKind::File,
        });
        if !folders.contains(&file.folder.as_str()) {
            folders.push(&file.folder);
        }
    }
    for folder in &folders {
        nodes.push(GraphNode {
            id: format!("folder:{}", folder),
            name: folder.to_string(),
            weight: FOLDER_NODE_WEIGHT,
            kind: NodeKind::Folder,
        });
    }

    // Exactly one membership edge per file
    for file in &files {
        edges.push(GraphEdge {
            source: file.path.clone(),
            target: format!("folder:{}", file.folder),
            kind: EdgeKind::Folder,
        });
    }

    // Wiki-link edges, one per occurrence (duplicates deliberately kept
    // so occurrence counts survive for analytics)
    for file in &files {
        let content = match reader.read_file(&file.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("skipping link scan for {}: {}", file.path, e);
                continue;
            }
        };

        for capture in wiki_link.captures_iter(&content) {
            let target = capture[1].trim();
            if let Some(resolved) = resolve_link(target, &files) {
                if resolved.path != file.path {
                    edges.push(GraphEdge {
                        source: file.path.clone(),
                        target: resolved.path.clone(),
                        kind: EdgeKind::WikiLink,
                    });
                }
            }
        }
    }

    Ok(LinkGraph { nodes, edges })
}

/// Resolve a wiki-link target against the file listing
///
/// Preference order: exact name with extension, name without extension,
/// exact path, path with `.md` appended. Within each rule the first match
/// in listing order wins; same-named files in different folders are not
/// disambiguated further.
fn resolve_link<'a>(target: &str, files: &'a [VaultFile]) -> Option<&'a VaultFile> {
    files
        .iter()
        .find(|f| f.name == target)
        .or_else(|| files.iter().find(|f| f.stem() == target))
        .or_else(|| files.iter().find(|f| f.path == target))
        .or_else(|| {
            let with_ext = format!("{}.md", target);
            files.iter().find(move |f| f.path == with_ext)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_note(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write note");
    }

    fn wiki_edges(graph: &LinkGraph) -> Vec<(&str, &str)> {
        graph
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::WikiLink)
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }

    #[test]
    fn test_simple_link_produces_one_edge() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "notes/A.md", "See [[B]] for details");
        write_note(dir.path(), "notes/B.md", "No links here");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");

        let file_nodes: Vec<&GraphNode> = graph
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::File)
            .collect();
        assert_eq!(file_nodes.len(), 2);
        assert!(file_nodes.iter().all(|n| n.weight == FILE_NODE_WEIGHT));

        assert_eq!(wiki_edges(&graph), vec![("notes/A.md", "notes/B.md")]);

        let folder_edges: Vec<&GraphEdge> = graph
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Folder)
            .collect();
        assert_eq!(folder_edges.len(), 2);
        assert!(folder_edges.iter().all(|e| e.target == "folder:notes"));
    }

    #[test]
    fn test_unresolvable_link_is_dropped_silently() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "A.md", "Broken [[C]] link");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");
        assert!(wiki_edges(&graph).is_empty());
    }

    #[test]
    fn test_self_link_is_dropped() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "A.md", "Recursive [[A]] reference");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");
        assert!(wiki_edges(&graph).is_empty());
    }

    #[test]
    fn test_display_text_is_discarded() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "A.md", "See [[B|the other note]]");
        write_note(dir.path(), "B.md", "");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");
        assert_eq!(wiki_edges(&graph), vec![("A.md", "B.md")]);
    }

    #[test]
    fn test_duplicate_links_are_not_deduplicated() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "A.md", "[[B]] and [[B.md]] and [[B|again]]");
        write_note(dir.path(), "B.md", "");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");
        // One edge per occurrence, even with mixed syntaxes
        assert_eq!(wiki_edges(&graph).len(), 3);
    }

    #[test]
    fn test_folder_node_per_distinct_folder() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "projects/alpha.md", "");
        write_note(dir.path(), "projects/beta.md", "");
        write_note(dir.path(), "areas/health.md", "");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");

        let folder_nodes: Vec<&GraphNode> = graph
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Folder)
            .collect();
        // Folder count follows distinct folders, not file count
        assert_eq!(folder_nodes.len(), 2);
        assert!(folder_nodes.iter().all(|n| n.weight == FOLDER_NODE_WEIGHT));
        assert!(folder_nodes.iter().any(|n| n.id == "folder:projects"));
        assert!(folder_nodes.iter().any(|n| n.id == "folder:areas"));

        let folder_edges = graph
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Folder)
            .count();
        assert_eq!(folder_edges, 3);
    }

    #[test]
    fn test_file_node_names_strip_extension() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "projects/alpha.md", "");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");
        let node = graph
            .nodes
            .iter()
            .find(|n| n.id == "projects/alpha.md")
            .expect("file node missing");
        assert_eq!(node.name, "alpha");
    }

    #[test]
    fn test_resolution_preference_order() {
        let dir = tempdir().expect("tempdir");
        // "B.md" at the root matches by name; "folder/B.md" only by path
        write_note(dir.path(), "B.md", "");
        write_note(dir.path(), "folder/B.md", "");
        write_note(dir.path(), "source.md", "[[folder/B]]");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");
        // Name rules fail for "folder/B"; path-with-extension resolves it
        assert_eq!(wiki_edges(&graph), vec![("source.md", "folder/B.md")]);
    }

    #[test]
    fn test_first_match_wins_for_ambiguous_names() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "areas/topic.md", "");
        write_note(dir.path(), "projects/topic.md", "");
        write_note(dir.path(), "source.md", "[[topic]]");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");
        // Listing is path-sorted, so areas/topic.md comes first
        assert_eq!(wiki_edges(&graph), vec![("source.md", "areas/topic.md")]);
    }

    #[test]
    fn test_name_with_extension_resolves() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "notes/B.md", "");
        write_note(dir.path(), "A.md", "[[B.md]]");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");
        assert_eq!(wiki_edges(&graph), vec![("A.md", "notes/B.md")]);
    }

    #[test]
    fn test_unreadable_file_keeps_node_without_outgoing_edges() {
        let dir = tempdir().expect("tempdir");
        write_note(dir.path(), "A.md", "Points at [[B]]");
        // Invalid UTF-8 makes the content read fail while the listing
        // still sees the file
        fs::write(dir.path().join("B.md"), [0x5b, 0x5b, 0xff, 0xfe, 0x5d, 0x5d])
            .expect("write note");

        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");

        assert!(graph
            .nodes
            .iter()
            .any(|n| n.id == "B.md" && n.kind == NodeKind::File));
        let wiki = wiki_edges(&graph);
        assert!(wiki.iter().all(|(source, _)| *source != "B.md"));
        // Inbound edges to the unreadable file survive
        assert_eq!(wiki, vec![("A.md", "B.md")]);
    }

    #[test]
    fn test_empty_vault_builds_empty_graph() {
        let dir = tempdir().expect("tempdir");
        let reader = VaultReader::new(dir.path());
        let graph = build_graph(&reader).expect("build failed");
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_edge_kind_serializes_with_hyphen() {
        assert_eq!(
            serde_json::to_string(&EdgeKind::WikiLink).unwrap(),
            "\"wiki-link\""
        );
        assert_eq!(serde_json::to_string(&EdgeKind::Folder).unwrap(), "\"folder\"");
    }
}
