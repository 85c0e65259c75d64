//! The agent's tools: issue retrieval and note taking.
//!
//! Both tools report failures as observation text; nothing here returns an
//! error to the reasoning loop.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use issue_scout_core::agent::{ToolKind, ToolSpec, Toolset};
use issue_scout_core::collection::CollectionHandle;

pub const RETRIEVAL_DESCRIPTION: &str = "Search for information about github issues. For any questions about github issues, you must use this tool!";
pub const NOTE_DESCRIPTION: &str = "Saves a note to a local file for future reference.";

pub const NOTE_SAVED: &str = "Note has been saved successfully!";
pub const NO_MATCHES: &str = "No matching issues found.";

/// Similarity search over the session's collection with a fixed `k`.
pub struct RetrievalTool {
    handle: CollectionHandle,
    k: usize,
}

impl RetrievalTool {
    pub fn new(handle: CollectionHandle, k: usize) -> Self {
        Self { handle, k: k.max(1) }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Contents of the top hits separated by blank lines.
    pub async fn run(&self, query: &str) -> String {
        match self.handle.search(query, self.k).await {
            Ok(results) if results.is_empty() => NO_MATCHES.to_string(),
            Ok(results) => results
                .iter()
                .map(|r| r.document.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(e) => {
                warn!(error = %e, "retrieval tool search failed");
                format!("Search failed: {:#}", e)
            }
        }
    }
}

/// Appends notes to a text file, one `\n---\n<note>\n` entry per call.
pub struct NoteTool {
    path: PathBuf,
}

impl NoteTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a confirmation or a failure message; never panics or errors.
    pub fn save(&self, note: &str) -> String {
        match self.append(note) {
            Ok(()) => NOTE_SAVED.to_string(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to save note");
                format!("Failed to save note: {}", e)
            }
        }
    }

    fn append(&self, note: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write!(file, "\n---\n{}\n", note)?;
        file.flush()
    }
}

/// The toolset handed to the reasoning loop.
pub struct IssueTools {
    retrieval: RetrievalTool,
    notes: NoteTool,
}

impl IssueTools {
    pub fn new(retrieval: RetrievalTool, notes: NoteTool) -> Self {
        Self { retrieval, notes }
    }
}

#[async_trait]
impl Toolset for IssueTools {
    fn specs(&self) -> Vec<ToolSpec> {
        vec![
            ToolSpec {
                kind: ToolKind::GithubSearch,
                description: RETRIEVAL_DESCRIPTION.to_string(),
            },
            ToolSpec {
                kind: ToolKind::SaveNote,
                description: NOTE_DESCRIPTION.to_string(),
            },
        ]
    }

    async fn invoke(&self, kind: ToolKind, input: &str) -> String {
        match kind {
            ToolKind::GithubSearch => self.retrieval.run(input).await,
            ToolKind::SaveNote => self.notes.save(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{failing_handle, memory_handle};
    use tempfile::TempDir;

    #[test]
    fn test_note_append_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        let tool = NoteTool::new(&path);

        assert_eq!(tool.save("T"), NOTE_SAVED);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\n---\nT\n");

        assert_eq!(tool.save("U"), NOTE_SAVED);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "\n---\nT\n\n---\nU\n"
        );
    }

    #[test]
    fn test_note_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let tool = NoteTool::new(tmp.path().join("missing-dir").join("notes.txt"));
        let result = tool.save("T");
        assert!(result.starts_with("Failed to save note: "), "{}", result);
    }

    #[tokio::test]
    async fn test_retrieval_uses_fixed_k() {
        let tool = RetrievalTool::new(memory_handle(&["aaa", "aab", "bbb", "abb"]).await, 2);
        let out = tool.run("aaa").await;
        let hits: Vec<&str> = out.split("\n\n").collect();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], "aaa");
    }

    #[tokio::test]
    async fn test_retrieval_empty_collection() {
        let tool = RetrievalTool::new(memory_handle(&[]).await, 3);
        assert_eq!(tool.run("anything").await, NO_MATCHES);
    }

    #[tokio::test]
    async fn test_retrieval_failure_becomes_observation() {
        let tool = RetrievalTool::new(failing_handle(), 3);
        let out = tool.run("crash on start").await;
        assert!(out.starts_with("Search failed: "), "{}", out);
        assert!(out.contains("connection refused"), "{}", out);
    }

    #[tokio::test]
    async fn test_toolset_dispatch() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        let tools = IssueTools::new(
            RetrievalTool::new(memory_handle(&["aaa"]).await, 3),
            NoteTool::new(&path),
        );

        let specs = tools.specs();
        let names: Vec<&str> = specs.iter().map(|s| s.kind.name()).collect();
        assert_eq!(names, vec!["github_search", "note_tool"]);
        assert_eq!(
            specs[1].description,
            "Saves a note to a local file for future reference."
        );
        assert_eq!(tools.invoke(ToolKind::GithubSearch, "a").await, "aaa");
        assert_eq!(tools.invoke(ToolKind::SaveNote, "remember").await, NOTE_SAVED);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "\n---\nremember\n"
        );
    }
}
