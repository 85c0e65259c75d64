//! Closed set of capabilities the reasoning loop can invoke.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

/// Every tool the agent knows about. Model output naming anything else is
/// rejected before any tool runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Similarity search over the indexed issues.
    GithubSearch,
    /// Append a note to the local notes log.
    SaveNote,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::GithubSearch, ToolKind::SaveNote];

    /// The name the model must use in `Action:`.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::GithubSearch => "github_search",
            ToolKind::SaveNote => "note_tool",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| s.trim().to_string())
    }
}

/// A tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub kind: ToolKind,
    pub description: String,
}

/// The tools configured for one agent.
///
/// `invoke` never fails: tool errors are reported to the model as the
/// observation text so it can react to them.
#[async_trait]
pub trait Toolset: Send + Sync {
    /// Tools available to the model, in prompt order.
    fn specs(&self) -> Vec<ToolSpec>;

    /// Run a configured tool with the model-provided input.
    async fn invoke(&self, kind: ToolKind, input: &str) -> String;

    /// Whether `kind` is part of this toolset.
    fn provides(&self, kind: ToolKind) -> bool {
        self.specs().iter().any(|spec| spec.kind == kind)
    }
}
