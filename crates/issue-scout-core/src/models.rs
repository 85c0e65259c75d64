//! Core data models used throughout Issue Scout.
//!
//! An [`Issue`] is what the ingestor produces from the provider payload. It is
//! turned into an [`IndexedDocument`] (text content plus metadata) before it
//! is embedded and stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single issue as fetched from the provider. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number within the repository (e.g. `4821`).
    pub number: u64,
    pub title: String,
    /// Issue body; `None` when the provider returned `null`.
    pub body: Option<String>,
    /// Login of the user who opened the issue.
    pub author: String,
    /// Number of comments at fetch time.
    pub comments: u64,
    /// Label names, deduplicated, in provider order.
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// `"open"` or `"closed"`.
    pub state: String,
    /// Web-browsable URL of the issue.
    pub url: Option<String>,
}

impl Issue {
    /// Text that gets embedded: the title immediately followed by the body.
    ///
    /// No separator is inserted. An absent or empty body yields the title alone.
    pub fn content(&self) -> String {
        match self.body.as_deref() {
            Some(body) if !body.is_empty() => format!("{}{}", self.title, body),
            _ => self.title.clone(),
        }
    }

    /// Metadata stored alongside the embedded text.
    pub fn metadata(&self) -> IssueMetadata {
        IssueMetadata {
            number: Some(self.number),
            title: Some(self.title.clone()),
            url: self.url.clone(),
            state: Some(self.state.clone()),
            author: Some(self.author.clone()),
            comments: Some(self.comments),
            labels: self.labels.clone(),
            body: self.body.clone(),
            created_at: Some(self.created_at),
        }
    }

    /// Convert into the record handed to the document store.
    pub fn to_document(&self) -> IndexedDocument {
        IndexedDocument {
            content: self.content(),
            metadata: self.metadata(),
        }
    }
}

/// Metadata mapping carried by an [`IndexedDocument`].
///
/// Every field is optional on the read side so that rows written by older
/// schemas (or foreign loaders) still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A document as handed to the store: text content plus metadata.
///
/// Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub content: String,
    pub metadata: IssueMetadata,
}

impl IndexedDocument {
    /// Build a document with empty metadata (used by tests and ad-hoc loaders).
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: IssueMetadata::default(),
        }
    }
}

/// A document as read back from the store, with its storage identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    pub id: String,
    pub content: String,
    pub metadata: IssueMetadata,
}
