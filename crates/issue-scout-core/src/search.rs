//! Similarity search over a collection.
//!
//! # Ordering
//!
//! Every backend scores with cosine distance (`1 - cosine similarity`).
//! Results are sorted by ascending distance, so rank 0 is the closest
//! document. There is no deduplication and no score threshold: the `k`
//! nearest documents are returned regardless of absolute relevance.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::collection::CollectionHandle;
use crate::embedding::embed_query;
use crate::models::StoredDocument;

/// One hit of a similarity search. Ephemeral, produced per query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub document: StoredDocument,
    /// Cosine distance to the query (smaller is more similar).
    pub score: f64,
}

/// Return at most `k` documents nearest to `query`, closest first.
///
/// `k` must be at least 1. An empty (whitespace-only) query returns no results
/// without calling the embedding provider.
pub async fn search(handle: &CollectionHandle, query: &str, k: usize) -> Result<Vec<SearchResult>> {
    if k == 0 {
        bail!("k must be >= 1");
    }
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let query_vec = embed_query(handle.embedder(), query).await?;
    let mut neighbors = handle.store().nearest(handle.name(), &query_vec, k).await?;
    neighbors.truncate(k);

    Ok(neighbors
        .into_iter()
        .map(|n| SearchResult {
            document: n.document,
            score: n.distance,
        })
        .collect())
}

impl CollectionHandle {
    /// Similarity search against this collection. See [`search`].
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        search(self, query, k).await
    }
}

/// Truncate `text` to at most `max_chars` characters, appending `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
