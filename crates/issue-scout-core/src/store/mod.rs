//! Storage abstraction for Issue Scout.
//!
//! The [`Store`] trait is the contract of the external vector database:
//! named collections of documents, each with an embedding vector, and
//! nearest-neighbour lookup by cosine distance. Backends: SQLite (app crate)
//! and [`memory::InMemoryStore`].
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{IndexedDocument, StoredDocument};

/// A stored document paired with its distance to the query vector.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub document: StoredDocument,
    /// Cosine distance to the query vector (smaller is closer).
    pub distance: f64,
}

/// Abstract vector store backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`ensure_collection`](Store::ensure_collection) | Create a collection if absent |
/// | [`delete_collection`](Store::delete_collection) | Drop a collection and its documents |
/// | [`insert_documents`](Store::insert_documents) | Append documents with their vectors |
/// | [`count_documents`](Store::count_documents) | Number of documents in a collection |
/// | [`nearest`](Store::nearest) | Top-k documents by ascending cosine distance |
#[async_trait]
pub trait Store: Send + Sync {
    /// Create the named collection if it does not exist yet.
    async fn ensure_collection(&self, name: &str) -> Result<()>;

    /// Delete the collection and all of its documents.
    ///
    /// Returns `true` if the collection existed.
    async fn delete_collection(&self, name: &str) -> Result<bool>;

    /// Append documents to a collection. `vectors[i]` belongs to `docs[i]`.
    ///
    /// Returns the generated document IDs in input order.
    async fn insert_documents(
        &self,
        collection: &str,
        docs: &[IndexedDocument],
        vectors: &[Vec<f32>],
        model: &str,
    ) -> Result<Vec<String>>;

    /// Number of documents stored in the collection (0 if it does not exist).
    async fn count_documents(&self, collection: &str) -> Result<i64>;

    /// Return at most `k` documents ordered by ascending cosine distance.
    ///
    /// Equal distances keep insertion order. A missing collection yields an
    /// empty result rather than an error.
    async fn nearest(&self, collection: &str, query_vec: &[f32], k: usize)
        -> Result<Vec<Neighbor>>;
}
