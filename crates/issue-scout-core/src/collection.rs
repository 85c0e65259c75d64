//! Document store adapter: named collections over a [`Store`] backend.
//!
//! A [`CollectionHandle`] binds a collection name to a store and the
//! embedding provider used for it. It is created once at startup by either
//! [`CollectionHandle::load`] (embed and insert documents) or
//! [`CollectionHandle::connect`] (attach without re-embedding), and then
//! passed explicitly to everything that searches.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::embedding::EmbeddingProvider;
use crate::models::IndexedDocument;
use crate::store::Store;

/// Default collection name.
pub const DEFAULT_COLLECTION: &str = "github_issues";

/// Default number of texts sent to the embedding provider per call.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Handle to one named collection. Cheap to clone.
#[derive(Clone)]
pub struct CollectionHandle {
    name: String,
    store: Arc<dyn Store>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl CollectionHandle {
    /// Embed `docs` and append them to the named collection, creating it if needed.
    ///
    /// Documents with empty content are skipped with a warning. Embedding
    /// happens in batches of `batch_size`; nothing is inserted unless every
    /// batch embedded successfully. Any embedding or store failure is
    /// returned to the caller.
    pub async fn load(
        store: Arc<dyn Store>,
        embedder: Arc<dyn EmbeddingProvider>,
        name: &str,
        docs: &[IndexedDocument],
        batch_size: usize,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            bail!("collection name must not be empty");
        }

        let docs: Vec<IndexedDocument> = docs
            .iter()
            .filter(|doc| {
                let keep = !doc.content.trim().is_empty();
                if !keep {
                    warn!(
                        number = ?doc.metadata.number,
                        "skipping document with empty content"
                    );
                }
                keep
            })
            .cloned()
            .collect();

        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(docs.len());
        for batch in docs.chunks(batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let embedded = embedder
                .embed(&texts)
                .await
                .with_context(|| format!("embedding failed for collection '{}'", name))?;
            if embedded.len() != batch.len() {
                bail!(
                    "embedding provider returned {} vectors for {} texts",
                    embedded.len(),
                    batch.len()
                );
            }
            vectors.extend(embedded);
        }

        if let Some(v) = vectors.iter().find(|v| v.len() != embedder.dims()) {
            warn!(
                expected = embedder.dims(),
                actual = v.len(),
                model = embedder.model_name(),
                "embedding dimension differs from configured dims"
            );
        }

        store.ensure_collection(name).await?;
        store
            .insert_documents(name, &docs, &vectors, embedder.model_name())
            .await
            .with_context(|| format!("failed to store documents in collection '{}'", name))?;

        info!(
            collection = name,
            documents = docs.len(),
            model = embedder.model_name(),
            "loaded documents into collection"
        );

        Ok(Self::connect(store, embedder, name))
    }

    /// Attach to an existing collection without embedding anything.
    ///
    /// The collection is not checked for existence: searching a missing
    /// collection yields no results.
    pub fn connect(
        store: Arc<dyn Store>,
        embedder: Arc<dyn EmbeddingProvider>,
        name: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            store,
            embedder,
        }
    }

    /// Drop a collection and its documents. Returns whether it existed.
    pub async fn delete(store: &dyn Store, name: &str) -> Result<bool> {
        store.delete_collection(name).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Number of documents currently stored in the collection.
    pub async fn count(&self) -> Result<i64> {
        self.store.count_documents(&self.name).await
    }
}

impl std::fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("name", &self.name)
            .field("model", &self.embedder.model_name())
            .finish()
    }
}
