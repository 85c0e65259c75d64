//! In-memory [`Store`] implementation for tests and ephemeral sessions.
//!
//! Uses a `HashMap` of collections behind `std::sync::RwLock`. Nearest
//! neighbour search is brute-force cosine distance over the collection.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::embedding::cosine_distance;
use crate::models::{IndexedDocument, StoredDocument};

use super::{Neighbor, Store};

struct StoredVector {
    document: StoredDocument,
    vector: Vec<f32>,
    _model: String,
}

/// In-memory store. Collections live as long as the value.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<StoredVector>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<StoredVector>>>> {
        self.collections
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<StoredVector>>>> {
        self.collections
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ensure_collection(&self, name: &str) -> Result<()> {
        self.write()?.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        Ok(self.write()?.remove(name).is_some())
    }

    async fn insert_documents(
        &self,
        collection: &str,
        docs: &[IndexedDocument],
        vectors: &[Vec<f32>],
        model: &str,
    ) -> Result<Vec<String>> {
        if docs.len() != vectors.len() {
            bail!(
                "got {} vectors for {} documents",
                vectors.len(),
                docs.len()
            );
        }
        let mut collections = self.write()?;
        let entries = collections.entry(collection.to_string()).or_default();
        let mut ids = Vec::with_capacity(docs.len());
        for (doc, vector) in docs.iter().zip(vectors) {
            let id = uuid::Uuid::new_v4().to_string();
            entries.push(StoredVector {
                document: StoredDocument {
                    id: id.clone(),
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                },
                vector: vector.clone(),
                _model: model.to_string(),
            });
            ids.push(id);
        }
        Ok(ids)
    }

    async fn count_documents(&self, collection: &str) -> Result<i64> {
        Ok(self
            .read()?
            .get(collection)
            .map(|entries| entries.len() as i64)
            .unwrap_or(0))
    }

    async fn nearest(
        &self,
        collection: &str,
        query_vec: &[f32],
        k: usize,
    ) -> Result<Vec<Neighbor>> {
        let collections = self.read()?;
        let entries = match collections.get(collection) {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };
        let mut neighbors: Vec<Neighbor> = entries
            .iter()
            .map(|sv| Neighbor {
                document: sv.document.clone(),
                distance: cosine_distance(query_vec, &sv.vector),
            })
            .collect();
        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_nearest_orders_by_distance() {
        let store = InMemoryStore::new();
        let docs = vec![
            IndexedDocument::from_text("far"),
            IndexedDocument::from_text("near"),
        ];
        store
            .insert_documents("c", &docs, &[vec![0.0, 1.0], vec![1.0, 0.1]], "m")
            .await
            .unwrap();
        let hits = store.nearest("c", &[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.content, "near");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.nearest("nope", &[1.0], 3).await.unwrap().is_empty());
        assert_eq!(store.count_documents("nope").await.unwrap(), 0);
        assert!(!store.delete_collection("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_vector_count_mismatch_rejected() {
        let store = InMemoryStore::new();
        let docs = vec![IndexedDocument::from_text("a")];
        assert!(store.insert_documents("c", &docs, &[], "m").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_collection() {
        let store = InMemoryStore::new();
        store
            .insert_documents("c", &[IndexedDocument::from_text("a")], &[vec![1.0]], "m")
            .await
            .unwrap();
        assert!(store.delete_collection("c").await.unwrap());
        assert_eq!(store.count_documents("c").await.unwrap(), 0);
    }
}
