//! SQLite-backed [`Store`] implementation.
//!
//! Documents and their embedding BLOBs live in one `documents` table keyed
//! by collection. Nearest-neighbour lookup loads the collection's vectors
//! and ranks them in Rust by cosine distance.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::warn;

use issue_scout_core::embedding::{blob_to_vec, cosine_distance, vec_to_blob};
use issue_scout_core::models::{IndexedDocument, IssueMetadata, StoredDocument};
use issue_scout_core::store::{Neighbor, Store};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ensure_collection(&self, name: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO collections (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM documents WHERE collection = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM collections WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
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

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR IGNORE INTO collections (name, created_at) VALUES (?, ?)")
            .bind(collection)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let mut ids = Vec::with_capacity(docs.len());

        for (doc, vector) in docs.iter().zip(vectors) {
            let id = uuid::Uuid::new_v4().to_string();
            let metadata_json = serde_json::to_string(&doc.metadata)?;
            sqlx::query(
                r#"
                INSERT INTO documents (id, collection, content, metadata_json,
                                       embedding, model, dims, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(collection)
            .bind(&doc.content)
            .bind(&metadata_json)
            .bind(vec_to_blob(vector))
            .bind(model)
            .bind(vector.len() as i64)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn count_documents(&self, collection: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn nearest(
        &self,
        collection: &str,
        query_vec: &[f32],
        k: usize,
    ) -> Result<Vec<Neighbor>> {
        let rows = sqlx::query(
            r#"
            SELECT id, content, metadata_json, embedding
            FROM documents
            WHERE collection = ?
            ORDER BY rowid
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        let mut neighbors: Vec<Neighbor> = rows
            .iter()
            .map(|row| {
                let id: String = row.get("id");
                let blob: Vec<u8> = row.get("embedding");
                let metadata_json: String = row.get("metadata_json");
                let metadata: IssueMetadata = match serde_json::from_str(&metadata_json) {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(id = %id, error = %e, "unreadable document metadata, using empty");
                        IssueMetadata::default()
                    }
                };
                Neighbor {
                    document: StoredDocument {
                        id,
                        content: row.get("content"),
                        metadata,
                    },
                    distance: cosine_distance(query_vec, &blob_to_vec(&blob)),
                }
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
    use crate::db;
    use tempfile::TempDir;

    async fn store() -> (TempDir, SqliteStore) {
        let tmp = TempDir::new().unwrap();
        let url = format!("sqlite://{}", tmp.path().join("store.sqlite").display());
        let pool = db::open(&url).await.unwrap();
        (tmp, SqliteStore::new(pool))
    }

    fn doc(text: &str, number: u64) -> IndexedDocument {
        let mut doc = IndexedDocument::from_text(text);
        doc.metadata.number = Some(number);
        doc.metadata.title = Some(format!("Issue {}", number));
        doc.metadata.labels = vec!["bug".into()];
        doc
    }

    #[tokio::test]
    async fn test_insert_and_nearest() {
        let (_tmp, store) = store().await;
        store.ensure_collection("issues").await.unwrap();
        store
            .insert_documents(
                "issues",
                &[doc("a", 1), doc("b", 2), doc("c", 3)],
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
                "stub",
            )
            .await
            .unwrap();

        let hits = store.nearest("issues", &[0.0, 1.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.content, "b");
        assert_eq!(hits[0].document.metadata.number, Some(2));
        assert_eq!(hits[0].document.metadata.labels, vec!["bug"]);
        assert_eq!(hits[1].document.content, "c");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let (_tmp, store) = store().await;
        store
            .insert_documents(
                "issues",
                &[doc("first", 1), doc("second", 2)],
                &[vec![1.0, 0.0], vec![1.0, 0.0]],
                "stub",
            )
            .await
            .unwrap();
        let hits = store.nearest("issues", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits[0].document.content, "first");
        assert_eq!(hits[1].document.content, "second");
    }

    #[tokio::test]
    async fn test_corrupt_metadata_falls_back_to_empty() {
        let (_tmp, store) = store().await;
        store
            .insert_documents("issues", &[doc("a", 1)], &[vec![1.0, 0.0]], "stub")
            .await
            .unwrap();
        sqlx::query("UPDATE documents SET metadata_json = '{not json' WHERE collection = ?")
            .bind("issues")
            .execute(&store.pool)
            .await
            .unwrap();

        let hits = store.nearest("issues", &[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].document.content, "a");
        assert_eq!(hits[0].document.metadata.number, None);
        assert!(hits[0].document.metadata.labels.is_empty());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let (_tmp, store) = store().await;
        store
            .insert_documents("a", &[doc("x", 1)], &[vec![1.0]], "stub")
            .await
            .unwrap();
        assert_eq!(store.count_documents("a").await.unwrap(), 1);
        assert_eq!(store.count_documents("b").await.unwrap(), 0);
        assert!(store.nearest("b", &[1.0], 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_collection() {
        let (_tmp, store) = store().await;
        store.ensure_collection("issues").await.unwrap();
        store
            .insert_documents("issues", &[doc("x", 1)], &[vec![1.0]], "stub")
            .await
            .unwrap();

        assert!(store.delete_collection("issues").await.unwrap());
        assert_eq!(store.count_documents("issues").await.unwrap(), 0);
        assert!(!store.delete_collection("issues").await.unwrap());
    }

    #[tokio::test]
    async fn test_vector_count_mismatch_rejected() {
        let (_tmp, store) = store().await;
        let err = store
            .insert_documents("issues", &[doc("x", 1)], &[], "stub")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("vectors"));
        assert_eq!(store.count_documents("issues").await.unwrap(), 0);
    }
}
