//! Turning issue text into vectors, and comparing vectors.
//!
//! The Ollama-backed [`EmbeddingProvider`] lives in the `issue-scout` crate;
//! this module only holds the trait, the BLOB codec used by the SQLite
//! store, and the distance every store ranks by.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Embeds text with one fixed model.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model tag as the server knows it, e.g. `"mxbai-embed-large:latest"`.
    fn model_name(&self) -> &str;
    /// Length of every returned vector.
    fn dims(&self) -> usize;
    /// One vector per input, same order as `texts`.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embed a single query text.
pub async fn embed_query(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f32>> {
    provider
        .embed(&[text.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Empty embedding response"))
}

/// Pack a vector into the `documents.embedding` column, 4 little-endian
/// bytes per component.
///
/// ```rust
/// use issue_scout_core::embedding::{vec_to_blob, blob_to_vec};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12);
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Inverse of [`vec_to_blob`]. Trailing bytes that do not fill a whole
/// `f32` are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine of the angle between `a` and `b`.
///
/// `0.0` when the lengths differ or either vector is empty or all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, sq_a, sq_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, sq_a, sq_b), (x, y)| {
            (dot + x * y, sq_a + x * x, sq_b + y * y)
        });

    let norm = (sq_a * sq_b).sqrt();
    if norm < f32::EPSILON {
        0.0
    } else {
        dot / norm
    }
}

/// Cosine distance, `1 - cosine_similarity`, in `[0.0, 2.0]`.
///
/// This is the scoring metric of every store backend: smaller is closer.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b) as f64
}
