//! Deterministic stand-ins for the embedding provider and the language model.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use issue_scout_core::agent::LanguageModel;
use issue_scout_core::collection::CollectionHandle;
use issue_scout_core::embedding::EmbeddingProvider;
use issue_scout_core::models::IndexedDocument;
use issue_scout_core::store::memory::InMemoryStore;
use issue_scout_core::store::Store;

/// Maps text to (count of 'a', count of 'b', 1).
pub struct LetterEmbedder;

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    fn model_name(&self) -> &str {
        "letters"
    }
    fn dims(&self) -> usize {
        3
    }
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                vec![
                    t.matches('a').count() as f32,
                    t.matches('b').count() as f32,
                    1.0,
                ]
            })
            .collect())
    }
}

/// Every call fails, as an unreachable embedding server would.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing"
    }
    fn dims(&self) -> usize {
        3
    }
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow::anyhow!("connection refused").context("embedding request failed"))
    }
}

pub fn memory_store() -> Arc<dyn Store> {
    Arc::new(InMemoryStore::new())
}

pub async fn memory_handle(texts: &[&str]) -> CollectionHandle {
    let docs: Vec<IndexedDocument> = texts.iter().map(|t| IndexedDocument::from_text(*t)).collect();
    CollectionHandle::load(memory_store(), Arc::new(LetterEmbedder), "issues", &docs, 8)
        .await
        .unwrap()
}

/// A handle whose query embedding always fails.
pub fn failing_handle() -> CollectionHandle {
    CollectionHandle::connect(memory_store(), Arc::new(FailingEmbedder), "issues")
}

/// Replays canned outputs in order and keeps every prompt it was given.
pub struct ScriptedModel {
    outputs: Mutex<Vec<String>>,
    calls: Mutex<usize>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(outputs: &[&str]) -> Self {
        Self {
            outputs: Mutex::new(outputs.iter().rev().map(|s| s.to_string()).collect()),
            calls: Mutex::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, _stop: &[String]) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outputs
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))
    }
}
