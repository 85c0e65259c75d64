//! Session controller: startup decision, probe search, and the question loop.
//!
//! All session state (the collection handle, the agent, the tools) is owned
//! by a [`Session`] value and passed explicitly; there are no globals.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};

use issue_scout_core::agent::{AgentAnswer, AgentError, LanguageModel, ReactAgent};
use issue_scout_core::collection::CollectionHandle;
use issue_scout_core::embedding::EmbeddingProvider;
use issue_scout_core::models::{Issue, IndexedDocument};
use issue_scout_core::search::{preview, SearchResult};
use issue_scout_core::store::Store;

use crate::config::{AgentConfig, Config};
use crate::github::GithubClient;
use crate::tools::{IssueTools, NoteTool, RetrievalTool};

const PREVIEW_CHARS: usize = 200;

/// Ask until the user answers yes or no. End of input counts as "no".
pub fn ask_yes_no<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<bool> {
    loop {
        write!(out, "{} (yes/no): ", prompt)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(false);
        }
        match line.trim().to_lowercase().as_str() {
            "yes" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => writeln!(out, "Please enter 'yes' or 'no'")?,
        }
    }
}

/// Replace the collection with `issues`, or keep it when nothing was fetched.
///
/// The existing collection is only deleted once there is something to load
/// in its place.
pub async fn refresh_collection<W: Write>(
    store: Arc<dyn Store>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: &Config,
    issues: &[Issue],
    out: &mut W,
) -> Result<CollectionHandle> {
    let name = config.store.collection.as_str();

    if issues.is_empty() {
        writeln!(out, "No issues fetched from GitHub; keeping the existing collection.")?;
        return Ok(CollectionHandle::connect(store, embedder, name));
    }

    writeln!(out, "Fetched {} issues.", issues.len())?;
    if CollectionHandle::delete(store.as_ref(), name).await? {
        writeln!(out, "Deleted existing collection '{}'.", name)?;
    }

    let docs: Vec<IndexedDocument> = issues.iter().map(Issue::to_document).collect();
    let handle =
        CollectionHandle::load(store, embedder, name, &docs, config.embedding.batch_size).await?;
    writeln!(out, "Loaded {} issues into '{}'.", docs.len(), name)?;
    Ok(handle)
}

/// Fetch the configured repository's issues and refresh the collection.
pub async fn fetch_and_refresh<W: Write>(
    github: &GithubClient,
    token: Option<&str>,
    store: Arc<dyn Store>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: &Config,
    out: &mut W,
) -> Result<CollectionHandle> {
    writeln!(
        out,
        "Fetching issues from {}/{}...",
        config.github.owner, config.github.repo
    )?;
    let issues = github
        .fetch_issues(&config.github.owner, &config.github.repo, token)
        .await;
    refresh_collection(store, embedder, config, &issues, out).await
}

/// Print search hits with score, title, URL, state, created date and a preview.
pub fn print_results<W: Write>(out: &mut W, results: &[SearchResult]) -> std::io::Result<()> {
    if results.is_empty() {
        writeln!(out, "No results.")?;
    }
    for result in results {
        let meta = &result.document.metadata;
        writeln!(out, "\n-------------------")?;
        writeln!(out, "Score: {:.4}", result.score)?;
        writeln!(out, "Title: {}", meta.title.as_deref().unwrap_or("N/A"))?;
        writeln!(out, "URL: {}", meta.url.as_deref().unwrap_or("N/A"))?;
        writeln!(out, "State: {}", meta.state.as_deref().unwrap_or("N/A"))?;
        writeln!(
            out,
            "Created: {}",
            meta.created_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string())
        )?;
        writeln!(
            out,
            "Content Preview: {}",
            preview(&result.document.content, PREVIEW_CHARS)
        )?;
    }
    Ok(())
}

/// Run a search and print the hits. Failures are reported, never returned.
pub async fn probe_search<W: Write>(
    handle: &CollectionHandle,
    query: &str,
    k: usize,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "\nSearching for: '{}' (top {})", query, k)?;
    match handle.search(query, k).await {
        Ok(results) => print_results(out, &results)?,
        Err(e) => {
            warn!(error = %e, "probe search failed");
            writeln!(out, "Probe search failed: {:#}", e)?;
        }
    }
    Ok(())
}

/// One interactive session over a prepared collection.
pub struct Session<M> {
    agent: ReactAgent<M, IssueTools>,
}

impl<M: LanguageModel> Session<M> {
    pub fn new(model: M, handle: CollectionHandle, config: &AgentConfig) -> Self {
        let tools = IssueTools::new(
            RetrievalTool::new(handle, config.retrieval_k),
            NoteTool::new(&config.notes_path),
        );
        Self {
            agent: ReactAgent::new(model, tools).with_max_steps(config.max_steps),
        }
    }

    pub fn agent(&self) -> &ReactAgent<M, IssueTools> {
        &self.agent
    }

    /// Answer one question with a fresh transcript.
    pub async fn ask(&self, question: &str) -> Result<AgentAnswer, AgentError> {
        info!(question, "answering question");
        let answer = self.agent.run(question).await?;
        for (i, step) in answer.transcript.steps.iter().enumerate() {
            debug!(
                step = i + 1,
                thought = %step.thought,
                action = %step.action,
                input = %step.action_input,
                observation = %preview(&step.observation, PREVIEW_CHARS),
                "transcript"
            );
        }
        Ok(answer)
    }

    /// Read questions until `q` or end of input. A failed question is
    /// reported and the loop moves on.
    pub async fn run_repl<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<()> {
        loop {
            write!(out, "\nAsk a question about github issues (q to quit): ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }
            let question = line.trim();
            if question == "q" {
                break;
            }
            if question.is_empty() {
                continue;
            }

            match self.ask(question).await {
                Ok(answer) => writeln!(out, "{}", answer.answer)?,
                Err(e) => {
                    warn!(error = %e, "question failed");
                    writeln!(out, "An error occurred: {}", e)?;
                }
            }
        }
        Ok(())
    }
}
