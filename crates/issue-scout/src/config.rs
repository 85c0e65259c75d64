//! Configuration: optional TOML file plus environment variables.
//!
//! Every section has defaults, so running without a config file works out
//! of the box. Secrets and the store connection string come from the
//! environment (a `.env` file is loaded first when present).

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use issue_scout_core::collection::{DEFAULT_BATCH_SIZE, DEFAULT_COLLECTION};

pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            repo: default_repo(),
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            per_page: default_per_page(),
            timeout_secs: default_github_timeout(),
        }
    }
}

fn default_owner() -> String {
    "langflow-ai".to_string()
}
fn default_repo() -> String {
    "langflow".to_string()
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_user_agent() -> String {
    "issue-scout".to_string()
}
fn default_per_page() -> u32 {
    30
}
fn default_github_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
        }
    }
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_ollama_url")]
    pub url: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_embedding_model(),
            dims: default_dims(),
            url: default_ollama_url(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}
fn default_embedding_model() -> String {
    "mxbai-embed-large:latest".to_string()
}
fn default_dims() -> usize {
    1024
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_max_retries() -> u32 {
    3
}
fn default_embedding_timeout() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_ollama_url")]
    pub url: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            url: default_ollama_url(),
            temperature: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_model() -> String {
    "llama3.1:latest".to_string()
}
fn default_llm_timeout() -> u64 {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,
    #[serde(default = "default_notes_path")]
    pub notes_path: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            retrieval_k: default_retrieval_k(),
            notes_path: default_notes_path(),
        }
    }
}

fn default_max_steps() -> usize {
    issue_scout_core::agent::DEFAULT_MAX_STEPS
}
fn default_retrieval_k() -> usize {
    3
}
fn default_notes_path() -> PathBuf {
    PathBuf::from("notes.txt")
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_probe_query")]
    pub probe_query: String,
    #[serde(default = "default_probe_k")]
    pub probe_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            probe_query: default_probe_query(),
            probe_k: default_probe_k(),
        }
    }
}

fn default_probe_query() -> String {
    "What are the issues related to Langflow crashing?".to_string()
}
fn default_probe_k() -> usize {
    2
}

/// Load configuration from `path`, or defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.github.owner.trim().is_empty() || config.github.repo.trim().is_empty() {
        bail!("github.owner and github.repo must not be empty");
    }
    if !(1..=100).contains(&config.github.per_page) {
        bail!("github.per_page must be in 1..=100");
    }
    if config.store.collection.trim().is_empty() {
        bail!("store.collection must not be empty");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "ollama" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be disabled or ollama.",
            other
        ),
    }
    if config.embedding.is_enabled() {
        if config.embedding.dims == 0 {
            bail!("embedding.dims must be > 0");
        }
        if config.embedding.model.trim().is_empty() {
            bail!("embedding.model must be specified");
        }
    }
    if config.embedding.batch_size == 0 {
        bail!("embedding.batch_size must be > 0");
    }

    if config.agent.max_steps == 0 {
        bail!("agent.max_steps must be >= 1");
    }
    if config.agent.retrieval_k == 0 {
        bail!("agent.retrieval_k must be >= 1");
    }
    if config.search.probe_k == 0 {
        bail!("search.probe_k must be >= 1");
    }

    Ok(())
}

/// Values read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub github_token: Option<String>,
    pub database_url: Option<String>,
}

impl Environment {
    /// Read the environment, loading `.env` first if one exists.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self {
            github_token: non_empty_var(GITHUB_TOKEN_VAR),
            database_url: non_empty_var(DATABASE_URL_VAR),
        }
    }

    pub fn require_database_url(&self) -> Result<&str> {
        match self.database_url.as_deref() {
            Some(url) => Ok(url),
            None => bail!("{} environment variable not found", DATABASE_URL_VAR),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
