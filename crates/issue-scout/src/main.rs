//! # Issue Scout CLI (`scout`)
//!
//! ## Usage
//!
//! ```bash
//! scout [--config ./scout.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scout chat` | Interactive session (default): refresh-or-reuse prompt, probe search, question loop |
//! | `scout fetch` | Fetch issues and replace the collection |
//! | `scout search "<query>"` | Similarity search over the collection |
//! | `scout ask "<question>"` | Answer a single question with the agent |
//! | `scout init` | Create the database schema |
//! | `scout stats` | Show the collection and its document count |
//!
//! `DATABASE_URL` must be set (environment or `.env`); `GITHUB_TOKEN` is
//! optional but raises the GitHub rate limit.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use issue_scout::config::{self, Config, Environment};
use issue_scout::embedding::create_provider;
use issue_scout::github::GithubClient;
use issue_scout::llm::OllamaModel;
use issue_scout::session::{self, Session};
use issue_scout::sqlite_store::SqliteStore;
use issue_scout::{db, stats};
use issue_scout_core::collection::CollectionHandle;
use issue_scout_core::embedding::EmbeddingProvider;
use issue_scout_core::store::Store;

const DEFAULT_LOG_FILTER: &str = "warn,issue_scout=info,issue_scout_core=info";

/// Issue Scout: ask questions about a repository's GitHub issues.
#[derive(Parser)]
#[command(
    name = "scout",
    about = "Ask natural-language questions about a repository's GitHub issues",
    version,
    long_about = "Issue Scout fetches GitHub issues, embeds them into a local vector \
    collection with Ollama, and answers questions with a ReAct agent that can search \
    the collection and save notes."
)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive question session.
    ///
    /// Without flags, asks whether to fetch fresh issues first.
    Chat {
        /// Fetch fresh issues and replace the collection without asking.
        #[arg(long, conflicts_with = "reuse")]
        refresh: bool,

        /// Use the existing collection without asking.
        #[arg(long)]
        reuse: bool,
    },

    /// Fetch issues from GitHub and replace the collection.
    Fetch {
        /// Repository owner (defaults to `github.owner`).
        #[arg(long)]
        owner: Option<String>,

        /// Repository name (defaults to `github.repo`).
        #[arg(long)]
        repo: Option<String>,
    },

    /// Similarity search over the indexed issues.
    Search {
        query: String,

        /// Number of results (defaults to `search.probe_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Answer one question and exit.
    Ask { question: String },

    /// Initialize the database schema. Idempotent.
    Init,

    /// Show collection statistics.
    Stats,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn open_store(env: &Environment) -> Result<Arc<dyn Store>> {
    let pool = db::open(env.require_database_url()?).await?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut cfg = config::load_config(cli.config.as_deref())?;
    let env = Environment::load();
    let mut stdout = std::io::stdout();

    let command = cli.command.unwrap_or(Commands::Chat {
        refresh: false,
        reuse: false,
    });

    match command {
        Commands::Init => {
            open_store(&env).await?;
            println!("Database initialized successfully.");
        }
        Commands::Stats => {
            let store = open_store(&env).await?;
            stats::run_stats(store.as_ref(), &cfg, &mut stdout).await?;
        }
        Commands::Fetch { owner, repo } => {
            if let Some(owner) = owner {
                cfg.github.owner = owner;
            }
            if let Some(repo) = repo {
                cfg.github.repo = repo;
            }
            let store = open_store(&env).await?;
            let embedder = create_provider(&cfg.embedding)?;
            let github = GithubClient::new(&cfg.github)?;
            session::fetch_and_refresh(
                &github,
                env.github_token.as_deref(),
                store,
                embedder,
                &cfg,
                &mut stdout,
            )
            .await?;
        }
        Commands::Search { query, k } => {
            let handle = connect(&env, &cfg).await?;
            let results = handle.search(&query, k.unwrap_or(cfg.search.probe_k)).await?;
            session::print_results(&mut stdout, &results)?;
        }
        Commands::Ask { question } => {
            let handle = connect(&env, &cfg).await?;
            let session = Session::new(OllamaModel::new(&cfg.llm)?, handle, &cfg.agent);
            let answer = session.ask(&question).await?;
            println!("{}", answer.answer);
        }
        Commands::Chat { refresh, reuse } => {
            run_chat(&cfg, &env, refresh, reuse).await?;
        }
    }

    Ok(())
}

async fn connect(env: &Environment, cfg: &Config) -> Result<CollectionHandle> {
    let store = open_store(env).await?;
    let embedder = create_provider(&cfg.embedding)?;
    Ok(CollectionHandle::connect(
        store,
        embedder,
        &cfg.store.collection,
    ))
}

async fn run_chat(cfg: &Config, env: &Environment, refresh: bool, reuse: bool) -> Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();

    writeln!(stdout, "Initializing vector store...")?;
    let store = open_store(env).await?;
    let embedder: Arc<dyn EmbeddingProvider> = create_provider(&cfg.embedding)?;

    let fetch = if refresh {
        true
    } else if reuse {
        false
    } else {
        session::ask_yes_no(
            &mut input,
            &mut stdout,
            "\nDo you want to fetch new issues from GitHub?",
        )?
    };

    let handle = if fetch {
        let github = GithubClient::new(&cfg.github)?;
        session::fetch_and_refresh(
            &github,
            env.github_token.as_deref(),
            store,
            embedder,
            cfg,
            &mut stdout,
        )
        .await?
    } else {
        writeln!(stdout, "Using existing issues from '{}'.", cfg.store.collection)?;
        CollectionHandle::connect(store, embedder, &cfg.store.collection)
    };

    session::probe_search(&handle, &cfg.search.probe_query, cfg.search.probe_k, &mut stdout)
        .await?;

    writeln!(stdout, "\nInitializing {}...", cfg.llm.model)?;
    let session = Session::new(OllamaModel::new(&cfg.llm)?, handle, &cfg.agent);
    writeln!(stdout, "Ready to answer questions about GitHub issues.")?;

    session.run_repl(&mut input, &mut stdout).await
}
