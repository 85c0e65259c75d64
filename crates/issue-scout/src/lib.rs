//! # Issue Scout
//!
//! **Ask natural-language questions about a repository's GitHub issues.**
//!
//! Issue Scout fetches a page of issues from the GitHub REST API, embeds
//! them with a local Ollama model into a SQLite-backed vector collection,
//! and answers questions with a ReAct agent that can search that collection
//! and save notes.
//!
//! ## Data Flow
//!
//! ```text
//! github ──▶ session (refresh) ──▶ collection (embed + store) ──▶ sqlite
//!                                                                   │
//! question ──▶ agent loop ──▶ tools::RetrievalTool ──▶ search ◀─────┘
//!                  │
//!                  └──▶ tools::NoteTool ──▶ notes.txt
//! ```
//!
//! 1. [`github`] fetches issues and normalizes them into
//!    [`issue_scout_core::models::Issue`] records.
//! 2. [`session::refresh_collection`] replaces the collection with the fresh
//!    issues, embedded by [`embedding::OllamaEmbedder`] and stored by
//!    [`sqlite_store::SqliteStore`].
//! 3. [`session::Session`] runs each question through the reasoning loop
//!    ([`issue_scout_core::agent::ReactAgent`]) driven by [`llm::OllamaModel`]
//!    and the tools in [`tools`].
//!
//! ## Configuration
//!
//! An optional TOML file ([`config`]) plus `DATABASE_URL` and `GITHUB_TOKEN`
//! from the environment or a `.env` file.

pub mod config;
pub mod db;
pub mod embedding;
pub mod github;
pub mod llm;
pub mod migrate;
pub mod session;
pub mod sqlite_store;
pub mod stats;
pub mod tools;

#[cfg(test)]
mod test_support;
