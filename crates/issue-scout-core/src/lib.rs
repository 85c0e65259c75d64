//! # Issue Scout Core
//!
//! Runtime-free logic for Issue Scout: issue models, the store abstraction,
//! similarity search over a collection, and the ReAct reasoning loop.
//!
//! This crate contains no sqlx, HTTP client, or filesystem I/O. Concrete
//! stores, embedding providers, and language models live in the
//! `issue-scout` application crate and plug in through the traits defined
//! here ([`store::Store`], [`embedding::EmbeddingProvider`],
//! [`agent::LanguageModel`], [`agent::Toolset`]).

pub mod agent;
pub mod collection;
pub mod embedding;
pub mod models;
pub mod search;
pub mod store;
