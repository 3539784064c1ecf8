//! Core abstractions for Atheneum
//!
//! Atheneum keeps a small catalog of author profiles, each augmented with a
//! text embedding, and answers two kinds of requests on top of it:
//!
//! - **Semantic search**: turn a free-text query into an embedding, run a
//!   k-nearest-neighbors query against the similarity store, and return the
//!   matching authors ranked by a normalized relevance score.
//! - **Grounded question answering**: retrieve matching authors first, then
//!   generate a natural-language answer that is constrained to the retrieved
//!   profiles (retrieval-augmented generation).
//!
//! # Core Concepts
//!
//! ## Trait seams
//!
//! The [`embeddings::Embeddings`] and [`generation::LanguageModel`] traits
//! describe the external model provider; [`vector_stores::VectorStore`]
//! describes the similarity-searchable store. Concrete implementations live
//! in the companion crates (`atheneum-bedrock`, `atheneum-pgvector`), while
//! [`vector_stores::InMemoryVectorStore`] backs tests and prototyping.
//!
//! ## Orchestration
//!
//! [`retrieval::RetrievalEngine`] chains embedding and k-NN lookup into
//! threshold-filtered search results. [`qa::AuthorQa`] feeds those results
//! into a generation prompt and pairs the answer with the exact context used.
//! [`catalog::CatalogRepository`] owns author persistence and keeps stored
//! embeddings in sync with the fields they were derived from.
//!
//! ## Configuration
//!
//! The embedding dimension and distance metric are carried explicitly in
//! [`config::VectorConfig`] and handed to every component at construction;
//! nothing reads them from ambient global state.
//!
//! # Module Overview
//!
//! - [`authors`] - Author records, search results, source-text derivation
//! - [`embeddings`] - Text embedding interface
//! - [`generation`] - Text generation interface
//! - [`vector_stores`] - Similarity store trait, distance metrics, in-memory store
//! - [`retrieval`] - Embedding-backed search over the catalog
//! - [`qa`] - Retrieval-grounded question answering
//! - [`catalog`] - Author CRUD with embedding freshness and versioned updates
//! - [`config`] - Explicit dimension/metric configuration and call deadlines
//! - [`retry`] - Caller-side retry policy and timeout helpers
//! - [`error`] - Error types and handling

pub mod authors;
pub mod catalog;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod qa;
pub mod retrieval;
pub mod retry;
pub mod vector_stores;

pub use error::{Error, Result};
