//! Explicit configuration for embedding dimension, distance metric, and
//! call deadlines.
//!
//! [`VectorConfig`] is an immutable value handed to the retrieval engine,
//! the catalog repository, and every store at construction. Components never
//! read the dimension or metric from ambient global state, so tests can
//! exercise several dimensions and metrics side by side.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::vector_stores::DistanceMetric;

/// Embedding dimension of the default provider model
/// (amazon.titan-embed-text-v2:0).
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1024;

/// Embedding dimension and distance metric shared by every vector in the
/// system.
///
/// All stored entities and all queries must agree on the dimension, or
/// similarity comparisons are meaningless; components reject disagreement
/// with [`Error::DimensionMismatch`] at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Fixed embedding dimension D
    pub dimension: usize,
    /// Distance metric the store searches with
    pub metric: DistanceMetric,
}

impl VectorConfig {
    /// Create a configuration, rejecting a zero dimension.
    pub fn new(dimension: usize, metric: DistanceMetric) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::config("embedding dimension must be at least 1"));
        }
        Ok(Self { dimension, metric })
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            metric: DistanceMetric::Cosine,
        }
    }
}

/// Caller-enforced deadlines for external calls, one per suspension point.
///
/// These are distinct from any timeout the provider applies on its side; an
/// elapsed deadline surfaces as [`Error::ProviderUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Deadline for embedding calls
    pub embed: Duration,
    /// Deadline for text-generation calls
    pub generate: Duration,
    /// Deadline for similarity-store queries and writes
    pub query: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            embed: Duration::from_secs(10),
            generate: Duration::from_secs(30),
            query: Duration::from_secs(10),
        }
    }
}

/// Environment variable names and helpers shared by the provider crates.
pub mod env_vars {
    /// AWS region to reach Bedrock in
    pub const AWS_REGION: &str = "AWS_REGION";

    /// Fallback region when `AWS_REGION` is unset
    pub const DEFAULT_AWS_REGION: &str = "us-east-2";

    /// Override for the text-generation model id
    pub const BEDROCK_MODEL_ID: &str = "BEDROCK_MODEL_ID";

    /// Override for the embedding model id
    pub const BEDROCK_EMBED_MODEL_ID: &str = "BEDROCK_EMBED_MODEL_ID";

    /// PostgreSQL connection string for the pgvector store
    pub const DATABASE_URL: &str = "DATABASE_URL";

    /// Read an environment variable, treating unset and blank the same.
    #[must_use]
    pub fn env_string(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}
