//! Text embedding interface.
//!
//! Implementations convert text into fixed-dimension vectors by calling an
//! external provider. They must not retry or cache on their own - retry
//! policy belongs to the calling layer ([`crate::retry`]), and caching would
//! mask upstream content changes.
//!
//! # Failure contract
//!
//! - [`crate::Error::InvalidInput`] - empty text or text over the provider's
//!   input cap
//! - [`crate::Error::ProviderRateLimited`] - throttled; the caller may back
//!   off and retry
//! - [`crate::Error::ProviderUnavailable`] - transport/auth failure or an
//!   elapsed deadline

use async_trait::async_trait;

use crate::error::Result;

/// Converts text into fixed-dimension embedding vectors.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed a single search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of documents, one vector per input text, in order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The dimension of every vector this provider produces.
    fn dimension(&self) -> usize;
}
