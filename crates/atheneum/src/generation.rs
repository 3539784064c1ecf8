//! Text generation interface.
//!
//! The generation side of the model provider, kept as a separate seam from
//! [`crate::embeddings::Embeddings`] so QA can be wired against any
//! combination of embedding and generation backends. Same failure contract
//! as the embedding trait; no implicit retries, no caching.

use async_trait::async_trait;

use crate::error::Result;

/// Generates natural-language text from a prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Identifier of the underlying model, for logging and diagnostics.
    fn model_id(&self) -> &str;
}
