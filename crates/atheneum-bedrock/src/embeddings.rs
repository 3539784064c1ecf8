//! Titan text embeddings over Bedrock.

use async_trait::async_trait;
use atheneum::config::env_vars::{env_string, BEDROCK_EMBED_MODEL_ID};
use atheneum::config::VectorConfig;
use atheneum::embeddings::Embeddings;
use atheneum::{Error, Result};
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use serde::{Deserialize, Serialize};

use crate::map_invoke_error;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = "amazon.titan-embed-text-v2:0";

/// Titan v2 rejects inputs beyond roughly 50k characters; larger texts are
/// refused locally as invalid input rather than round-tripped.
pub const MAX_INPUT_CHARS: usize = 50_000;

/// Titan embedding model integration.
///
/// The output dimension is taken from the [`VectorConfig`] the provider is
/// constructed with and sent with every request, so the provider can never
/// silently disagree with the store about D.
///
/// # Configuration
///
/// - Model id: `BEDROCK_EMBED_MODEL_ID` env var, or [`with_model`](Self::with_model)
/// - Region/credentials: the standard AWS configuration chain
pub struct TitanEmbeddings {
    client: Client,
    model_id: String,
    dimension: usize,
    normalize: bool,
}

impl TitanEmbeddings {
    /// Create a provider over an existing Bedrock client.
    #[must_use]
    pub fn new(client: Client, config: &VectorConfig) -> Self {
        Self {
            client,
            model_id: env_string(BEDROCK_EMBED_MODEL_ID)
                .unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string()),
            dimension: config.dimension,
            normalize: true,
        }
    }

    /// Create a provider from the default AWS configuration chain.
    pub async fn from_env(config: &VectorConfig) -> Self {
        Self::new(crate::client_from_env().await, config)
    }

    /// Override the model id.
    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Control whether Titan normalizes the returned vectors (default:
    /// true, which the cosine metric expects).
    #[must_use]
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// The configured model id.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Embed one text via `InvokeModel`.
    async fn invoke(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("cannot embed empty text"));
        }
        if text.len() > MAX_INPUT_CHARS {
            return Err(Error::invalid_input(format!(
                "input of {} chars exceeds the {MAX_INPUT_CHARS} char embedding limit",
                text.len()
            )));
        }

        let body = serde_json::to_vec(&TitanEmbedRequest {
            input_text: text,
            dimensions: self.dimension,
            normalize: self.normalize,
        })?;

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(map_invoke_error)?;

        let parsed: TitanEmbedResponse = serde_json::from_slice(response.body().as_ref())?;
        if parsed.embedding.is_empty() {
            return Err(Error::provider_unavailable(
                "Bedrock returned an empty embedding",
            ));
        }

        tracing::trace!(
            model = %self.model_id,
            chars = text.len(),
            dimension = parsed.embedding.len(),
            "embedded text"
        );
        Ok(parsed.embedding)
    }
}

#[async_trait]
impl Embeddings for TitanEmbeddings {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.invoke(text).await
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // Titan embeds one text per request.
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.invoke(text).await?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanEmbedRequest<'a> {
    input_text: &'a str,
    dimensions: usize,
    normalize: bool,
}

#[derive(Debug, Deserialize)]
struct TitanEmbedResponse {
    embedding: Vec<f32>,
}
