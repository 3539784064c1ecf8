//! AWS Bedrock integration for Atheneum.
//!
//! This crate provides the Bedrock-backed model provider: Titan text
//! embeddings and Nova text generation, invoked through
//! `aws-sdk-bedrockruntime`. Credentials and region come from the standard
//! AWS configuration chain (environment, profile, instance role), with
//! `AWS_REGION` falling back to `us-east-2` when unset.
//!
//! # Example
//!
//! ```rust,no_run
//! use atheneum::config::VectorConfig;
//! use atheneum::embeddings::Embeddings;
//! use atheneum_bedrock::TitanEmbeddings;
//!
//! # async fn example() -> atheneum::Result<()> {
//! let config = VectorConfig::default();
//! let embedder = TitanEmbeddings::from_env(&config).await;
//!
//! let vector = embedder.embed_query("authors who write about dystopias").await?;
//! assert_eq!(vector.len(), config.dimension);
//! # Ok(())
//! # }
//! ```
//!
//! Neither provider retries or caches: a throttled call surfaces as
//! [`atheneum::Error::ProviderRateLimited`] for the caller's retry policy
//! ([`atheneum::retry::with_retry`]) to handle.

use atheneum::Error;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;

mod embeddings;
mod generation;

pub use embeddings::{TitanEmbeddings, DEFAULT_EMBED_MODEL, MAX_INPUT_CHARS};
pub use generation::{NovaTextModel, DEFAULT_TEXT_MODEL};

/// Build a Bedrock runtime client from the default AWS configuration chain,
/// falling back to `us-east-2` when no region is configured.
pub async fn client_from_env() -> aws_sdk_bedrockruntime::Client {
    let region = aws_config::meta::region::RegionProviderChain::default_provider()
        .or_else(aws_config::Region::new(
            atheneum::config::env_vars::DEFAULT_AWS_REGION,
        ));
    let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region)
        .load()
        .await;
    aws_sdk_bedrockruntime::Client::new(&shared)
}

/// Classify an `InvokeModel` failure into the provider failure taxonomy:
/// throttling is retry-eligible, validation is a caller error, everything
/// else (transport, auth, SDK timeouts) reads as the provider being
/// unavailable.
pub(crate) fn map_invoke_error(err: SdkError<InvokeModelError>) -> Error {
    if let SdkError::ServiceError(ctx) = &err {
        let service = ctx.err();
        if service.is_throttling_exception() {
            return Error::rate_limited(format!("Bedrock throttled the request: {service}"));
        }
        if service.is_validation_exception() {
            return Error::invalid_input(format!("Bedrock rejected the request: {service}"));
        }
    }
    Error::provider_unavailable(format!(
        "Bedrock call failed: {}",
        DisplayErrorContext(&err)
    ))
}
