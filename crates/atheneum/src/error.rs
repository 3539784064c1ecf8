//! Error types for Atheneum operations
//!
//! The catalog chains two independent external services (a model provider
//! and a similarity store), so failures are typed by where they belong and
//! what the caller may do about them:
//!
//! - **Caller errors** (`InvalidQuery`, `InvalidInput`, `VersionConflict`,
//!   `NotFound`) - fix the request and resubmit; never retried.
//! - **Transient provider errors** (`ProviderUnavailable`,
//!   `ProviderRateLimited`) - only `ProviderRateLimited` is eligible for a
//!   bounded retry, and only through an explicit policy layer
//!   ([`crate::retry::with_retry`]); the core never retries on its own.
//! - **Invariant violations** (`DimensionMismatch`) - indicate embedding
//!   dimension drift. Always fatal; vectors are never silently truncated or
//!   padded.
//! - **Wrapped orchestration failures** (`Retrieval`, `AnswerGeneration`,
//!   `Creation`, `UpdateRejected`) - preserve the causing error as
//!   `#[source]` so callers can distinguish which stage of a chained
//!   operation failed. `AnswerGeneration` additionally carries the already
//!   retrieved context, because retrieval succeeding and generation failing
//!   is a partial success the caller may still want to surface.
//!
//! Nothing is swallowed: components wrap and propagate, they do not recover
//! locally.

use thiserror::Error;

use crate::authors::{AuthorId, SearchResult};

/// Result type alias for Atheneum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error category for systematic handling and reporting
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad request parameters or stale preconditions; fix and resubmit
    Validation,

    /// Transient provider/infrastructure trouble; may clear on its own
    Transient,

    /// Persistence-layer failures
    Storage,

    /// Internal invariant violations that need a code or deployment fix
    Internal,
}

impl ErrorCategory {
    /// Get a human-readable description of this category
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "Validation Error (caller must fix the request)",
            ErrorCategory::Transient => "Transient Provider/Infrastructure Issue",
            ErrorCategory::Storage => "Storage Error",
            ErrorCategory::Internal => "Internal Invariant Violation (needs fixing)",
        }
    }
}

/// Core error type for Atheneum operations.
///
/// Use [`Error::category()`] to decide on a recovery strategy and
/// [`Error::is_retryable()`] to gate the caller-side backoff policy.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Search/ask parameters out of range or empty query text.
    ///
    /// Caller error; never retried.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Text rejected before reaching the provider (empty, oversized, or
    /// otherwise unembeddable input).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A vector's length disagrees with the configured embedding dimension.
    ///
    /// Indicates embedding-dimension drift between provider, store, and
    /// configuration. Always fatal; no truncation or padding is attempted
    /// and no partial write occurs.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension every vector in the system must have
        expected: usize,
        /// Dimension actually observed
        actual: usize,
    },

    /// The model provider could not be reached or failed mid-call.
    ///
    /// Covers transport and auth failures as well as elapsed call deadlines.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The model provider throttled the request.
    ///
    /// The only error kind eligible for retry, via an explicit bounded
    /// backoff at the calling layer.
    #[error("provider rate limited: {0}")]
    ProviderRateLimited(String),

    /// Semantic search failed while embedding the query or querying the
    /// store.
    #[error("retrieval failed: {source}")]
    Retrieval {
        /// The provider or storage error that caused the failure
        #[source]
        source: Box<Error>,
    },

    /// Retrieval succeeded but answer generation failed.
    ///
    /// Carries the retrieved context so the caller can still surface the
    /// matching authors without the generated answer.
    #[error("answer generation failed: {source}")]
    AnswerGeneration {
        /// The provider error that caused the failure
        #[source]
        source: Box<Error>,
        /// Search results that had already been retrieved, in rank order
        context: Vec<SearchResult>,
    },

    /// Author creation failed before the record was persisted.
    ///
    /// Nothing was written; the caller must resubmit.
    #[error("author creation failed: {source}")]
    Creation {
        /// The embedding or storage error that caused the failure
        #[source]
        source: Box<Error>,
    },

    /// Author update rejected in full; stored fields and embedding are
    /// unchanged.
    #[error("author update rejected: {source}")]
    UpdateRejected {
        /// The embedding or storage error that caused the failure
        #[source]
        source: Box<Error>,
    },

    /// The author's stored version no longer matches the version the caller
    /// read; another update won the race.
    ///
    /// Reload the record and resubmit.
    #[error("author version changed since read (expected version {expected})")]
    VersionConflict {
        /// Version the caller supplied
        expected: i64,
    },

    /// No author with the given id exists.
    #[error("author not found: {0}")]
    NotFound(AuthorId),

    /// Persistence-layer failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Construction or configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Payload serialization/deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get the category of this error.
    ///
    /// Wrapper variants report the category of their cause.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidQuery(_)
            | Error::InvalidInput(_)
            | Error::VersionConflict { .. }
            | Error::NotFound(_)
            | Error::Configuration(_) => ErrorCategory::Validation,
            Error::ProviderUnavailable(_) | Error::ProviderRateLimited(_) => {
                ErrorCategory::Transient
            }
            Error::Storage(_) => ErrorCategory::Storage,
            Error::DimensionMismatch { .. } | Error::Serialization(_) => ErrorCategory::Internal,
            Error::Retrieval { source }
            | Error::AnswerGeneration { source, .. }
            | Error::Creation { source }
            | Error::UpdateRejected { source } => source.category(),
        }
    }

    /// Whether a caller-side backoff policy may retry this error.
    ///
    /// True only for [`Error::ProviderRateLimited`] (directly or as the
    /// cause of a wrapper variant); everything else must surface to the
    /// caller.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::ProviderRateLimited(_) => true,
            Error::Retrieval { source }
            | Error::AnswerGeneration { source, .. }
            | Error::Creation { source }
            | Error::UpdateRejected { source } => source.is_retryable(),
            _ => false,
        }
    }

    /// Create an invalid-query error
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-unavailable error
    pub fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create a rate-limited error
    pub fn rate_limited<S: Into<String>>(msg: S) -> Self {
        Self::ProviderRateLimited(msg.into())
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}
