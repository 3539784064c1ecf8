//! Embedding-backed semantic search over the author catalog.
//!
//! [`RetrievalEngine`] turns a free-text query into an embedding, asks the
//! store for the k nearest records, converts raw distances into normalized
//! relevance scores, and filters by the caller's threshold. The store's
//! distance-ascending order is the authoritative rank: the engine never
//! re-sorts, and treats exactly equidistant records as interchangeable.
//!
//! An empty store and an all-below-threshold result are both ordinary empty
//! outcomes, not errors - a restrictive threshold is expected to produce
//! zero matches.

use std::sync::Arc;

use crate::authors::SearchResult;
use crate::config::{Timeouts, VectorConfig};
use crate::embeddings::Embeddings;
use crate::error::{Error, Result};
use crate::retry::with_timeout;
use crate::vector_stores::{verify_wiring, VectorStore};

/// Default number of results for a text search.
pub const DEFAULT_SEARCH_K: usize = 5;

/// Upper bound on requested results per search.
pub const MAX_SEARCH_K: usize = 50;

/// Default minimum relevance score a match must reach.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.3;

/// Parameters for a catalog search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Number of results to return (1 to [`MAX_SEARCH_K`])
    pub k: usize,
    /// Minimum normalized relevance score in [0, 1]
    pub score_threshold: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_SEARCH_K,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

impl SearchOptions {
    /// Set the number of results.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the minimum relevance score.
    #[must_use]
    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = score_threshold;
        self
    }
}

/// Orchestrates the embedding provider and the similarity store into ranked,
/// threshold-filtered search results.
pub struct RetrievalEngine {
    embeddings: Arc<dyn Embeddings>,
    store: Arc<dyn VectorStore>,
    config: VectorConfig,
    timeouts: Timeouts,
}

impl RetrievalEngine {
    /// Wire an engine together.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] when the provider or the store disagrees
    /// with `config.dimension`, and [`Error::Configuration`] on a metric
    /// mismatch. Dimension drift is rejected here rather than per request.
    pub fn new(
        embeddings: Arc<dyn Embeddings>,
        store: Arc<dyn VectorStore>,
        config: VectorConfig,
        timeouts: Timeouts,
    ) -> Result<Self> {
        verify_wiring(&config, embeddings.as_ref(), store.as_ref())?;
        Ok(Self {
            embeddings,
            store,
            config,
            timeouts,
        })
    }

    /// The dimension/metric configuration this engine was created with.
    #[must_use]
    pub fn config(&self) -> &VectorConfig {
        &self.config
    }

    /// Search the catalog for authors matching `query`.
    ///
    /// Returns at most `options.k` results, each with a relevance score of
    /// at least `options.score_threshold`, in non-increasing score order.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidQuery`] on blank query text or out-of-range options
    /// - [`Error::Retrieval`] wrapping the provider or storage failure
    /// - [`Error::DimensionMismatch`] on embedding-dimension drift
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(Error::invalid_query("query text must not be empty"));
        }
        if options.k < 1 || options.k > MAX_SEARCH_K {
            return Err(Error::invalid_query(format!(
                "top_k must be between 1 and {MAX_SEARCH_K}, got {}",
                options.k
            )));
        }
        if !(0.0..=1.0).contains(&options.score_threshold) {
            return Err(Error::invalid_query(format!(
                "similarity_threshold must be between 0.0 and 1.0, got {}",
                options.score_threshold
            )));
        }

        let vector = with_timeout(self.timeouts.embed, self.embeddings.embed_query(query))
            .await
            .map_err(wrap_retrieval)?;
        if vector.len() != self.config.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimension,
                actual: vector.len(),
            });
        }

        let neighbors = with_timeout(self.timeouts.query, self.store.nearest(&vector, options.k))
            .await
            .map_err(wrap_retrieval)?;

        // The store's distance-ascending order is the rank; converting to
        // scores and filtering must not reorder anything.
        let results: Vec<SearchResult> = neighbors
            .into_iter()
            .filter_map(|(record, distance)| {
                let score = self.config.metric.relevance_score(distance);
                (score >= options.score_threshold).then(|| SearchResult {
                    author: record.summary(),
                    score,
                })
            })
            .collect();

        tracing::debug!(
            k = options.k,
            score_threshold = options.score_threshold,
            matches = results.len(),
            "catalog search complete"
        );
        Ok(results)
    }
}

/// Provider and storage failures surface as retrieval failures; invariant
/// violations and caller errors pass through untouched.
fn wrap_retrieval(err: Error) -> Error {
    match err {
        passthrough @ (Error::DimensionMismatch { .. } | Error::InvalidQuery(_)) => passthrough,
        other => Error::Retrieval {
            source: Box::new(other),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::authors::{embedding_source_text, source_hash, AuthorFields, AuthorId, AuthorRecord};
    use crate::vector_stores::{DistanceMetric, InMemoryVectorStore};
    use async_trait::async_trait;
    use chrono::Utc;

    /// Embeds every text as the same fixed vector.
    struct FixedEmbeddings {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl Embeddings for FixedEmbeddings {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.vector.clone())
        }

        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.vector.clone()).collect())
        }

        fn dimension(&self) -> usize {
            self.vector.len()
        }
    }

    /// Always fails with the given error kind.
    struct FailingEmbeddings {
        rate_limited: bool,
    }

    #[async_trait]
    impl Embeddings for FailingEmbeddings {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
            if self.rate_limited {
                Err(Error::rate_limited("throttled"))
            } else {
                Err(Error::provider_unavailable("down"))
            }
        }

        async fn embed_documents(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.embed_query("").await.map(|v| vec![v])
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    fn config() -> VectorConfig {
        VectorConfig::new(3, DistanceMetric::Cosine).unwrap()
    }

    fn record(name: &str, embedding: Vec<f32>) -> AuthorRecord {
        let fields = AuthorFields {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            bio: format!("{name} writes books."),
            expertise: "fiction".to_string(),
        };
        let source_text = embedding_source_text(&fields);
        AuthorRecord {
            id: AuthorId::new(),
            source_hash: source_hash(&source_text),
            source_text,
            fields,
            embedding,
            version: 1,
            created_at: Utc::now(),
        }
    }

    async fn engine_with_records(records: Vec<AuthorRecord>) -> RetrievalEngine {
        let store = Arc::new(InMemoryVectorStore::new(config()));
        for record in &records {
            store.upsert(record).await.unwrap();
        }
        RetrievalEngine::new(
            Arc::new(FixedEmbeddings {
                vector: vec![1.0, 0.0, 0.0],
            }),
            store,
            config(),
            Timeouts::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn results_are_capped_filtered_and_ordered() {
        // Relevance under cosine: 0.9, 0.8, 0.5, 0.1 against [1, 0, 0].
        let engine = engine_with_records(vec![
            record("low", vec![-0.8, 0.6, 0.0]),
            record("best", vec![0.8, 0.6, 0.0]),
            record("good", vec![0.6, 0.8, 0.0]),
            record("mid", vec![0.0, 1.0, 0.0]),
        ])
        .await;

        let results = engine
            .search("query", &SearchOptions::default().with_k(3))
            .await
            .unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.author.name.as_str()).collect();
        assert_eq!(names, vec!["best", "good", "mid"]);
        assert!(results.iter().all(|r| r.score >= 0.3));
        assert!(results.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert!((results[0].score - 0.9).abs() < 1e-5);
        assert!((results[2].score - 0.5).abs() < 1e-5);
    }

    #[tokio::test]
    async fn empty_store_yields_empty_result() {
        let engine = engine_with_records(vec![]).await;
        let results = engine
            .search("anything", &SearchOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn threshold_one_without_perfect_match_yields_empty() {
        let engine = engine_with_records(vec![record("close", vec![0.8, 0.6, 0.0])]).await;
        let results = engine
            .search(
                "query",
                &SearchOptions::default().with_score_threshold(1.0),
            )
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn parameter_validation() {
        let engine = engine_with_records(vec![]).await;

        for (query, options) in [
            ("   ", SearchOptions::default()),
            ("q", SearchOptions::default().with_k(0)),
            ("q", SearchOptions::default().with_k(MAX_SEARCH_K + 1)),
            ("q", SearchOptions::default().with_score_threshold(1.5)),
            ("q", SearchOptions::default().with_score_threshold(-0.1)),
        ] {
            let result = engine.search(query, &options).await;
            assert!(
                matches!(result, Err(Error::InvalidQuery(_))),
                "expected InvalidQuery for {query:?} / {options:?}"
            );
        }
    }

    #[tokio::test]
    async fn provider_failures_wrap_as_retrieval() {
        let store = Arc::new(InMemoryVectorStore::new(config()));
        let engine = RetrievalEngine::new(
            Arc::new(FailingEmbeddings {
                rate_limited: false,
            }),
            store,
            config(),
            Timeouts::default(),
        )
        .unwrap();

        match engine.search("query", &SearchOptions::default()).await {
            Err(Error::Retrieval { source }) => {
                assert!(matches!(*source, Error::ProviderUnavailable(_)));
            }
            other => panic!("expected Retrieval error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_cause_stays_visible_through_wrapper() {
        let store = Arc::new(InMemoryVectorStore::new(config()));
        let engine = RetrievalEngine::new(
            Arc::new(FailingEmbeddings { rate_limited: true }),
            store,
            config(),
            Timeouts::default(),
        )
        .unwrap();

        let err = engine
            .search("query", &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn construction_rejects_dimension_drift() {
        let store = Arc::new(InMemoryVectorStore::new(config()));
        let result = RetrievalEngine::new(
            Arc::new(FixedEmbeddings {
                vector: vec![0.0; 8],
            }),
            store,
            config(),
            Timeouts::default(),
        );
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 8
            })
        ));
    }

    #[test]
    fn default_options_match_the_interface_contract() {
        let options = SearchOptions::default();
        assert_eq!(options.k, 5);
        assert!((options.score_threshold - 0.3).abs() < f32::EPSILON);
    }
}
