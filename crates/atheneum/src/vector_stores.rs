//! Similarity stores for embedded author records.
//!
//! A vector store persists author records together with their embedding and
//! answers "k nearest by distance" queries. Stores return **raw** distances,
//! ascending; converting a distance into the normalized [0, 1] relevance
//! score is owned by [`DistanceMetric::relevance_score`] so the mapping is
//! identical for every caller and every call.
//!
//! # Core Concepts
//!
//! - **Vector Store**: storage and k-NN retrieval of embedded records
//! - **Distance Metrics**: cosine, euclidean, and (negated) inner product,
//!   matching the operators of pgvector-style stores
//! - **Tie-break**: equidistant records keep the store's natural insertion
//!   order; callers treat ties as interchangeable and never re-sort

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::authors::{AuthorId, AuthorRecord};
use crate::config::VectorConfig;
use crate::embeddings::Embeddings;
use crate::error::{Error, Result};

/// Distance metric used for vector similarity calculation.
///
/// - **Cosine**: best for normalized embeddings; distance in [0, 2]
/// - **Euclidean**: L2 norm; distance in [0, inf)
/// - **`DotProduct`**: negated inner product, the convention pgvector's
///   `<#>` operator returns; lower (more negative) is more similar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Cosine distance: `1 - cos(a, b)`, in [0, 2]
    Cosine,
    /// Euclidean (L2) distance, in [0, inf)
    Euclidean,
    /// Negated inner product: `-dot(a, b)`
    DotProduct,
}

impl DistanceMetric {
    /// Calculate the raw distance between two vectors.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the vectors differ in length.
    pub fn calculate(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(Error::DimensionMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }

        match self {
            DistanceMetric::Cosine => Ok(Self::cosine_distance(a, b)),
            DistanceMetric::Euclidean => Ok(Self::euclidean_distance(a, b)),
            DistanceMetric::DotProduct => Ok(-Self::dot_product(a, b)),
        }
    }

    /// Convert a raw distance into a normalized relevance score in [0, 1],
    /// higher = more similar.
    ///
    /// The mapping is monotonically decreasing in the distance for every
    /// metric, so store rank order and score order always agree.
    #[must_use]
    pub fn relevance_score(&self, distance: f32) -> f32 {
        match self {
            // Cosine distance is [0, 2]
            DistanceMetric::Cosine => (1.0 - distance / 2.0).clamp(0.0, 1.0),
            // Unbounded above; 0 maps to 1, growing distance decays to 0
            DistanceMetric::Euclidean => 1.0 / (1.0 + distance.max(0.0)),
            // Negated inner product of normalized vectors is [-1, 1]
            DistanceMetric::DotProduct => ((1.0 - distance) / 2.0).clamp(0.0, 1.0),
        }
    }

    /// Cosine distance `1 - cos(a, b)`, clamped against floating point
    /// error. Zero vectors are treated as maximally distant.
    fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
        let norm_a = Self::magnitude(a);
        let norm_b = Self::magnitude(b);
        if norm_a == 0.0 || norm_b == 0.0 {
            return 1.0;
        }

        let similarity = (Self::dot_product(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0);
        1.0 - similarity
    }

    fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    fn dot_product(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    fn magnitude(v: &[f32]) -> f32 {
        v.iter().map(|x| x.powi(2)).sum::<f32>().sqrt()
    }
}

/// Core store trait for persisting and searching embedded author records.
///
/// # Contract
///
/// - `upsert` replaces the record's vector and payload atomically and fails
///   with [`Error::DimensionMismatch`] - before anything is written - when
///   the embedding length disagrees with the configured dimension.
/// - `nearest` returns up to `k` records ascending by raw distance (closer
///   first). An empty store yields an empty sequence, not an error.
///   Equidistant records keep the store's natural order.
/// - `update_if_version` writes the record only where the stored version
///   equals `expected`, as a single atomic compare-and-swap, and reports
///   whether a row was written.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The dimension/metric configuration this store was created with.
    fn config(&self) -> &VectorConfig;

    /// Insert or fully replace a record.
    async fn upsert(&self, record: &AuthorRecord) -> Result<()>;

    /// Replace a record only if its stored version equals `expected`.
    ///
    /// Returns whether the write was applied.
    async fn update_if_version(&self, record: &AuthorRecord, expected: i64) -> Result<bool>;

    /// Fetch a record by id.
    async fn get(&self, id: AuthorId) -> Result<Option<AuthorRecord>>;

    /// List up to `limit` records in the store's natural order.
    async fn list(&self, limit: usize) -> Result<Vec<AuthorRecord>>;

    /// Delete a record by id; returns whether it existed.
    async fn delete(&self, id: AuthorId) -> Result<bool>;

    /// Number of records in the store.
    async fn count(&self) -> Result<u64>;

    /// The `k` records nearest to `query`, ascending by raw distance.
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<(AuthorRecord, f32)>>;
}

/// Verify that an embedding provider and a store agree with the given
/// configuration before wiring them into a component.
///
/// Dimension drift (say, a provider model upgrade changing D) is rejected
/// here, at construction, rather than surfacing per-request.
pub(crate) fn verify_wiring(
    config: &VectorConfig,
    embeddings: &dyn Embeddings,
    store: &dyn VectorStore,
) -> Result<()> {
    if embeddings.dimension() != config.dimension {
        return Err(Error::DimensionMismatch {
            expected: config.dimension,
            actual: embeddings.dimension(),
        });
    }
    if store.config().dimension != config.dimension {
        return Err(Error::DimensionMismatch {
            expected: config.dimension,
            actual: store.config().dimension,
        });
    }
    if store.config().metric != config.metric {
        return Err(Error::config(format!(
            "store metric {:?} does not match configured metric {:?}",
            store.config().metric,
            config.metric
        )));
    }
    Ok(())
}

/// In-memory vector store.
///
/// Keeps records in insertion order behind an `RwLock`; the lock is only
/// held around in-memory work, never across an external call. Useful for
/// tests, prototyping, and small catalogs.
pub struct InMemoryVectorStore {
    config: VectorConfig,
    records: RwLock<Vec<AuthorRecord>>,
}

impl InMemoryVectorStore {
    /// Create an empty store for the given configuration.
    #[must_use]
    pub fn new(config: VectorConfig) -> Self {
        Self {
            config,
            records: RwLock::new(Vec::new()),
        }
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual != self.config.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimension,
                actual,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn config(&self) -> &VectorConfig {
        &self.config
    }

    async fn upsert(&self, record: &AuthorRecord) -> Result<()> {
        self.check_dimension(record.embedding.len())?;

        let mut records = self.records.write();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn update_if_version(&self, record: &AuthorRecord, expected: i64) -> Result<bool> {
        self.check_dimension(record.embedding.len())?;

        let mut records = self.records.write();
        match records
            .iter_mut()
            .find(|r| r.id == record.id && r.version == expected)
        {
            Some(slot) => {
                *slot = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, id: AuthorId) -> Result<Option<AuthorRecord>> {
        Ok(self.records.read().iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<AuthorRecord>> {
        Ok(self.records.read().iter().take(limit).cloned().collect())
    }

    async fn delete(&self, id: AuthorId) -> Result<bool> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().len() as u64)
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<(AuthorRecord, f32)>> {
        self.check_dimension(query.len())?;
        if k == 0 {
            return Err(Error::invalid_query("k must be at least 1"));
        }

        let records = self.records.read();
        let mut scored: Vec<(usize, f32)> = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            let distance = self.config.metric.calculate(query, &record.embedding)?;
            scored.push((idx, distance));
        }

        // Stable sort keeps insertion order for equidistant records.
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, distance)| (records[idx].clone(), distance))
            .collect())
    }
}
