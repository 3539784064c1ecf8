//! Author records and the projections derived from them.
//!
//! An [`AuthorRecord`] is the unit of content in the catalog: descriptive
//! fields plus the embedding computed from them. The text that was embedded
//! ([`AuthorRecord::source_text`]) and its SHA-256 hash are stored alongside
//! the vector, so staleness - fields changed after the embedding was
//! computed - is detectable as a pure hash comparison without touching any
//! external service.
//!
//! [`SearchResult`] and [`AnsweredQuestion`] are ephemeral, per-request
//! projections; they are returned to callers and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Opaque author identifier, assigned at creation and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(Uuid);

impl AuthorId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AuthorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for AuthorId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Descriptive author fields, mutable through
/// [`crate::catalog::CatalogRepository::update`] only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorFields {
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Free-text biography
    pub bio: String,
    /// Free-text expertise tags
    pub expertise: String,
}

/// A persisted author with its current embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRecord {
    /// Opaque identity
    pub id: AuthorId,
    /// Descriptive fields the embedding was derived from
    pub fields: AuthorFields,
    /// Embedding vector; length equals the configured dimension
    pub embedding: Vec<f32>,
    /// Exact text the embedding was computed from
    pub source_text: String,
    /// Lowercase hex SHA-256 of `source_text`; the staleness token
    pub source_hash: String,
    /// Optimistic-concurrency version, starts at 1 and increments per update
    pub version: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AuthorRecord {
    /// Whether the stored embedding was derived from text that no longer
    /// matches the current fields.
    ///
    /// Pure function of the record; a stale author must be re-embedded
    /// before it is searchable again.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        source_hash(&embedding_source_text(&self.fields)) != self.source_hash
    }

    /// Read-only projection without the embedding.
    #[must_use]
    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            name: self.fields.name.clone(),
            email: self.fields.email.clone(),
            bio: self.fields.bio.clone(),
            expertise: self.fields.expertise.clone(),
        }
    }
}

/// Summary projection of an author, as returned from search and QA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    /// Opaque identity of the underlying record
    pub id: AuthorId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Free-text biography
    pub bio: String,
    /// Free-text expertise tags
    pub expertise: String,
}

impl From<&AuthorRecord> for AuthorSummary {
    fn from(record: &AuthorRecord) -> Self {
        record.summary()
    }
}

/// One ranked match from a semantic search. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched author
    pub author: AuthorSummary,
    /// Normalized relevance score in [0, 1]; higher is more similar
    pub score: f32,
}

/// A generated answer together with the exact context it was grounded in.
/// Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    /// The original question text
    pub question: String,
    /// The generated answer
    pub answer: String,
    /// Search results used as context, in the rank order fed to generation
    pub context: Vec<SearchResult>,
}

/// Derive the text an author's embedding is computed from.
///
/// The format is fixed; changing it invalidates every stored hash.
#[must_use]
pub fn embedding_source_text(fields: &AuthorFields) -> String {
    format!(
        "{}. {} Expertise: {}",
        fields.name, fields.bio, fields.expertise
    )
}

/// Lowercase hex SHA-256 of the given source text.
#[must_use]
pub fn source_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("{digest:x}")
}
