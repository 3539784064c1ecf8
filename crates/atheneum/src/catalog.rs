//! Author CRUD with embedding freshness and versioned updates.
//!
//! [`CatalogRepository`] exclusively owns author persistence. Every write
//! keeps the stored embedding in sync with the fields it was derived from:
//! creation embeds before anything is persisted, and an update whose fields
//! change the embedding source text re-embeds before committing. If the
//! embedding call fails, the write is rejected in full - the store never
//! holds new fields with a stale embedding or the other way around.
//!
//! Updates are optimistic: callers supply the version they read, and the
//! write is a compare-and-swap against it. A losing race surfaces as
//! [`Error::VersionConflict`]; reload and resubmit.

use std::sync::Arc;

use chrono::Utc;

use crate::authors::{
    embedding_source_text, source_hash, AuthorFields, AuthorId, AuthorRecord,
};
use crate::config::{Timeouts, VectorConfig};
use crate::embeddings::Embeddings;
use crate::error::{Error, Result};
use crate::retry::with_timeout;
use crate::vector_stores::{verify_wiring, VectorStore};

/// Default number of records returned by [`CatalogRepository::list`].
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Owns author persistence and keeps stored embeddings current.
pub struct CatalogRepository {
    embeddings: Arc<dyn Embeddings>,
    store: Arc<dyn VectorStore>,
    config: VectorConfig,
    timeouts: Timeouts,
}

impl CatalogRepository {
    /// Wire a repository together.
    ///
    /// # Errors
    ///
    /// Same wiring checks as the retrieval engine: dimension drift between
    /// provider, store, and configuration is rejected here.
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

    /// Register a new author.
    ///
    /// The embedding is computed synchronously before the record is
    /// persisted; if embedding or the write fails, nothing is stored.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] on blank name or email
    /// - [`Error::Creation`] wrapping the embedding or storage failure
    pub async fn create(&self, fields: AuthorFields) -> Result<AuthorRecord> {
        validate_fields(&fields)?;

        let source_text = embedding_source_text(&fields);
        let embedding = self
            .embed(&source_text)
            .await
            .map_err(wrap_creation)?;

        let record = AuthorRecord {
            id: AuthorId::new(),
            source_hash: source_hash(&source_text),
            source_text,
            fields,
            embedding,
            version: 1,
            created_at: Utc::now(),
        };

        with_timeout(self.timeouts.query, self.store.upsert(&record))
            .await
            .map_err(wrap_creation)?;

        tracing::info!(author = %record.id, "author created");
        Ok(record)
    }

    /// Update an author's descriptive fields.
    ///
    /// `expected_version` must be the version the caller read. When the new
    /// fields change the embedding source text, the author is re-embedded
    /// before the commit; a failed re-embedding rejects the update in full
    /// and leaves the stored record untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when no such author exists
    /// - [`Error::VersionConflict`] when the stored version moved past
    ///   `expected_version`
    /// - [`Error::UpdateRejected`] wrapping the embedding or storage failure
    pub async fn update(
        &self,
        id: AuthorId,
        fields: AuthorFields,
        expected_version: i64,
    ) -> Result<AuthorRecord> {
        validate_fields(&fields)?;

        let current = self.get(id).await?.ok_or(Error::NotFound(id))?;
        if current.version != expected_version {
            return Err(Error::VersionConflict {
                expected: expected_version,
            });
        }

        let source_text = embedding_source_text(&fields);
        let embedding = if source_text == current.source_text {
            // Fields relevant to the embedding are unchanged; the stored
            // vector is still current.
            current.embedding
        } else {
            self.embed(&source_text).await.map_err(wrap_update)?
        };

        let record = AuthorRecord {
            id,
            source_hash: source_hash(&source_text),
            source_text,
            fields,
            embedding,
            version: expected_version + 1,
            created_at: current.created_at,
        };

        let applied = with_timeout(
            self.timeouts.query,
            self.store.update_if_version(&record, expected_version),
        )
        .await
        .map_err(wrap_update)?;
        if !applied {
            return Err(Error::VersionConflict {
                expected: expected_version,
            });
        }

        tracing::info!(author = %record.id, version = record.version, "author updated");
        Ok(record)
    }

    /// Fetch an author by id.
    pub async fn get(&self, id: AuthorId) -> Result<Option<AuthorRecord>> {
        with_timeout(self.timeouts.query, self.store.get(id)).await
    }

    /// List up to `limit` authors in the store's natural order.
    pub async fn list(&self, limit: usize) -> Result<Vec<AuthorRecord>> {
        with_timeout(self.timeouts.query, self.store.list(limit)).await
    }

    /// Delete an author by id; returns whether the author existed.
    pub async fn delete(&self, id: AuthorId) -> Result<bool> {
        let deleted = with_timeout(self.timeouts.query, self.store.delete(id)).await?;
        if deleted {
            tracing::info!(author = %id, "author deleted");
        }
        Ok(deleted)
    }

    /// Embed a source text and enforce the configured dimension.
    async fn embed(&self, source_text: &str) -> Result<Vec<f32>> {
        let texts = [source_text.to_string()];
        let vectors = with_timeout(self.timeouts.embed, self.embeddings.embed_documents(&texts))
            .await?;
        let embedding = vectors
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider_unavailable("provider returned no embedding"))?;

        if embedding.len() != self.config.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimension,
                actual: embedding.len(),
            });
        }
        Ok(embedding)
    }
}

fn validate_fields(fields: &AuthorFields) -> Result<()> {
    if fields.name.trim().is_empty() {
        return Err(Error::invalid_input("author name must not be empty"));
    }
    if fields.email.trim().is_empty() {
        return Err(Error::invalid_input("author email must not be empty"));
    }
    Ok(())
}

/// Embedding and storage failures reject the creation; invariant violations
/// pass through untouched.
fn wrap_creation(err: Error) -> Error {
    match err {
        passthrough @ (Error::DimensionMismatch { .. } | Error::InvalidInput(_)) => passthrough,
        other => Error::Creation {
            source: Box::new(other),
        },
    }
}

fn wrap_update(err: Error) -> Error {
    match err {
        passthrough @ (Error::DimensionMismatch { .. } | Error::InvalidInput(_)) => passthrough,
        other => Error::UpdateRejected {
            source: Box::new(other),
        },
    }
}
