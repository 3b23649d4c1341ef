//! Vector index backends for similarity search.
//!
//! [`VectorIndex`] abstracts over the store that answers "which chunks
//! are closest to this query vector", so the engine contract stays
//! identical whether the backing index is the in-process linear scan
//! provided here or an external approximate-nearest-neighbor service.
//!
//! ```text
//!                  ┌──────────────────┐
//!                  │ VectorIndex trait│
//!                  │  (async query)   │
//!                  └────────┬─────────┘
//!                           │
//!              ┌────────────┼────────────┐
//!              ▼            ▼            ▼
//!       ┌────────────┐ ┌──────────┐ ┌──────────┐
//!       │ InMemory   │ │ (future) │ │ (future) │
//!       │ linear scan│ │ pgvector │ │ ANN svc  │
//!       └────────────┘ └──────────┘ └──────────┘
//! ```
//!
//! Backends return *candidates*; the
//! [`RetrievalEngine`](super::engine::RetrievalEngine) applies the
//! deterministic final ordering policy, so an index is free to return
//! candidates in any order.

use async_trait::async_trait;

use super::engine::{RetrievalError, ScoredChunk};
use super::snapshot::SnapshotHandle;

// ── CandidateSet ───────────────────────────────────────────────────────

/// Raw output of an index query, before the engine's ordering policy.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    /// Candidates scoring at or above the requested threshold.
    pub hits: Vec<ScoredChunk>,
    /// How many chunks the index considered (corpus size for a scan).
    pub considered: usize,
}

// ── VectorIndex trait ──────────────────────────────────────────────────

/// Capability interface for similarity-search backends.
///
/// Implementations must treat the underlying collection as read-only for
/// the duration of one query and must be safe to share across concurrent
/// requests. `k` is advisory — an index may return more candidates than
/// `k` (the engine truncates) but should not return fewer than the best
/// `k` above `threshold`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return candidates scoring at or above `threshold` for the query
    /// vector.
    ///
    /// # Errors
    ///
    /// [`RetrievalError::DimensionMismatch`] when the query vector length
    /// does not match the collection; [`RetrievalError::IndexUnavailable`]
    /// when an external backend cannot be reached.
    async fn query(
        &self,
        query_embedding: &[f32],
        k: usize,
        threshold: f32,
    ) -> Result<CandidateSet, RetrievalError>;
}

// ── Cosine similarity ──────────────────────────────────────────────────

/// Cosine similarity between two equal-length vectors.
///
/// Zero-norm inputs score `0.0` rather than dividing by zero.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "cosine over unequal lengths");

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

// ── InMemoryIndex ──────────────────────────────────────────────────────

/// Linear-scan cosine index over a [`ChunkSnapshot`](super::ChunkSnapshot).
///
/// Acceptable up to a bounded corpus size; larger corpora should sit
/// behind an external index implementing the same trait. The snapshot is
/// loaded once per query, so a concurrent swap never yields a mixed view.
pub struct InMemoryIndex {
    snapshot: SnapshotHandle,
}

impl InMemoryIndex {
    /// Build an index over the given snapshot handle.
    #[must_use]
    pub fn new(snapshot: SnapshotHandle) -> Self {
        Self { snapshot }
    }

    /// The handle this index reads through.
    #[must_use]
    pub fn snapshot(&self) -> &SnapshotHandle {
        &self.snapshot
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn query(
        &self,
        query_embedding: &[f32],
        _k: usize,
        threshold: f32,
    ) -> Result<CandidateSet, RetrievalError> {
        let snapshot = self.snapshot.load();

        let Some(expected) = snapshot.dimension() else {
            // Empty corpus: nothing to mismatch against, nothing to return.
            return Ok(CandidateSet::default());
        };
        if query_embedding.len() != expected {
            return Err(RetrievalError::DimensionMismatch {
                expected,
                actual: query_embedding.len(),
            });
        }

        let mut hits = Vec::new();
        for chunk in snapshot.chunks() {
            let score = cosine_similarity(query_embedding, &chunk.embedding);
            if score >= threshold {
                hits.push(ScoredChunk {
                    chunk: std::sync::Arc::clone(chunk),
                    score,
                });
            }
        }

        Ok(CandidateSet {
            hits,
            considered: snapshot.len(),
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
