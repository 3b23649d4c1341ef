//! The [`RetrievalEngine`] — deterministic ranking over index candidates.
//!
//! The engine validates parameters, delegates candidate generation to a
//! [`VectorIndex`], and then applies the final ordering policy itself so
//! results are byte-identical regardless of backing index: filter at the
//! threshold (inclusive), sort descending by score with exact-score ties
//! broken by ascending chunk id, drop duplicate ids, truncate to `k`.
//!
//! An empty [`RetrievalResult`] is the designed "insufficient
//! information" signal, not an error.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::model::Chunk;

use super::index::VectorIndex;

// ── ScoredChunk ────────────────────────────────────────────────────────

/// One retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Reference into the snapshot the query ran against.
    pub chunk: Arc<Chunk>,
    /// Cosine similarity to the query embedding.
    pub score: f32,
}

impl ScoredChunk {
    /// Compact `(id, score)` projection for event records.
    #[must_use]
    pub fn id_and_score(&self) -> (String, f32) {
        (self.chunk.id.clone(), self.score)
    }
}

// ── RetrievalResult ────────────────────────────────────────────────────

/// Ordered retrieval output plus the parameters that produced it.
///
/// Hits are strictly non-increasing by score, at most `top_k` long, all
/// at or above `min_similarity`, with pairwise-distinct chunk ids.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    hits: Vec<ScoredChunk>,
    candidates_considered: usize,
    top_k: usize,
    min_similarity: f32,
}

impl RetrievalResult {
    /// An empty result for the given parameters.
    #[must_use]
    pub fn empty(top_k: usize, min_similarity: f32) -> Self {
        Self {
            hits: Vec::new(),
            candidates_considered: 0,
            top_k,
            min_similarity,
        }
    }

    /// The ranked hits, best first.
    #[must_use]
    pub fn hits(&self) -> &[ScoredChunk] {
        &self.hits
    }

    /// Number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// `true` when nothing cleared the threshold — the
    /// insufficient-information signal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// How many chunks the index considered.
    #[must_use]
    pub fn candidates_considered(&self) -> usize {
        self.candidates_considered
    }

    /// The `k` this result was truncated to.
    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The similarity threshold applied.
    #[must_use]
    pub fn min_similarity(&self) -> f32 {
        self.min_similarity
    }
}

// ── RetrievalError ─────────────────────────────────────────────────────

/// Failure modes of one retrieval call.
///
/// `DimensionMismatch` is fatal for the request and surfaced to the
/// caller; `IndexUnavailable` is degraded by the orchestrator to an
/// insufficient-context decision.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// `k` must be at least 1.
    #[error("top-k must be at least 1, got {0}")]
    InvalidTopK(usize),

    /// Threshold must lie within the cosine-similarity scale.
    #[error("similarity threshold must be within [0.0, 1.0], got {0}")]
    InvalidThreshold(f32),

    /// Query embedding length does not match the collection.
    #[error("query embedding has {actual} dimensions, the chunk collection expects {expected}")]
    DimensionMismatch {
        /// Dimensionality of the chunk collection.
        expected: usize,
        /// Dimensionality of the query embedding.
        actual: usize,
    },

    /// The backing index could not be reached.
    #[error("vector index unavailable: {reason}")]
    IndexUnavailable {
        /// Human-readable reason.
        reason: String,
    },
}

// ── RetrievalEngine ────────────────────────────────────────────────────

/// Ranks and selects knowledge-base passages for one query embedding.
///
/// Pure with respect to shared state: given the same snapshot and inputs
/// it produces identical output on every call.
pub struct RetrievalEngine {
    index: Arc<dyn VectorIndex>,
}

impl RetrievalEngine {
    /// Build an engine over any [`VectorIndex`].
    #[must_use]
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }

    /// Retrieve the top-`k` chunks scoring at or above `threshold`.
    ///
    /// # Errors
    ///
    /// [`RetrievalError::InvalidTopK`] when `k == 0`,
    /// [`RetrievalError::InvalidThreshold`] when `threshold` is outside
    /// `[0.0, 1.0]` or not finite, and whatever the index reports
    /// (dimensionality mismatch, unavailability).
    pub async fn retrieve(
        &self,
        query_embedding: &[f32],
        k: usize,
        threshold: f32,
    ) -> Result<RetrievalResult, RetrievalError> {
        if k == 0 {
            return Err(RetrievalError::InvalidTopK(k));
        }
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(RetrievalError::InvalidThreshold(threshold));
        }

        let candidates = self.index.query(query_embedding, k, threshold).await?;
        let considered = candidates.considered;

        // The engine owns the deterministic final policy, whatever the
        // index returned: threshold filter (inclusive), descending score
        // with ascending-id tie-break, unique ids, truncate to k.
        let mut hits: Vec<ScoredChunk> = candidates
            .hits
            .into_iter()
            .filter(|h| h.score >= threshold)
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });

        let mut seen = std::collections::HashSet::with_capacity(hits.len());
        hits.retain(|h| seen.insert(h.chunk.id.clone()));
        hits.truncate(k);

        Ok(RetrievalResult {
            hits,
            candidates_considered: considered,
            top_k: k,
            min_similarity: threshold,
        })
    }
}

// Serialize ScoredChunk as its event projection, not the full chunk —
// the logging collaborator receives ids and scores, never embeddings.
impl Serialize for ScoredChunk {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("ScoredChunk", 2)?;
        s.serialize_field("chunk_id", &self.chunk.id)?;
        s.serialize_field("score", &self.score)?;
        s.end()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChunkMetadata, ContentCategory};
    use crate::retrieval::index::CandidateSet;
    use async_trait::async_trait;

    fn scored(id: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Arc::new(Chunk::new(
                id,
                format!("content of {id}"),
                ChunkMetadata::new("test.md", 0, ContentCategory::Wellness),
                vec![1.0],
            )),
            score,
        }
    }

    /// Index stub returning a fixed candidate set, any order.
    struct StubIndex {
        hits: Vec<ScoredChunk>,
    }

    #[async_trait]
    impl VectorIndex for StubIndex {
        async fn query(
            &self,
            _query_embedding: &[f32],
            _k: usize,
            _threshold: f32,
        ) -> Result<CandidateSet, RetrievalError> {
            Ok(CandidateSet {
                hits: self.hits.clone(),
                considered: self.hits.len(),
            })
        }
    }

    struct DownIndex;

    #[async_trait]
    impl VectorIndex for DownIndex {
        async fn query(
            &self,
            _query_embedding: &[f32],
            _k: usize,
            _threshold: f32,
        ) -> Result<CandidateSet, RetrievalError> {
            Err(RetrievalError::IndexUnavailable {
                reason: "connection refused".into(),
            })
        }
    }

    fn engine(hits: Vec<ScoredChunk>) -> RetrievalEngine {
        RetrievalEngine::new(Arc::new(StubIndex { hits }))
    }

    #[tokio::test]
    async fn zero_k_rejected() {
        let err = engine(vec![]).retrieve(&[1.0], 0, 0.5).await.unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidTopK(0)));
    }

    #[tokio::test]
    async fn out_of_range_threshold_rejected() {
        let e = engine(vec![]);
        assert!(matches!(
            e.retrieve(&[1.0], 3, 1.5).await.unwrap_err(),
            RetrievalError::InvalidThreshold(_)
        ));
        assert!(matches!(
            e.retrieve(&[1.0], 3, -0.1).await.unwrap_err(),
            RetrievalError::InvalidThreshold(_)
        ));
        assert!(matches!(
            e.retrieve(&[1.0], 3, f32::NAN).await.unwrap_err(),
            RetrievalError::InvalidThreshold(_)
        ));
    }

    #[tokio::test]
    async fn results_sorted_descending_and_truncated() {
        let e = engine(vec![
            scored("c", 0.7),
            scored("a", 0.9),
            scored("b", 0.8),
            scored("d", 0.65),
        ]);
        let r = e.retrieve(&[1.0], 3, 0.6).await.unwrap();
        let ids: Vec<&str> = r.hits().iter().map(|h| h.chunk.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(r.candidates_considered(), 4);
    }

    #[tokio::test]
    async fn exact_ties_break_by_ascending_id() {
        let e = engine(vec![scored("zeta", 0.8), scored("alpha", 0.8)]);
        let r = e.retrieve(&[1.0], 5, 0.5).await.unwrap();
        let ids: Vec<&str> = r.hits().iter().map(|h| h.chunk.id.as_str()).collect();
        assert_eq!(ids, ["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn threshold_filter_is_inclusive() {
        // An index may return sub-threshold candidates; the engine
        // re-filters. Scores exactly at the threshold survive.
        let e = engine(vec![scored("at", 0.6), scored("below", 0.59)]);
        let r = e.retrieve(&[1.0], 5, 0.6).await.unwrap();
        let ids: Vec<&str> = r.hits().iter().map(|h| h.chunk.id.as_str()).collect();
        assert_eq!(ids, ["at"]);
    }

    #[tokio::test]
    async fn duplicate_ids_are_dropped() {
        let e = engine(vec![scored("a", 0.9), scored("a", 0.7), scored("b", 0.8)]);
        let r = e.retrieve(&[1.0], 5, 0.5).await.unwrap();
        let ids: Vec<&str> = r.hits().iter().map(|h| h.chunk.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!((r.hits()[0].score - 0.9).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn empty_result_is_ok_not_error() {
        let e = engine(vec![]);
        let r = e.retrieve(&[1.0], 5, 0.9).await.unwrap();
        assert!(r.is_empty());
        assert_eq!(r.top_k(), 5);
    }

    #[tokio::test]
    async fn index_unavailability_propagates() {
        let e = RetrievalEngine::new(Arc::new(DownIndex));
        let err = e.retrieve(&[1.0], 5, 0.5).await.unwrap_err();
        assert!(matches!(err, RetrievalError::IndexUnavailable { .. }));
    }

    #[tokio::test]
    async fn retrieve_is_deterministic() {
        let e = engine(vec![scored("a", 0.9), scored("b", 0.9), scored("c", 0.7)]);
        let first = e.retrieve(&[1.0], 2, 0.5).await.unwrap();
        let second = e.retrieve(&[1.0], 2, 0.5).await.unwrap();
        let ids = |r: &RetrievalResult| -> Vec<String> {
            r.hits().iter().map(|h| h.chunk.id.clone()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn scored_chunk_serializes_without_embedding() {
        let json = serde_json::to_value(scored("a", 0.5)).unwrap();
        assert_eq!(json["chunk_id"], "a");
        assert!(json.get("embedding").is_none());
    }
}
