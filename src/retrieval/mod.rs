//! Similarity-based context retrieval.
//!
//! The chunk collection is an immutable [`ChunkSnapshot`] behind a
//! [`SnapshotHandle`]; candidate generation sits behind the
//! [`VectorIndex`] capability trait; the [`RetrievalEngine`] applies the
//! deterministic ranking policy on top, so the contract is identical
//! whether the index is the in-process linear scan or an external ANN
//! store.

pub mod engine;
pub mod index;
pub mod snapshot;

pub use engine::{RetrievalEngine, RetrievalError, RetrievalResult, ScoredChunk};
pub use index::{cosine_similarity, CandidateSet, InMemoryIndex, VectorIndex};
pub use snapshot::{ChunkSnapshot, SnapshotError, SnapshotHandle};
