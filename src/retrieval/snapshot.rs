//! Immutable chunk-collection snapshots and atomic replacement.
//!
//! A [`ChunkSnapshot`] is a validated, point-in-time view of the
//! knowledge corpus: chunk ids are unique and every embedding has the
//! same dimensionality. Snapshots are never mutated — a knowledge-base
//! update produces a new snapshot and swaps it in through a
//! [`SnapshotHandle`], so any in-flight request sees either the old or
//! the new collection in its entirety, never a mix.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::model::Chunk;

// ── SnapshotError ──────────────────────────────────────────────────────

/// Validation failure while constructing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Two chunks share an identifier.
    #[error("duplicate chunk identifier '{id}'")]
    DuplicateChunkId {
        /// The offending identifier.
        id: String,
    },

    /// A chunk's embedding length differs from the rest of the collection.
    #[error("chunk '{id}' has a {actual}-dimensional embedding, expected {expected}")]
    DimensionMismatch {
        /// The offending chunk.
        id: String,
        /// Dimensionality established by the first chunk.
        expected: usize,
        /// Dimensionality found.
        actual: usize,
    },

    /// A chunk has no embedding at all.
    #[error("chunk '{id}' has an empty embedding")]
    EmptyEmbedding {
        /// The offending chunk.
        id: String,
    },
}

// ── ChunkSnapshot ──────────────────────────────────────────────────────

/// An immutable, validated view of the chunk collection.
#[derive(Debug, Default)]
pub struct ChunkSnapshot {
    chunks: Vec<Arc<Chunk>>,
    dimension: Option<usize>,
}

impl ChunkSnapshot {
    /// Validate and build a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when chunk ids collide, an embedding is
    /// empty, or embedding lengths are inconsistent.
    pub fn new(chunks: Vec<Chunk>) -> Result<Self, SnapshotError> {
        let mut seen = std::collections::HashSet::with_capacity(chunks.len());
        let mut dimension: Option<usize> = None;

        for chunk in &chunks {
            if !seen.insert(chunk.id.clone()) {
                return Err(SnapshotError::DuplicateChunkId {
                    id: chunk.id.clone(),
                });
            }
            if chunk.embedding.is_empty() {
                return Err(SnapshotError::EmptyEmbedding {
                    id: chunk.id.clone(),
                });
            }
            match dimension {
                None => dimension = Some(chunk.embedding.len()),
                Some(expected) if expected != chunk.embedding.len() => {
                    return Err(SnapshotError::DimensionMismatch {
                        id: chunk.id.clone(),
                        expected,
                        actual: chunk.embedding.len(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            chunks: chunks.into_iter().map(Arc::new).collect(),
            dimension,
        })
    }

    /// An empty snapshot (valid: retrieval over it returns no results).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of chunks in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// `true` when the snapshot holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimensionality, `None` for an empty snapshot.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Read-only access to the chunks.
    #[must_use]
    pub fn chunks(&self) -> &[Arc<Chunk>] {
        &self.chunks
    }
}

// ── SnapshotHandle ─────────────────────────────────────────────────────

/// Cloneable handle through which the current snapshot is loaded and
/// replaced.
///
/// [`load`](Self::load) clones the inner `Arc`, so a request that loaded
/// a snapshot keeps a coherent view for its whole lifetime regardless of
/// concurrent [`swap`](Self::swap)s. The lock is held only for the
/// pointer clone/replace, never across the similarity scan.
#[derive(Clone)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Arc<ChunkSnapshot>>>,
}

impl SnapshotHandle {
    /// Wrap an initial snapshot.
    #[must_use]
    pub fn new(snapshot: ChunkSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// Load the current snapshot.
    #[must_use]
    pub fn load(&self) -> Arc<ChunkSnapshot> {
        Arc::clone(&self.inner.read())
    }

    /// Atomically replace the snapshot, returning the previous one.
    ///
    /// This is the entry point for the ingestion collaborator's
    /// snapshot-replacement signal; no restart is required.
    pub fn swap(&self, next: ChunkSnapshot) -> Arc<ChunkSnapshot> {
        let mut guard = self.inner.write();
        std::mem::replace(&mut *guard, Arc::new(next))
    }
}

impl std::fmt::Debug for SnapshotHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.load();
        f.debug_struct("SnapshotHandle")
            .field("chunks", &snapshot.len())
            .field("dimension", &snapshot.dimension())
            .finish()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
