//! The [`Embedder`] capability trait.
//!
//! The core consumes pre-computed vectors — it never computes embeddings
//! itself. Concrete providers (sentence-transformer services, hosted
//! APIs) live outside this crate and are selected by configuration at
//! startup; the pipeline only sees this interface.
//!
//! Providers must be deterministic for identical input within a given
//! model version, and every vector they return must have
//! [`dimension`](Embedder::dimension) elements.

use async_trait::async_trait;
use thiserror::Error;

// ── EmbeddingError ─────────────────────────────────────────────────────

/// Failure to obtain a query embedding.
///
/// The orchestrator treats any of these as an upstream failure and
/// degrades the request to an insufficient-context decision rather than
/// retrying or surfacing an error.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The provider could not be reached or refused the request.
    #[error("embedding provider unavailable: {reason}")]
    ProviderUnavailable {
        /// Human-readable reason.
        reason: String,
    },

    /// The provider returned a vector of the wrong length.
    #[error("embedding provider returned {actual} dimensions, expected {expected}")]
    UnexpectedDimension {
        /// Dimensionality the provider advertises.
        expected: usize,
        /// Dimensionality actually returned.
        actual: usize,
    },
}

// ── Embedder trait ─────────────────────────────────────────────────────

/// Capability interface for query-embedding providers.
///
/// Implementations must be `Send + Sync` and cheap to share behind an
/// `Arc` across concurrent requests.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Fixed output dimensionality of this provider.
    fn dimension(&self) -> usize;

    /// Embed `text` into a [`dimension`](Self::dimension)-length vector.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError`] when the provider is unavailable or
    /// misbehaves.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

// ── Tests ──────────────────────────────────────────────────────────────
