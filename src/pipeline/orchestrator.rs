//! The [`PipelineOrchestrator`] — one decision per request.
//!
//! # Control flow
//!
//! ```text
//! RECEIVED ──assess()──► SAFETY_CHECKED
//! SAFETY_CHECKED ──risk == critical──► Blocked            (terminal)
//! SAFETY_CHECKED ──risk <  critical──► RETRIEVING
//! RETRIEVING ──empty / degraded / timeout──► InsufficientContext (terminal)
//! RETRIEVING ──non-empty──► Ready                         (terminal)
//! ```
//!
//! Safety is evaluated first; a critical determination skips retrieval
//! entirely and is never recovered from. Retrieval-layer failures
//! (embedding provider down, index unreachable, deadline exceeded) are
//! recovered locally by degrading to `InsufficientContext` — the
//! surrounding system decides whether to retry the whole request.
//! Exactly one event is emitted per terminal state, after the terminal
//! state is reached, fire-and-forget.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::PipelineConfig;
use crate::embedding::Embedder;
use crate::model::Query;
use crate::retrieval::{RetrievalEngine, RetrievalError, RetrievalResult, VectorIndex};
use crate::safety::{ClassifierError, RiskLevel, SafetyClassifier};

use super::decision::{ContentPolicy, DegradeReason, PipelineDecision};
use super::events::{EventSink, PipelineEvent};

// ── PipelineError ──────────────────────────────────────────────────────

/// Request-fatal errors surfaced to the caller.
///
/// Everything else the pipeline can encounter degrades to an
/// [`InsufficientContext`](PipelineDecision::InsufficientContext)
/// decision instead of erroring.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The query text was empty or whitespace-only. Rejected before the
    /// classifier runs; not a safety incident.
    #[error("query text must not be empty")]
    EmptyQuery,

    /// Query embedding shape does not match the chunk collection — a
    /// system fault in the embedding wiring, not a content problem.
    #[error("query embedding has {actual} dimensions, the chunk collection expects {expected}")]
    DimensionMismatch {
        /// Dimensionality of the chunk collection.
        expected: usize,
        /// Dimensionality of the query embedding.
        actual: usize,
    },

    /// The configured retrieval parameters were rejected by the engine.
    #[error("invalid retrieval parameters: {source}")]
    InvalidParameters {
        /// The underlying validation error.
        source: RetrievalError,
    },
}

/// Builder-time failures.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No embedding provider was supplied.
    #[error("an embedder must be provided")]
    MissingEmbedder,

    /// No vector index was supplied.
    #[error("a vector index must be provided")]
    MissingIndex,

    /// The safety lexicon failed to compile.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

// ── PipelineOrchestrator ───────────────────────────────────────────────

/// Composes the safety classifier and the retrieval engine into one
/// terminal decision per request.
///
/// Shared state is limited to the immutable lexicon and the snapshot
/// handle behind the index; the orchestrator is `Send + Sync` and
/// requests may run fully in parallel.
pub struct PipelineOrchestrator {
    classifier: SafetyClassifier,
    engine: RetrievalEngine,
    embedder: Arc<dyn Embedder>,
    sinks: Vec<Arc<dyn EventSink>>,
    top_k: usize,
    min_similarity: f32,
    deadline: Duration,
    blocked_message: String,
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("sinks", &self.sinks.len())
            .field("top_k", &self.top_k)
            .field("min_similarity", &self.min_similarity)
            .field("deadline", &self.deadline)
            .field("blocked_message", &self.blocked_message)
            .finish_non_exhaustive()
    }
}

impl PipelineOrchestrator {
    /// Start building an orchestrator.
    #[must_use]
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Run one request through the pipeline.
    ///
    /// # Errors
    ///
    /// [`PipelineError::EmptyQuery`] for blank input,
    /// [`PipelineError::DimensionMismatch`] when the embedding wiring is
    /// inconsistent with the chunk collection, and
    /// [`PipelineError::InvalidParameters`] for a misconfigured `k` or
    /// threshold. All other failures resolve to a decision.
    pub async fn handle(&self, query: &Query) -> Result<PipelineDecision, PipelineError> {
        if query.text.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }

        let assessment = self.classifier.assess(&query.text);
        tracing::debug!(
            query_id = %query.id,
            risk_level = %assessment.risk_level(),
            flags = ?assessment.flags(),
            "safety assessment complete",
        );

        if assessment.is_critical() {
            let decision =
                PipelineDecision::blocked(assessment, self.blocked_message.clone());
            self.emit(query, &decision);
            return Ok(decision);
        }

        let query_embedding = match self.embedder.embed(&query.text).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(
                    query_id = %query.id,
                    error = %err,
                    "embedding provider failed, degrading to insufficient context",
                );
                let decision = PipelineDecision::insufficient(
                    assessment,
                    RetrievalResult::empty(self.top_k, self.min_similarity),
                    DegradeReason::EmbedderUnavailable,
                );
                self.emit(query, &decision);
                return Ok(decision);
            }
        };

        let retrieval = tokio::time::timeout(
            self.deadline,
            self.engine
                .retrieve(&query_embedding, self.top_k, self.min_similarity),
        )
        .await;

        let retrieval = match retrieval {
            Err(_elapsed) => {
                tracing::warn!(
                    query_id = %query.id,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "retrieval deadline exceeded, degrading to insufficient context",
                );
                let decision = PipelineDecision::insufficient(
                    assessment,
                    RetrievalResult::empty(self.top_k, self.min_similarity),
                    DegradeReason::Timeout,
                );
                self.emit(query, &decision);
                return Ok(decision);
            }
            Ok(Err(RetrievalError::IndexUnavailable { reason })) => {
                tracing::warn!(
                    query_id = %query.id,
                    reason = %reason,
                    "vector index unavailable, degrading to insufficient context",
                );
                let decision = PipelineDecision::insufficient(
                    assessment,
                    RetrievalResult::empty(self.top_k, self.min_similarity),
                    DegradeReason::IndexUnavailable,
                );
                self.emit(query, &decision);
                return Ok(decision);
            }
            Ok(Err(RetrievalError::DimensionMismatch { expected, actual })) => {
                tracing::error!(
                    query_id = %query.id,
                    expected,
                    actual,
                    "query embedding dimensionality does not match the chunk collection",
                );
                return Err(PipelineError::DimensionMismatch { expected, actual });
            }
            Ok(Err(source)) => {
                return Err(PipelineError::InvalidParameters { source });
            }
            Ok(Ok(result)) => result,
        };

        let decision = if retrieval.is_empty() {
            PipelineDecision::insufficient(assessment, retrieval, DegradeReason::BelowThreshold)
        } else {
            let content_policy = if assessment.risk_level() == RiskLevel::High {
                ContentPolicy::WellnessOnly
            } else {
                ContentPolicy::Unrestricted
            };
            PipelineDecision::ready(assessment, retrieval, content_policy)
        };

        self.emit(query, &decision);
        Ok(decision)
    }

    /// Emit the event record to every sink, exactly once per terminal
    /// decision.
    fn emit(&self, query: &Query, decision: &PipelineDecision) {
        if self.sinks.is_empty() {
            return;
        }
        let event = PipelineEvent::from_decision(query, decision);
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}

// ── OrchestratorBuilder ────────────────────────────────────────────────

/// Builder for [`PipelineOrchestrator`].
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: PipelineConfig,
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl OrchestratorBuilder {
    /// Use the given configuration (defaults otherwise).
    #[must_use]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the embedding provider (required).
    #[must_use]
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index (required).
    #[must_use]
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Add an event sink. May be called multiple times; every sink
    /// receives every event.
    #[must_use]
    pub fn add_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a pre-wrapped `Arc<dyn EventSink>`.
    #[must_use]
    pub fn add_shared_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Build the orchestrator.
    ///
    /// # Errors
    ///
    /// [`BuildError`] when a required collaborator is missing or the
    /// safety lexicon fails to compile.
    pub fn build(self) -> Result<PipelineOrchestrator, BuildError> {
        let embedder = self.embedder.ok_or(BuildError::MissingEmbedder)?;
        let index = self.index.ok_or(BuildError::MissingIndex)?;
        let classifier = SafetyClassifier::new(self.config.safety.clone())?;

        Ok(PipelineOrchestrator {
            classifier,
            engine: RetrievalEngine::new(index),
            embedder,
            sinks: self.sinks,
            top_k: self.config.retrieval.top_k,
            min_similarity: self.config.retrieval.min_similarity,
            deadline: Duration::from_millis(self.config.retrieval.deadline_ms),
            blocked_message: self.config.blocked_message.clone(),
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
