//! Terminal pipeline decisions.
//!
//! Every request resolves to exactly one [`PipelineDecision`] variant.
//! The [`SafetyAssessment`] is always carried; the [`RetrievalResult`]
//! only when the request was not blocked. `Blocked` and
//! `InsufficientContext` both skip the generation collaborator.

use serde::{Deserialize, Serialize};

use crate::retrieval::RetrievalResult;
use crate::safety::SafetyAssessment;

// ── PipelineState ──────────────────────────────────────────────────────

/// Label of the terminal state a request reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Safety mandated blocking; retrieval was never invoked.
    Blocked,
    /// Retrieval produced nothing usable; generation must not run.
    InsufficientContext,
    /// Assessment and context are ready for the generation collaborator.
    Ready,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocked => write!(f, "blocked"),
            Self::InsufficientContext => write!(f, "insufficient_context"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

// ── ContentPolicy ──────────────────────────────────────────────────────

/// Constraint the generation collaborator must honor for a `Ready`
/// decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPolicy {
    /// No generation constraint beyond the attached disclaimers.
    Unrestricted,
    /// High-risk query: supply wellness context only, never prescriptive
    /// medical content.
    WellnessOnly,
}

// ── DegradeReason ──────────────────────────────────────────────────────

/// Why a request resolved to [`PipelineState::InsufficientContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradeReason {
    /// No chunk cleared the similarity threshold.
    BelowThreshold,
    /// Retrieval did not complete before the caller-supplied deadline.
    Timeout,
    /// The embedding provider was unavailable.
    EmbedderUnavailable,
    /// The vector index was unavailable.
    IndexUnavailable,
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BelowThreshold => write!(f, "below_threshold"),
            Self::Timeout => write!(f, "timeout"),
            Self::EmbedderUnavailable => write!(f, "embedder_unavailable"),
            Self::IndexUnavailable => write!(f, "index_unavailable"),
        }
    }
}

// ── PipelineDecision ───────────────────────────────────────────────────

/// The terminal artifact of one request.
///
/// Consumed once by the generation collaborator (only when `Ready`) and
/// by the logging collaborator (always, via the emitted event); the core
/// does not retain it.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum PipelineDecision {
    /// A critical safety determination; generation and retrieval are
    /// skipped. `safety_message` is the fixed resources text shown to
    /// the user — it never echoes matched lexicon phrases.
    Blocked {
        /// The full assessment (preserved for the log record).
        assessment: SafetyAssessment,
        /// Fixed user-facing safety-resources message.
        safety_message: String,
    },

    /// Retrieval yielded nothing usable. The empty (or degraded)
    /// retrieval result is carried so the event record can explain what
    /// was attempted.
    InsufficientContext {
        /// The assessment, carried on every decision.
        assessment: SafetyAssessment,
        /// The (empty) retrieval result with its parameters.
        retrieval: RetrievalResult,
        /// Why the request degraded.
        reason: DegradeReason,
    },

    /// Context is ready for generation.
    Ready {
        /// The assessment, carried on every decision.
        assessment: SafetyAssessment,
        /// Ranked context chunks.
        retrieval: RetrievalResult,
        /// Constraint the generator must honor.
        content_policy: ContentPolicy,
    },
}

impl PipelineDecision {
    /// Convenience constructor for a blocked decision.
    #[must_use]
    pub fn blocked(assessment: SafetyAssessment, safety_message: impl Into<String>) -> Self {
        Self::Blocked {
            assessment,
            safety_message: safety_message.into(),
        }
    }

    /// Convenience constructor for an insufficient-context decision.
    #[must_use]
    pub fn insufficient(
        assessment: SafetyAssessment,
        retrieval: RetrievalResult,
        reason: DegradeReason,
    ) -> Self {
        Self::InsufficientContext {
            assessment,
            retrieval,
            reason,
        }
    }

    /// Convenience constructor for a ready decision.
    #[must_use]
    pub fn ready(
        assessment: SafetyAssessment,
        retrieval: RetrievalResult,
        content_policy: ContentPolicy,
    ) -> Self {
        Self::Ready {
            assessment,
            retrieval,
            content_policy,
        }
    }

    /// The terminal-state label.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        match self {
            Self::Blocked { .. } => PipelineState::Blocked,
            Self::InsufficientContext { .. } => PipelineState::InsufficientContext,
            Self::Ready { .. } => PipelineState::Ready,
        }
    }

    /// The assessment, present on every variant.
    #[must_use]
    pub fn assessment(&self) -> &SafetyAssessment {
        match self {
            Self::Blocked { assessment, .. }
            | Self::InsufficientContext { assessment, .. }
            | Self::Ready { assessment, .. } => assessment,
        }
    }

    /// The retrieval result — `None` for blocked decisions.
    #[must_use]
    pub fn retrieval(&self) -> Option<&RetrievalResult> {
        match self {
            Self::Blocked { .. } => None,
            Self::InsufficientContext { retrieval, .. } | Self::Ready { retrieval, .. } => {
                Some(retrieval)
            }
        }
    }

    /// Returns `true` if the decision is [`Blocked`](Self::Blocked).
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Returns `true` if the decision is
    /// [`InsufficientContext`](Self::InsufficientContext).
    #[must_use]
    pub fn is_insufficient_context(&self) -> bool {
        matches!(self, Self::InsufficientContext { .. })
    }

    /// Returns `true` if the decision is [`Ready`](Self::Ready).
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
