//! Structured pipeline events and fire-and-forget sinks.
//!
//! The orchestrator emits exactly one [`PipelineEvent`] per terminal
//! state, after the terminal state is reached. Emission must never block
//! or fail the caller-visible result — [`EventSink::emit`] is infallible
//! from the pipeline's point of view; a sink that cannot deliver logs
//! and drops.
//!
//! Persistence and indexing of these records belong to an external
//! logging collaborator; the core's obligation ends at producing them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::model::Query;
use crate::safety::{FlagCategory, RiskLevel};

use super::decision::{DegradeReason, PipelineDecision, PipelineState};

// ── RetrievalTrace ─────────────────────────────────────────────────────

/// Retrieval metadata carried inside an event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalTrace {
    /// How many chunks the index considered.
    pub candidates_considered: usize,
    /// `(chunk id, score)` of every returned chunk, ranked.
    pub returned: Vec<ChunkScore>,
    /// The `k` in effect.
    pub top_k: usize,
    /// The threshold in effect.
    pub min_similarity: f32,
    /// Degradation reason, when the request did not reach `Ready`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradeReason>,
}

/// One `(chunk id, score)` pair in a [`RetrievalTrace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkScore {
    /// Chunk identifier.
    pub chunk_id: String,
    /// Similarity score.
    pub score: f32,
}

// ── PipelineEvent ──────────────────────────────────────────────────────

/// The record handed to the logging collaborator, once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Request identifier.
    pub query_id: Uuid,
    /// Session the request belonged to.
    pub session_id: String,
    /// Original query text.
    pub query_text: String,
    /// Arrival timestamp of the query.
    pub timestamp: DateTime<Utc>,
    /// Terminal state the request reached.
    pub state: PipelineState,
    /// Assessed risk level.
    pub risk_level: RiskLevel,
    /// Matched flag categories, priority order.
    pub flags: Vec<FlagCategory>,
    /// Required disclaimers, priority order.
    pub disclaimers: Vec<String>,
    /// Retrieval metadata — absent for blocked requests, where retrieval
    /// never ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval: Option<RetrievalTrace>,
}

impl PipelineEvent {
    /// Build the event record for a terminal decision.
    #[must_use]
    pub fn from_decision(query: &Query, decision: &PipelineDecision) -> Self {
        let assessment = decision.assessment();
        let degraded = match decision {
            PipelineDecision::InsufficientContext { reason, .. } => Some(*reason),
            _ => None,
        };
        let retrieval = decision.retrieval().map(|r| RetrievalTrace {
            candidates_considered: r.candidates_considered(),
            returned: r
                .hits()
                .iter()
                .map(|h| ChunkScore {
                    chunk_id: h.chunk.id.clone(),
                    score: h.score,
                })
                .collect(),
            top_k: r.top_k(),
            min_similarity: r.min_similarity(),
            degraded,
        });

        Self {
            query_id: query.id,
            session_id: query.session_id.clone(),
            query_text: query.text.clone(),
            timestamp: query.received_at,
            state: decision.state(),
            risk_level: assessment.risk_level(),
            flags: assessment.flags().to_vec(),
            disclaimers: assessment.disclaimers().to_vec(),
            retrieval,
        }
    }

    /// Normalized JSON projection of the event.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        json!({
            "query_id": self.query_id,
            "session_id": self.session_id,
            "query_text": self.query_text,
            "timestamp": self.timestamp.to_rfc3339(),
            "state": self.state,
            "safety": {
                "risk_level": self.risk_level,
                "flags": self.flags,
                "disclaimers": self.disclaimers,
            },
            "retrieval": self.retrieval,
        })
    }
}

// ── EventSink ──────────────────────────────────────────────────────────

/// Output target for pipeline events.
///
/// `emit` must return promptly and must never panic or block on I/O —
/// the orchestrator calls it on the request path, after the terminal
/// state is already decided.
pub trait EventSink: Send + Sync {
    /// Consume one event.
    fn emit(&self, event: PipelineEvent);
}

/// Sink that writes each event as a structured `tracing` line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        tracing::info!(
            target: "pranagate::events",
            query_id = %event.query_id,
            session_id = %event.session_id,
            state = %event.state,
            risk_level = %event.risk_level,
            flags = ?event.flags,
            returned = event
                .retrieval
                .as_ref()
                .map(|r| r.returned.len())
                .unwrap_or(0),
            "pipeline decision",
        );
    }
}

/// In-memory sink for tests and snapshots.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured events.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PipelineEvent> {
        self.entries.lock().clone()
    }

    /// Drop all captured events.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: PipelineEvent) {
        self.entries.lock().push(event);
    }
}

/// Channel sink for streaming events to an async consumer.
///
/// Sending on an unbounded channel never blocks; a dropped receiver is
/// logged at debug level and the event is discarded.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelSink {
    /// Wrap an unbounded sender.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: PipelineEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event receiver dropped, discarding pipeline event");
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
