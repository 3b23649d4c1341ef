//! ```text
//! Query ──► SafetyClassifier ──► SafetyAssessment
//!                │
//!                ├─ risk == critical ──────────────► Blocked
//!                │
//!                └─ otherwise ──► Embedder ──► RetrievalEngine ──► VectorIndex
//!                                                  │                  │
//!                                                  │          ChunkSnapshot (atomic swap)
//!                                                  │
//!                                    empty ────────┴──► InsufficientContext
//!                                    non-empty ────────► Ready ──► generation collaborator
//!
//!                 every terminal state ──► PipelineEvent ──► EventSink (fire-and-forget)
//! ```
//!
//! # pranagate
//!
//! **Safety-gated context retrieval for wellness and yoga knowledge
//! assistants.**
//!
//! `pranagate` answers the question "may this query be answered, and with
//! which knowledge-base passages?" for a natural-language wellness
//! assistant. It deterministically assesses the risk of an incoming
//! query, decides whether to block, warn, or proceed, and — when
//! proceeding — ranks and selects the corpus passages handed to an
//! answer-generation stage. Everything around it (document ingestion,
//! embedding computation, the LLM call, HTTP, persistence) is an external
//! collaborator behind a narrow interface.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pranagate::prelude::*;
//!
//! let snapshot = ChunkSnapshot::new(chunks)?;
//! let orchestrator = PipelineOrchestrator::builder()
//!     .config(ConfigBuilder::new().with_file("pranagate.toml").build()?)
//!     .embedder(my_embedder)
//!     .index(Arc::new(InMemoryIndex::new(SnapshotHandle::new(snapshot))))
//!     .add_sink(TracingSink)
//!     .build()?;
//!
//! let decision = orchestrator.handle(&Query::new(text, session_id)).await?;
//! match decision {
//!     PipelineDecision::Ready { retrieval, .. } => { /* hand to generation */ }
//!     PipelineDecision::Blocked { safety_message, .. } => { /* show resources */ }
//!     PipelineDecision::InsufficientContext { .. } => { /* "I don't know" */ }
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Classification and retrieval are **pure and deterministic**: identical
//!   inputs against an identical snapshot yield identical outputs.
//! - A **critical** safety determination always blocks and is always
//!   logged; retrieval is never invoked for blocked requests.
//! - Retrieval-layer failures (embedding provider down, index
//!   unreachable, deadline exceeded) **degrade** to an
//!   insufficient-context decision instead of erroring or hanging.
//! - Requests run fully in parallel: shared state is limited to the
//!   immutable lexicon and the chunk snapshot, which is replaced only by
//!   whole-snapshot atomic swap.
//!
//! ## Modules
//!
//! - [`config`] – layered configuration (defaults → file → env)
//! - [`model`] – [`Query`](model::Query), [`Chunk`](model::Chunk) and friends
//! - [`safety`] – lexicon-based risk classification
//! - [`embedding`] – the [`Embedder`](embedding::Embedder) capability trait
//! - [`retrieval`] – snapshots, vector indexes, and the ranking engine
//! - [`pipeline`] – the orchestrator, terminal decisions, and event sinks

#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod embedding;
pub mod model;
pub mod pipeline;
pub mod retrieval;
pub mod safety;

/// Re-exports for convenient access to core types.
pub mod prelude {
    pub use crate::config::{ConfigBuilder, PipelineConfig, RetrievalConfig};
    pub use crate::embedding::{Embedder, EmbeddingError};
    pub use crate::model::{Chunk, ChunkMetadata, ContentCategory, Query};
    pub use crate::pipeline::{
        ContentPolicy, DegradeReason, EventSink, MemorySink, PipelineDecision, PipelineError,
        PipelineEvent, PipelineOrchestrator, PipelineState, TracingSink,
    };
    pub use crate::retrieval::{
        ChunkSnapshot, InMemoryIndex, RetrievalEngine, RetrievalError, RetrievalResult,
        ScoredChunk, SnapshotHandle, VectorIndex,
    };
    pub use crate::safety::{
        FlagCategory, RiskLevel, SafetyAssessment, SafetyClassifier, SafetyConfig,
    };
}
