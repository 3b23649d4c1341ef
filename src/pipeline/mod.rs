//! Request orchestration: safety first, then (conditionally) retrieval,
//! then exactly one terminal decision and one emitted event.

pub mod decision;
pub mod events;
pub mod orchestrator;

pub use decision::{ContentPolicy, DegradeReason, PipelineDecision, PipelineState};
pub use events::{ChannelSink, ChunkScore, EventSink, MemorySink, PipelineEvent, RetrievalTrace, TracingSink};
pub use orchestrator::{BuildError, OrchestratorBuilder, PipelineError, PipelineOrchestrator};
