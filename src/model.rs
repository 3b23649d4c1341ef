//! Core data model shared across the pipeline.
//!
//! [`Query`] is the immutable per-request value; [`Chunk`] is one indexed,
//! embedded passage of the knowledge corpus, owned by the ingestion
//! collaborator and treated as read-only by everything in this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── ContentCategory ────────────────────────────────────────────────────

/// Content category of a knowledge-base passage.
///
/// Serialized in SCREAMING_SNAKE_CASE to match the wire form used by the
/// ingestion collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ContentCategory {
    /// Physical postures.
    Asana,
    /// Breathing practices.
    Pranayama,
    /// Meditation and mindfulness content.
    Meditation,
    /// Diet and nutrition guidance.
    Nutrition,
    /// Contraindications and practice-safety material.
    SafetyGuideline,
    /// General wellness content that fits no narrower category.
    Wellness,
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asana => write!(f, "ASANA"),
            Self::Pranayama => write!(f, "PRANAYAMA"),
            Self::Meditation => write!(f, "MEDITATION"),
            Self::Nutrition => write!(f, "NUTRITION"),
            Self::SafetyGuideline => write!(f, "SAFETY_GUIDELINE"),
            Self::Wellness => write!(f, "WELLNESS"),
        }
    }
}

// ── ChunkMetadata ──────────────────────────────────────────────────────

/// Provenance metadata attached to every [`Chunk`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Name of the source document this chunk was extracted from.
    pub source: String,
    /// Zero-based ordinal position of the chunk within its source.
    pub chunk_index: usize,
    /// Content category of the passage.
    pub category: ContentCategory,
}

impl ChunkMetadata {
    /// Create metadata for a chunk.
    pub fn new(source: impl Into<String>, chunk_index: usize, category: ContentCategory) -> Self {
        Self {
            source: source.into(),
            chunk_index,
            category,
        }
    }
}

// ── Chunk ──────────────────────────────────────────────────────────────

/// One indexed, embedded passage of the knowledge corpus.
///
/// Chunk identifiers are unique within a snapshot and embedding length is
/// constant across all chunks — both invariants are enforced by
/// [`ChunkSnapshot::new`](crate::retrieval::ChunkSnapshot::new), not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable, unique identifier.
    pub id: String,
    /// The passage text handed to the generation collaborator.
    pub content: String,
    /// Provenance metadata.
    pub metadata: ChunkMetadata,
    /// Pre-computed embedding vector (the core never computes these).
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        metadata: ChunkMetadata,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
            embedding,
        }
    }
}

// ── Query ──────────────────────────────────────────────────────────────

/// An immutable inbound request value.
///
/// Created once per request and never mutated; the pipeline discards it
/// after emitting its decision (the logging collaborator retains a copy
/// inside the emitted event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Request identifier, assigned at construction.
    pub id: Uuid,
    /// Raw query text as the user typed it.
    pub text: String,
    /// Session the request belongs to.
    pub session_id: String,
    /// Arrival timestamp.
    pub received_at: DateTime<Utc>,
}

impl Query {
    /// Create a query with a fresh id and the current timestamp.
    pub fn new(text: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            session_id: session_id.into(),
            received_at: Utc::now(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_form_is_screaming_snake_case() {
        let json = serde_json::to_string(&ContentCategory::SafetyGuideline).unwrap();
        assert_eq!(json, r#""SAFETY_GUIDELINE""#);
        let parsed: ContentCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ContentCategory::SafetyGuideline);
    }

    #[test]
    fn category_display_matches_wire_form() {
        assert_eq!(ContentCategory::Asana.to_string(), "ASANA");
        assert_eq!(ContentCategory::Pranayama.to_string(), "PRANAYAMA");
    }

    #[test]
    fn queries_get_distinct_ids() {
        let a = Query::new("what is balasana", "sess-1");
        let b = Query::new("what is balasana", "sess-1");
        assert_ne!(a.id, b.id);
        assert_eq!(a.text, b.text);
    }

    #[test]
    fn chunk_round_trips_json() {
        let chunk = Chunk::new(
            "kb-asana-001",
            "Balasana is a resting pose.",
            ChunkMetadata::new("asanas.md", 0, ContentCategory::Asana),
            vec![0.1, 0.2, 0.3],
        );
        let json = serde_json::to_string(&chunk).unwrap();
        let parsed: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, chunk);
    }
}
