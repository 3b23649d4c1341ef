//! Deterministic safety classification.
//!
//! The classifier holds an immutable, process-wide lexicon mapping flag
//! categories to trigger phrases. Assessment is pure and infallible;
//! what to *do* about a risk level (block, warn, proceed) is the
//! orchestrator's decision, not the classifier's.

pub mod assessment;
pub mod classifier;
pub mod lexicon;

pub use assessment::{FlagCategory, RiskLevel, SafetyAssessment};
pub use classifier::{ClassifierError, SafetyClassifier, SafetyConfig};
pub use lexicon::{builtin_lexicon, disclaimer_for, CustomLexiconEntry, LexiconEntry};
