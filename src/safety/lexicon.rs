//! Static trigger lexicon for safety classification.
//!
//! Each [`LexiconEntry`] binds one trigger phrase to a [`FlagCategory`];
//! the category fixes both severity and disclaimer. [`builtin_lexicon`]
//! returns the full set; callers may extend coverage with
//! [`CustomLexiconEntry`] values via
//! [`SafetyConfig`](super::classifier::SafetyConfig).
//!
//! Phrases are plain lowercase text — the classifier compiles them into
//! whole-phrase, case-insensitive regexes, so an entry like `hernia` will
//! not match inside an unrelated longer word.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::assessment::FlagCategory;

// ── LexiconEntry ───────────────────────────────────────────────────────

/// A built-in trigger phrase.
#[derive(Debug, Clone)]
pub struct LexiconEntry {
    /// Unique identifier (e.g. `"EM-001"`).
    pub id: Cow<'static, str>,
    /// Category this phrase escalates to.
    pub category: FlagCategory,
    /// The trigger phrase, lowercase, words separated by single spaces.
    pub phrase: Cow<'static, str>,
}

// ── CustomLexiconEntry ─────────────────────────────────────────────────

/// A deployment-provided trigger phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLexiconEntry {
    /// Unique identifier.
    pub id: String,
    /// Category this phrase escalates to.
    pub category: FlagCategory,
    /// The trigger phrase.
    pub phrase: String,
}

// ── Disclaimers ────────────────────────────────────────────────────────

/// The fixed disclaimer template attached to a category.
#[must_use]
pub fn disclaimer_for(category: FlagCategory) -> &'static str {
    match category {
        FlagCategory::Emergency => {
            "If this is a medical emergency, contact your local emergency services immediately."
        }
        FlagCategory::MedicalAdvice => {
            "Please consult a doctor or certified yoga therapist before attempting these practices."
        }
        FlagCategory::Pregnancy => {
            "Prenatal yoga should be practiced under the guidance of a qualified instructor."
        }
        FlagCategory::Injury => "Practice with caution and listen to your body.",
    }
}

// ── Built-in lexicon ───────────────────────────────────────────────────

/// Helper to reduce boilerplate when defining static entries.
macro_rules! entry {
    ($id:expr, $cat:expr, $phrase:expr) => {
        LexiconEntry {
            id: Cow::Borrowed($id),
            category: $cat,
            phrase: Cow::Borrowed($phrase),
        }
    };
}

/// Returns the full built-in trigger lexicon.
#[allow(clippy::too_many_lines)]
#[must_use]
pub fn builtin_lexicon() -> Vec<LexiconEntry> {
    use FlagCategory::{Emergency, Injury, MedicalAdvice, Pregnancy};

    vec![
        // ── Emergency (crisis / acute medical) ──────────────────────
        entry!("EM-001", Emergency, "suicide"),
        entry!("EM-002", Emergency, "kill myself"),
        entry!("EM-003", Emergency, "harm myself"),
        entry!("EM-004", Emergency, "hurt myself"),
        entry!("EM-005", Emergency, "self harm"),
        entry!("EM-006", Emergency, "call 911"),
        entry!("EM-007", Emergency, "heart attack"),
        entry!("EM-008", Emergency, "heart failure"),
        entry!("EM-009", Emergency, "stroke"),
        entry!("EM-010", Emergency, "unconscious"),
        entry!("EM-011", Emergency, "bleeding"),
        entry!("EM-012", Emergency, "chest pain"),
        entry!("EM-013", Emergency, "emergency"),
        entry!("EM-014", Emergency, "overdose"),
        // ── Medical advice (requests + named conditions) ────────────
        entry!("MA-001", MedicalAdvice, "prescribe"),
        entry!("MA-002", MedicalAdvice, "prescription"),
        entry!("MA-003", MedicalAdvice, "diagnose"),
        entry!("MA-004", MedicalAdvice, "diagnosis"),
        entry!("MA-005", MedicalAdvice, "medication"),
        entry!("MA-006", MedicalAdvice, "dosage"),
        entry!("MA-007", MedicalAdvice, "treatment for"),
        entry!("MA-008", MedicalAdvice, "cure for"),
        entry!("MA-009", MedicalAdvice, "hernia"),
        entry!("MA-010", MedicalAdvice, "glaucoma"),
        entry!("MA-011", MedicalAdvice, "high blood pressure"),
        entry!("MA-012", MedicalAdvice, "hypertension"),
        entry!("MA-013", MedicalAdvice, "surgery"),
        entry!("MA-014", MedicalAdvice, "operation"),
        entry!("MA-015", MedicalAdvice, "fracture"),
        entry!("MA-016", MedicalAdvice, "arthritis"),
        entry!("MA-017", MedicalAdvice, "sciatica"),
        entry!("MA-018", MedicalAdvice, "slipped disc"),
        entry!("MA-019", MedicalAdvice, "slip disc"),
        entry!("MA-020", MedicalAdvice, "spinal injury"),
        entry!("MA-021", MedicalAdvice, "cardiac"),
        entry!("MA-022", MedicalAdvice, "cancer"),
        entry!("MA-023", MedicalAdvice, "tumor"),
        // ── Pregnancy ───────────────────────────────────────────────
        entry!("PG-001", Pregnancy, "pregnant"),
        entry!("PG-002", Pregnancy, "pregnancy"),
        entry!("PG-003", Pregnancy, "trimester"),
        entry!("PG-004", Pregnancy, "prenatal"),
        entry!("PG-005", Pregnancy, "expecting a baby"),
        entry!("PG-006", Pregnancy, "baby bump"),
        entry!("PG-007", Pregnancy, "morning sickness"),
        entry!("PG-008", Pregnancy, "postpartum"),
        // ── Injury (recent / acute, non-emergency) ──────────────────
        entry!("IN-001", Injury, "sprained"),
        entry!("IN-002", Injury, "sprain"),
        entry!("IN-003", Injury, "pulled muscle"),
        entry!("IN-004", Injury, "torn ligament"),
        entry!("IN-005", Injury, "whiplash"),
        entry!("IN-006", Injury, "recent injury"),
        entry!("IN-007", Injury, "recovering from an injury"),
    ]
}

// ── Tests ──────────────────────────────────────────────────────────────
