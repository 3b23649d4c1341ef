//! Deterministic lexicon-based safety classifier.
//!
//! [`SafetyClassifier`] compiles every enabled trigger phrase into a
//! [`RegexSet`] for a single O(n) scan pass. Matching is case-insensitive
//! and phrase-boundary-aware: each phrase is anchored with `\b` on both
//! sides and interior whitespace is matched flexibly, so `hernia` never
//! fires inside an unrelated longer word.
//!
//! `assess` is infallible — the worst case is a [`RiskLevel::Low`]
//! assessment with no matched flags. All construction-time failures
//! (an invalid custom phrase) surface from [`SafetyClassifier::new`].

use regex::RegexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::assessment::{FlagCategory, RiskLevel, SafetyAssessment};
use super::lexicon::{builtin_lexicon, disclaimer_for, CustomLexiconEntry};

// ── SafetyConfig ───────────────────────────────────────────────────────

/// Configuration for [`SafetyClassifier`].
///
/// Uses a builder pattern — all setters are `#[must_use]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SafetyConfig {
    /// Additional deployment-provided phrases.
    #[serde(default)]
    pub additional_entries: Vec<CustomLexiconEntry>,
    /// Built-in entry IDs to disable.
    #[serde(default)]
    pub disabled_entries: Vec<String>,
}

impl SafetyConfig {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add deployment-provided phrases.
    #[must_use]
    pub fn additional_entries(mut self, entries: Vec<CustomLexiconEntry>) -> Self {
        self.additional_entries = entries;
        self
    }

    /// Disable built-in entries by ID.
    #[must_use]
    pub fn disabled_entries(mut self, ids: Vec<String>) -> Self {
        self.disabled_entries = ids;
        self
    }
}

// ── ClassifierError ────────────────────────────────────────────────────

/// Construction-time classifier failure.
///
/// Distinct from assessment, which never fails.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// A lexicon phrase produced an invalid regex.
    #[error("lexicon entry '{id}' failed to compile: {reason}")]
    InvalidPhrase {
        /// Entry identifier.
        id: String,
        /// What went wrong.
        reason: String,
    },
}

// ── SafetyClassifier ───────────────────────────────────────────────────

/// Pure query → [`SafetyAssessment`] classifier.
///
/// Construction compiles the lexicon once; the classifier is then
/// immutable, `Send + Sync`, and safe to share across concurrent
/// requests by reference.
#[derive(Debug)]
pub struct SafetyClassifier {
    regex_set: RegexSet,
    categories: Vec<FlagCategory>,
}

impl SafetyClassifier {
    /// Build a classifier from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::InvalidPhrase`] if a custom phrase
    /// fails to compile. Built-in phrases are covered by unit tests and
    /// cannot fail in practice, but a failure there is reported the same
    /// way rather than panicking.
    pub fn new(config: SafetyConfig) -> Result<Self, ClassifierError> {
        let disabled: std::collections::HashSet<&str> =
            config.disabled_entries.iter().map(String::as_str).collect();

        let mut patterns: Vec<String> = Vec::new();
        let mut categories: Vec<FlagCategory> = Vec::new();

        for e in builtin_lexicon() {
            if disabled.contains(e.id.as_ref()) {
                continue;
            }
            patterns.push(phrase_pattern(&e.phrase));
            categories.push(e.category);
        }

        // Custom phrases are compiled individually first so a failure is
        // attributed to the offending entry, not the whole set.
        for e in &config.additional_entries {
            if e.phrase.trim().is_empty() {
                return Err(ClassifierError::InvalidPhrase {
                    id: e.id.clone(),
                    reason: "phrase is empty".to_owned(),
                });
            }
            let pattern = phrase_pattern(&e.phrase);
            regex::Regex::new(&pattern).map_err(|err| ClassifierError::InvalidPhrase {
                id: e.id.clone(),
                reason: err.to_string(),
            })?;
            patterns.push(pattern);
            categories.push(e.category);
        }

        let regex_set =
            RegexSet::new(&patterns).map_err(|err| ClassifierError::InvalidPhrase {
                id: "<builtin>".to_owned(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            regex_set,
            categories,
        })
    }

    /// Build a classifier with the full built-in lexicon and no
    /// customization.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] if a built-in phrase fails to compile.
    pub fn with_defaults() -> Result<Self, ClassifierError> {
        Self::new(SafetyConfig::default())
    }

    /// Assess a query.
    ///
    /// Collects every matching category (a query may match several),
    /// reports the maximum severity among them, and attaches the matched
    /// categories' disclaimers in the fixed priority order, deduplicated.
    /// Never fails; no match is a valid [`RiskLevel::Low`] result.
    #[must_use]
    pub fn assess(&self, query_text: &str) -> SafetyAssessment {
        let matched = self.regex_set.matches(query_text);
        if !matched.matched_any() {
            return SafetyAssessment::low();
        }

        let mut flags: Vec<FlagCategory> = matched
            .into_iter()
            .map(|idx| self.categories[idx])
            .collect();
        flags.sort_by_key(|c| c.priority());
        flags.dedup();

        let mut disclaimers: Vec<String> = Vec::with_capacity(flags.len());
        for category in &flags {
            let text = disclaimer_for(*category);
            if !disclaimers.iter().any(|d| d == text) {
                disclaimers.push(text.to_owned());
            }
        }

        SafetyAssessment::from_matches(flags, disclaimers)
    }

    /// Number of enabled lexicon entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.categories.len()
    }
}

/// Compile one lexicon phrase into a case-insensitive, phrase-boundary
/// regex pattern. Interior whitespace matches any whitespace run.
fn phrase_pattern(phrase: &str) -> String {
    let escaped: Vec<String> = phrase.split_whitespace().map(|w| regex::escape(w)).collect();
    format!(r"(?i)\b{}\b", escaped.join(r"\s+"))
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SafetyClassifier {
        SafetyClassifier::with_defaults().expect("default classifier should compile")
    }

    #[test]
    fn with_defaults_compiles() {
        assert!(SafetyClassifier::with_defaults().is_ok());
    }

    #[test]
    fn benign_query_is_low_risk() {
        let a = classifier().assess("What are the benefits of Balasana?");
        assert_eq!(a.risk_level(), RiskLevel::Low);
        assert!(a.flags().is_empty());
        assert!(a.disclaimers().is_empty());
    }

    #[test]
    fn emergency_phrase_is_critical() {
        let a = classifier().assess("I think I'm having a heart attack, what do I do?");
        assert_eq!(a.risk_level(), RiskLevel::Critical);
        assert!(a.has_flag(FlagCategory::Emergency));
    }

    #[test]
    fn pregnancy_phrase_is_medium_with_disclaimer() {
        let a = classifier().assess("I'm 20 weeks pregnant, is downward dog safe?");
        assert_eq!(a.risk_level(), RiskLevel::Medium);
        assert!(a.has_flag(FlagCategory::Pregnancy));
        assert!(!a.disclaimers().is_empty());
    }

    #[test]
    fn prescription_request_is_high() {
        let a = classifier().assess("Please prescribe medication for my hernia");
        assert_eq!(a.risk_level(), RiskLevel::High);
        assert!(a.has_flag(FlagCategory::MedicalAdvice));
    }

    #[test]
    fn matching_is_phrase_boundary_aware() {
        // "hernia" inside a longer word must not fire.
        let a = classifier().assess("the herniaria plant is used in folk teas");
        assert!(!a.has_flag(FlagCategory::MedicalAdvice), "{:?}", a.flags());

        // "sprain" inside "spraining" must not fire either.
        let b = classifier().assess("the word spraining appears in my vocabulary quiz");
        assert!(b.flags().is_empty(), "{:?}", b.flags());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let a = classifier().assess("CALL 911 NOW");
        assert!(a.has_flag(FlagCategory::Emergency));
    }

    #[test]
    fn multi_word_phrase_tolerates_whitespace_runs() {
        let a = classifier().assess("I have high   blood\npressure");
        assert!(a.has_flag(FlagCategory::MedicalAdvice));
    }

    #[test]
    fn multiple_categories_collected() {
        let a = classifier().assess("I'm pregnant and my doctor mentioned surgery");
        assert!(a.has_flag(FlagCategory::Pregnancy));
        assert!(a.has_flag(FlagCategory::MedicalAdvice));
        // Max severity wins: MedicalAdvice (High) > Pregnancy (Medium).
        assert_eq!(a.risk_level(), RiskLevel::High);
        // Disclaimer order follows category priority, not match order.
        assert_eq!(a.disclaimers().len(), 2);
        assert!(a.disclaimers()[0].contains("consult a doctor"));
    }

    #[test]
    fn emergency_dominates_other_flags() {
        let a = classifier().assess("I'm pregnant and I want to harm myself");
        assert_eq!(a.risk_level(), RiskLevel::Critical);
        assert!(a.has_flag(FlagCategory::Emergency));
        assert!(a.has_flag(FlagCategory::Pregnancy));
        assert_eq!(a.flags()[0], FlagCategory::Emergency);
    }

    #[test]
    fn disabled_entry_does_not_match() {
        let c = SafetyClassifier::new(
            SafetyConfig::new().disabled_entries(vec!["EM-007".into()]),
        )
        .unwrap();
        let a = c.assess("heart attack");
        assert!(!a.has_flag(FlagCategory::Emergency));
    }

    #[test]
    fn custom_entry_matches() {
        let c = SafetyClassifier::new(SafetyConfig::new().additional_entries(vec![
            CustomLexiconEntry {
                id: "CUSTOM-001".into(),
                category: FlagCategory::Injury,
                phrase: "dislocated shoulder".into(),
            },
        ]))
        .unwrap();
        let a = c.assess("I have a dislocated shoulder, can I do wheel pose?");
        assert!(a.has_flag(FlagCategory::Injury));
        assert_eq!(a.risk_level(), RiskLevel::Medium);
    }

    #[test]
    fn assess_is_deterministic() {
        let c = classifier();
        let first = c.assess("pregnant with high blood pressure");
        let second = c.assess("pregnant with high blood pressure");
        assert_eq!(first, second);
    }

    #[test]
    fn empty_text_is_low() {
        let a = classifier().assess("");
        assert_eq!(a.risk_level(), RiskLevel::Low);
    }
}
