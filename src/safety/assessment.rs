//! Risk levels, flag categories, and the [`SafetyAssessment`] artifact.
//!
//! [`RiskLevel`] is totally ordered — `Ord` is derived so comparisons like
//! `risk >= RiskLevel::High` work naturally. A [`SafetyAssessment`] is
//! created fresh per query and immutable once produced.

use serde::{Deserialize, Serialize};

// ── RiskLevel ──────────────────────────────────────────────────────────

/// Ordered severity classification of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No safety concern — general wellness content.
    Low,
    /// Caution category matched — proceed with a disclaimer.
    Medium,
    /// Medical-advice territory — proceed, but constrain generation.
    High,
    /// Emergency or crisis signals — block the request entirely.
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

// ── FlagCategory ───────────────────────────────────────────────────────

/// A named reason a query was escalated.
///
/// Each category carries a fixed severity and a fixed position in the
/// disclaimer ordering; both are intrinsic to the category, not
/// configurable per phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FlagCategory {
    /// Crisis, self-harm, or acute-medical-emergency phrases.
    Emergency,
    /// Diagnosis, prescription, or treatment requests and named conditions.
    MedicalAdvice,
    /// Pregnancy-related caution phrases.
    Pregnancy,
    /// Recent-injury caution phrases.
    Injury,
}

impl FlagCategory {
    /// All categories, in disclaimer-priority order.
    pub const ALL: [FlagCategory; 4] = [
        Self::Emergency,
        Self::MedicalAdvice,
        Self::Pregnancy,
        Self::Injury,
    ];

    /// Fixed severity of this category.
    #[must_use]
    pub fn severity(self) -> RiskLevel {
        match self {
            Self::Emergency => RiskLevel::Critical,
            Self::MedicalAdvice => RiskLevel::High,
            Self::Pregnancy | Self::Injury => RiskLevel::Medium,
        }
    }

    /// Position in the fixed disclaimer ordering — lower surfaces first.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::MedicalAdvice => 1,
            Self::Pregnancy => 2,
            Self::Injury => 3,
        }
    }
}

impl std::fmt::Display for FlagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emergency => write!(f, "emergency"),
            Self::MedicalAdvice => write!(f, "medical_advice"),
            Self::Pregnancy => write!(f, "pregnancy"),
            Self::Injury => write!(f, "injury"),
        }
    }
}

// ── SafetyAssessment ───────────────────────────────────────────────────

/// The result of classifying one query.
///
/// Flags are sorted by [`FlagCategory::priority`] and deduplicated;
/// disclaimers follow the same order. The risk level is always the
/// maximum severity among matched categories, [`RiskLevel::Low`] when
/// nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAssessment {
    risk_level: RiskLevel,
    flags: Vec<FlagCategory>,
    disclaimers: Vec<String>,
}

impl SafetyAssessment {
    /// An assessment with no matched flags.
    #[must_use]
    pub fn low() -> Self {
        Self {
            risk_level: RiskLevel::Low,
            flags: Vec::new(),
            disclaimers: Vec::new(),
        }
    }

    /// Build an assessment from matched categories and their disclaimers.
    ///
    /// `flags` are sorted into priority order and deduplicated here so
    /// every assessment produced by the classifier is canonical.
    pub(crate) fn from_matches(mut flags: Vec<FlagCategory>, disclaimers: Vec<String>) -> Self {
        flags.sort_by_key(|c| c.priority());
        flags.dedup();
        let risk_level = flags
            .iter()
            .map(|c| c.severity())
            .max()
            .unwrap_or(RiskLevel::Low);
        Self {
            risk_level,
            flags,
            disclaimers,
        }
    }

    /// Overall risk level.
    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Matched categories in priority order, deduplicated.
    #[must_use]
    pub fn flags(&self) -> &[FlagCategory] {
        &self.flags
    }

    /// Disclaimers to surface to the user, in priority order, deduplicated.
    #[must_use]
    pub fn disclaimers(&self) -> &[String] {
        &self.disclaimers
    }

    /// `true` when the risk level mandates blocking.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.risk_level == RiskLevel::Critical
    }

    /// `true` when a specific category matched.
    #[must_use]
    pub fn has_flag(&self, category: FlagCategory) -> bool {
        self.flags.contains(&category)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
