//! Pipeline configuration.
//!
//! This module provides:
//!
//! - [`PipelineConfig`] – retrieval parameters, the fixed blocked-request
//!   message, and the safety-lexicon customization section
//! - [`ConfigBuilder`] – layered construction from files and env vars
//! - [`ConfigError`] – everything that can go wrong on the way
//!
//! ## Configuration hierarchy
//!
//! Values are resolved in the following order (later wins):
//!
//! 1. Compiled defaults
//! 2. Config file (`.toml`, `.yaml`/`.yml`, or `.json`)
//! 3. Environment variables (`PRANAGATE_*`)
//!
//! Both structures are immutable once built — the orchestrator takes the
//! config at construction and never re-reads it; a config change means a
//! new orchestrator.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pranagate::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_file("pranagate.toml")
//!     .with_env()
//!     .build()?;
//!
//! assert!(config.retrieval.top_k >= 1);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::safety::SafetyConfig;

// ── ConfigError ────────────────────────────────────────────────────────

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file at {path}: {source}")]
    FileRead {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse {format} config: {source}")]
    Parse {
        /// Format that failed to parse (toml, yaml, json).
        format: &'static str,
        /// Underlying parse error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Unrecognised configuration file extension.
    #[error("unsupported config file format: {message}")]
    UnsupportedFormat {
        /// Description of the problem.
        message: String,
    },

    /// Configuration validation failed.
    #[error("config validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// An environment variable held an unparseable value.
    #[error("failed to parse environment variable {key}: {message}")]
    EnvParse {
        /// Environment variable key.
        key: String,
        /// Error message.
        message: String,
    },
}

// ── RetrievalConfig ────────────────────────────────────────────────────

/// Retrieval parameters applied to every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of chunks to return.
    #[validate(range(min = 1, max = 50))]
    pub top_k: usize,

    /// Minimum similarity score for a chunk to be eligible (inclusive).
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_similarity: f32,

    /// Deadline for one retrieval call; on expiry the request degrades
    /// to an insufficient-context decision instead of hanging.
    #[validate(range(min = 1))]
    pub deadline_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_similarity: 0.6,
            deadline_ms: 2_000,
        }
    }
}

// ── PipelineConfig ─────────────────────────────────────────────────────

/// Default user-facing message for blocked requests.
///
/// Intentionally generic: it must never echo matched lexicon phrases, to
/// avoid leaking the detection lexicon.
pub const DEFAULT_BLOCKED_MESSAGE: &str = "We can't help with this request. If you or someone \
    else may be in danger, please contact your local emergency services right away, or reach \
    out to a crisis helpline for immediate support.";

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    /// Config schema version, for compatibility tracking.
    #[validate(length(min = 1))]
    pub version: String,

    /// Retrieval parameters.
    #[validate(nested)]
    pub retrieval: RetrievalConfig,

    /// Fixed safety-resources message returned on blocked requests.
    #[validate(length(min = 1))]
    pub blocked_message: String,

    /// Safety-lexicon customization (custom phrases, disabled entries).
    pub safety: SafetyConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_owned(),
            retrieval: RetrievalConfig::default(),
            blocked_message: DEFAULT_BLOCKED_MESSAGE.to_owned(),
            safety: SafetyConfig::default(),
        }
    }
}

// ── ConfigBuilder ──────────────────────────────────────────────────────

/// Builder layering defaults, a config file, and environment variables.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    file_path: Option<PathBuf>,
    use_env: bool,
}

impl ConfigBuilder {
    /// Start from compiled defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer a configuration file on top of the defaults. Format is
    /// dispatched on the file extension (`.toml`, `.yaml`/`.yml`,
    /// `.json`).
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Layer `PRANAGATE_*` environment variables on top. A `.env` file
    /// in the working directory is honored when present.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        self.use_env = true;
        self
    }

    /// Resolve and validate the final configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] on unreadable/unparseable files, malformed env
    /// values, or validation failures.
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let mut config = match &self.file_path {
            Some(path) => load_file(path)?,
            None => PipelineConfig::default(),
        };

        if self.use_env {
            dotenvy::dotenv().ok();
            apply_env(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn load_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("toml") => toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            format: "toml",
            source: Box::new(e),
        }),
        Some("yaml" | "yml") => serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
            format: "yaml",
            source: Box::new(e),
        }),
        Some("json") => serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            format: "json",
            source: Box::new(e),
        }),
        other => Err(ConfigError::UnsupportedFormat {
            message: format!(
                "expected .toml, .yaml, .yml, or .json, got {:?} ({})",
                other.unwrap_or("<none>"),
                path.display(),
            ),
        }),
    }
}

fn apply_env(config: &mut PipelineConfig) -> Result<(), ConfigError> {
    if let Some(value) = env_var("PRANAGATE_TOP_K") {
        config.retrieval.top_k = value.parse().map_err(|e| ConfigError::EnvParse {
            key: "PRANAGATE_TOP_K".to_owned(),
            message: format!("{e}"),
        })?;
    }
    if let Some(value) = env_var("PRANAGATE_MIN_SIMILARITY") {
        config.retrieval.min_similarity = value.parse().map_err(|e| ConfigError::EnvParse {
            key: "PRANAGATE_MIN_SIMILARITY".to_owned(),
            message: format!("{e}"),
        })?;
    }
    if let Some(value) = env_var("PRANAGATE_DEADLINE_MS") {
        config.retrieval.deadline_ms = value.parse().map_err(|e| ConfigError::EnvParse {
            key: "PRANAGATE_DEADLINE_MS".to_owned(),
            message: format!("{e}"),
        })?;
    }
    if let Some(value) = env_var("PRANAGATE_BLOCKED_MESSAGE") {
        config.blocked_message = value;
    }
    Ok(())
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

// ── Tests ──────────────────────────────────────────────────────────────
